//! # Mock I/O for Tests
//!
//! `MockEventStream` replays a scripted list of events. `MockRenderStream`
//! records terminal state calls and replays written bytes onto a character
//! grid, so tests can assert on what the screen would show.

use super::{EventStream, RenderStream, TerminalSize};
use anyhow::Result;
use crossterm::event::Event;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted event source; `poll` reports false once the script runs out
#[derive(Debug, Default)]
pub struct MockEventStream {
    events: VecDeque<Event>,
}

impl MockEventStream {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: events.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push_event(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl EventStream for MockEventStream {
    fn poll(&mut self, _timeout: Duration) -> Result<bool> {
        Ok(!self.events.is_empty())
    }

    fn read(&mut self) -> Result<Event> {
        self.events
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no events available"))
    }
}

/// Terminal state call recorded by `MockRenderStream`
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    ClearScreen,
    MoveCursor(u16, u16),
    HideCursor,
    ShowCursor,
    EnterAlternateScreen,
    LeaveAlternateScreen,
    EnableRawMode,
    DisableRawMode,
    Flush,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Text,
    Escape,
    Csi,
}

/// Character grid fed by the bytes the renderer writes
///
/// Understands the CSI sequences crossterm emits for cursor positioning and
/// screen clearing; every other escape sequence is consumed and ignored.
#[derive(Debug, Clone)]
struct Screen {
    cells: Vec<Vec<char>>,
    cursor: (usize, usize),
    state: ParseState,
    params: String,
    pending: Vec<u8>,
}

impl Screen {
    fn new((width, height): TerminalSize) -> Self {
        Self {
            cells: vec![vec![' '; usize::from(width)]; usize::from(height)],
            cursor: (0, 0),
            state: ParseState::Text,
            params: String::new(),
            pending: Vec::new(),
        }
    }

    fn clear(&mut self) {
        for row in &mut self.cells {
            row.fill(' ');
        }
    }

    fn feed(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
        let pending = std::mem::take(&mut self.pending);
        let (text, rest) = match std::str::from_utf8(&pending) {
            Ok(text) => (text, &[][..]),
            Err(e) => {
                let valid = e.valid_up_to();
                // valid_up_to guarantees this prefix decodes
                let text = std::str::from_utf8(&pending[..valid]).unwrap_or_default();
                (text, &pending[valid..])
            }
        };
        for c in text.chars() {
            self.feed_char(c);
        }
        self.pending = rest.to_vec();
    }

    fn feed_char(&mut self, c: char) {
        match self.state {
            ParseState::Text if c == '\x1b' => self.state = ParseState::Escape,
            ParseState::Text => self.put(c),
            ParseState::Escape if c == '[' => {
                self.params.clear();
                self.state = ParseState::Csi;
            }
            ParseState::Escape => self.state = ParseState::Text,
            ParseState::Csi if c.is_ascii_alphabetic() || c == '@' || c == '~' => {
                self.apply_csi(c);
                self.state = ParseState::Text;
            }
            ParseState::Csi => self.params.push(c),
        }
    }

    fn apply_csi(&mut self, command: char) {
        match command {
            'H' | 'f' => {
                let mut parts = self.params.split(';').map(|p| p.parse::<usize>().unwrap_or(1));
                let row = parts.next().unwrap_or(1).max(1) - 1;
                let col = parts.next().unwrap_or(1).max(1) - 1;
                self.cursor = (col, row);
            }
            'J' if self.params == "2" => self.clear(),
            _ => {}
        }
    }

    fn put(&mut self, c: char) {
        let (col, row) = self.cursor;
        if c == '\n' {
            self.cursor = (0, row + 1);
            return;
        }
        if let Some(cell) = self.cells.get_mut(row).and_then(|line| line.get_mut(col)) {
            *cell = c;
        }
        self.cursor = (col + 1, row);
    }

    fn line(&self, row: usize) -> String {
        self.cells
            .get(row)
            .map(|line| line.iter().collect::<String>().trim_end().to_string())
            .unwrap_or_default()
    }
}

type CommandLog = Arc<Mutex<Vec<RenderCommand>>>;

/// In-memory render target with a fixed terminal size
#[derive(Debug, Clone)]
pub struct MockRenderStream {
    commands: CommandLog,
    screen: Arc<Mutex<Screen>>,
    written: Arc<Mutex<Vec<u8>>>,
    size: TerminalSize,
}

impl MockRenderStream {
    pub fn new() -> Self {
        Self::with_size((80, 24))
    }

    pub fn with_size(size: TerminalSize) -> Self {
        Self {
            commands: Arc::default(),
            screen: Arc::new(Mutex::new(Screen::new(size))),
            written: Arc::default(),
            size,
        }
    }

    /// Handle sharing this stream's state; hand one to the renderer and keep
    /// the other to inspect the screen
    pub fn handle(&self) -> Self {
        self.clone()
    }

    pub fn get_commands(&self) -> Vec<RenderCommand> {
        self.commands.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn has_command(&self, command: &RenderCommand) -> bool {
        self.get_commands().contains(command)
    }

    /// Every byte written so far, escape sequences included
    pub fn get_buffer_string(&self) -> String {
        self.written
            .lock()
            .map(|w| String::from_utf8_lossy(&w).to_string())
            .unwrap_or_default()
    }

    /// One screen row with trailing blanks removed
    pub fn screen_line(&self, row: u16) -> String {
        self.screen
            .lock()
            .map(|screen| screen.line(usize::from(row)))
            .unwrap_or_default()
    }

    /// The whole screen, one line per row
    pub fn screen_text(&self) -> String {
        (0..self.size.1)
            .map(|row| self.screen_line(row))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Change the reported size and reset the grid
    pub fn resize(&mut self, size: TerminalSize) {
        self.size = size;
        if let Ok(mut screen) = self.screen.lock() {
            *screen = Screen::new(size);
        }
    }

    fn record(&self, command: RenderCommand) {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command);
        }
    }

    fn with_screen(&self, f: impl FnOnce(&mut Screen)) {
        if let Ok(mut screen) = self.screen.lock() {
            f(&mut screen);
        }
    }
}

impl Default for MockRenderStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MockRenderStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(mut written) = self.written.lock() {
            written.extend_from_slice(buf);
        }
        self.with_screen(|screen| screen.feed(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.record(RenderCommand::Flush);
        Ok(())
    }
}

impl RenderStream for MockRenderStream {
    fn clear_screen(&mut self) -> Result<()> {
        self.record(RenderCommand::ClearScreen);
        self.with_screen(Screen::clear);
        Ok(())
    }

    fn move_cursor(&mut self, x: u16, y: u16) -> Result<()> {
        self.record(RenderCommand::MoveCursor(x, y));
        self.with_screen(|screen| screen.cursor = (usize::from(x), usize::from(y)));
        Ok(())
    }

    fn hide_cursor(&mut self) -> Result<()> {
        self.record(RenderCommand::HideCursor);
        Ok(())
    }

    fn show_cursor(&mut self) -> Result<()> {
        self.record(RenderCommand::ShowCursor);
        Ok(())
    }

    fn get_size(&self) -> Result<TerminalSize> {
        Ok(self.size)
    }

    fn enter_alternate_screen(&mut self) -> Result<()> {
        self.record(RenderCommand::EnterAlternateScreen);
        Ok(())
    }

    fn leave_alternate_screen(&mut self) -> Result<()> {
        self.record(RenderCommand::LeaveAlternateScreen);
        Ok(())
    }

    fn enable_raw_mode(&mut self) -> Result<()> {
        self.record(RenderCommand::EnableRawMode);
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> Result<()> {
        self.record(RenderCommand::DisableRawMode);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::cursor::MoveTo;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use crossterm::queue;
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    #[test]
    fn mock_event_stream_should_replay_then_run_dry() {
        let mut stream = MockEventStream::new(vec![Event::Key(KeyEvent::new(
            KeyCode::Char('a'),
            KeyModifiers::NONE,
        ))]);

        assert!(stream.poll(Duration::ZERO).unwrap());
        let Event::Key(key) = stream.read().unwrap() else {
            panic!("expected key event");
        };
        assert_eq!(key.code, KeyCode::Char('a'));
        assert!(!stream.poll(Duration::ZERO).unwrap());
        assert!(stream.read().is_err());
    }

    #[test]
    fn mock_render_stream_should_place_text_on_the_grid() {
        let mut stream = MockRenderStream::with_size((20, 3));
        queue!(
            stream,
            MoveTo(2, 1),
            SetForegroundColor(Color::Green),
            Print("héllo"),
            ResetColor
        )
        .unwrap();
        stream.flush().unwrap();

        assert_eq!(stream.screen_line(0), "");
        assert_eq!(stream.screen_line(1), "  héllo");
        assert_eq!(stream.get_commands(), vec![RenderCommand::Flush]);
    }

    #[test]
    fn clear_screen_should_blank_the_grid() {
        let mut stream = MockRenderStream::with_size((10, 2));
        stream.write_all(b"abc").unwrap();
        stream.clear_screen().unwrap();
        assert_eq!(stream.screen_text(), "\n");
        assert!(stream.has_command(&RenderCommand::ClearScreen));
    }

    #[test]
    fn handle_should_observe_writes_made_through_the_original() {
        let mut stream = MockRenderStream::with_size((10, 2));
        let observer = stream.handle();
        stream.move_cursor(0, 1).unwrap();
        stream.write_all(b"x").unwrap();
        assert_eq!(observer.screen_line(1), "x");
    }

    #[test]
    fn text_past_the_right_edge_should_be_dropped() {
        let mut stream = MockRenderStream::with_size((3, 1));
        stream.write_all(b"abcdef").unwrap();
        assert_eq!(stream.screen_line(0), "abc");
    }
}
