//! # Terminal Renderer
//!
//! Draws one resolved layout pass: frames and titles, each region's visible
//! text inset by one cell, overlays in drawing order, and finally the cursor
//! of the region receiving keys. Every frame is drawn from scratch; output is
//! queued and flushed once.

use crate::repl::events::{RegionFlags, RegionId};
use crate::repl::geometry::Rect;
use crate::repl::io::RenderStream;
use crate::repl::layout::{Frame, LayoutPass};
use crate::repl::models::TextBuffer;
use crate::repl::view_models::ViewModel;
use anyhow::Result;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use std::io::Write;
use unicode_width::UnicodeWidthChar;

pub const TOO_SMALL_MESSAGE: &str = "Terminal is too small";

const FRAME_COLOR: Color = Color::Blue;
const TEXT_COLOR: Color = Color::Green;
const HEADER_NAME_COLOR: Color = Color::Yellow;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const SUGGESTION_BACKGROUND: Color = Color::Blue;

/// Trait for rendering views
pub trait ViewRenderer {
    /// Prepare the terminal for drawing
    fn initialize(&mut self) -> Result<()>;

    /// Draw a complete frame
    fn render_full(&mut self, view_model: &ViewModel, pass: &LayoutPass) -> Result<()>;

    /// Restore the cursor before exit
    fn cleanup(&mut self) -> Result<()>;
}

/// Foreground/background pair for one run of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Style {
    fg: Color,
    bg: Option<Color>,
}

impl Style {
    const fn fg(fg: Color) -> Self {
        Self { fg, bg: None }
    }
}

/// Renderer writing to any [`RenderStream`]
pub struct TerminalRenderer<RS: RenderStream> {
    stream: RS,
    terminal_size: (u16, u16),
}

impl<RS: RenderStream> TerminalRenderer<RS> {
    pub fn with_render_stream(stream: RS) -> Result<Self> {
        let terminal_size = stream.get_size()?;
        Ok(Self {
            stream,
            terminal_size,
        })
    }

    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    pub fn update_size(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
    }

    pub fn stream(&self) -> &RS {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut RS {
        &mut self.stream
    }

    /// Print `text` at (x, y) clipped to the screen and to `max_cols` cells
    fn print_clipped(&mut self, x: i32, y: i32, text: &str, max_cols: usize, style: Style) -> Result<()> {
        let (width, height) = self.terminal_size;
        if y < 0 || y >= i32::from(height) || max_cols == 0 {
            return Ok(());
        }

        let mut col = x;
        let mut visible = String::new();
        let mut start = None;
        let mut used = 0;
        for c in text.chars() {
            let c = if c == '\t' { ' ' } else { c };
            let w = c.width().unwrap_or(0);
            if used + w > max_cols || col + w as i32 > i32::from(width) {
                break;
            }
            if col >= 0 {
                start.get_or_insert(col);
                visible.push(c);
            }
            col += w as i32;
            used += w;
        }
        let Some(start) = start else {
            return Ok(());
        };

        queue!(self.stream, MoveTo(start as u16, y as u16), SetForegroundColor(style.fg))?;
        if let Some(bg) = style.bg {
            queue!(self.stream, SetBackgroundColor(bg))?;
        }
        queue!(self.stream, Print(visible), ResetColor)?;
        Ok(())
    }

    fn draw_frame(&mut self, rect: Rect, title: &str) -> Result<()> {
        let style = Style::fg(FRAME_COLOR);
        let span = (rect.x1 - rect.x0 + 1).max(0) as usize;
        let inner = span.saturating_sub(2);

        let top = format!("┌{}┐", "─".repeat(inner));
        let bottom = format!("└{}┘", "─".repeat(inner));
        self.print_clipped(rect.x0, rect.y0, &top, span, style)?;
        self.print_clipped(rect.x0, rect.y1, &bottom, span, style)?;
        for y in rect.y0 + 1..rect.y1 {
            self.print_clipped(rect.x0, y, "│", 1, style)?;
            self.print_clipped(rect.x1, y, "│", 1, style)?;
        }
        if !title.is_empty() {
            self.print_clipped(rect.x0 + 2, rect.y0, title, inner.saturating_sub(2), style)?;
        }
        Ok(())
    }

    /// Blank the content area so overlays hide what is underneath
    fn clear_inside(&mut self, rect: Rect) -> Result<()> {
        let (x, y) = rect.inner_origin();
        let blank = " ".repeat(rect.inner_width());
        for row in 0..rect.inner_height() as i32 {
            self.print_clipped(x, y + row, &blank, blank.len(), Style::fg(TEXT_COLOR))?;
        }
        Ok(())
    }

    fn draw_region(&mut self, view_model: &ViewModel, region: RegionId, rect: Rect) -> Result<()> {
        let flags = view_model.region_flags(region);
        self.clear_inside(rect)?;
        if flags.contains(RegionFlags::FRAMED) {
            self.draw_frame(rect, view_model.region_title(region))?;
        }
        let Some(buffer) = view_model.buffer(region) else {
            return Ok(());
        };

        let width = rect.inner_width();
        let lines = visible_lines(buffer, width, rect.inner_height(), flags.contains(RegionFlags::WRAP));
        let highlighted = view_model
            .highlighted_row(region)
            .map(|row| row.saturating_sub(buffer.origin().row));
        let (x, y) = rect.inner_origin();

        for (index, line) in lines.iter().enumerate() {
            let row = y + index as i32;
            match region {
                _ if highlighted == Some(index) => {
                    self.print_clipped(x, row, line, width, Style::fg(HIGHLIGHT_COLOR))?;
                }
                RegionId::Autocomplete => {
                    let padded = format!("{line:<width$}");
                    let style = Style {
                        fg: Color::Reset,
                        bg: Some(SUGGESTION_BACKGROUND),
                    };
                    self.print_clipped(x, row, &padded, width, style)?;
                }
                RegionId::ResponseHeaders => self.draw_header_line(x, row, line, width, buffer.origin().row + index)?,
                _ => self.print_clipped(x, row, line, width, Style::fg(TEXT_COLOR))?,
            }
        }
        Ok(())
    }

    /// Status line in green or red by code, header names in yellow
    fn draw_header_line(&mut self, x: i32, y: i32, line: &str, width: usize, source_row: usize) -> Result<()> {
        if source_row == 0 && line.starts_with("HTTP/") {
            let ok = line.split_whitespace().nth(1) == Some("200");
            let color = if ok { Color::Green } else { Color::Red };
            return self.print_clipped(x, y, line, width, Style::fg(color));
        }
        match line.split_once(':') {
            Some((name, rest)) => {
                let name_cols = name.chars().count() + 1;
                self.print_clipped(x, y, &format!("{name}:"), width, Style::fg(HEADER_NAME_COLOR))?;
                self.print_clipped(
                    x + name_cols as i32,
                    y,
                    rest,
                    width.saturating_sub(name_cols),
                    Style::fg(TEXT_COLOR),
                )
            }
            None => self.print_clipped(x, y, line, width, Style::fg(TEXT_COLOR)),
        }
    }

    fn draw_too_small(&mut self, rect: Option<Rect>) -> Result<()> {
        let Some(rect) = rect else {
            let width = usize::from(self.terminal_size.0);
            return self.print_clipped(0, 0, TOO_SMALL_MESSAGE, width, Style::fg(Color::Red));
        };
        self.draw_frame(rect, "Error")?;
        let (x, y) = rect.inner_origin();
        self.print_clipped(x, y, TOO_SMALL_MESSAGE, rect.inner_width(), Style::fg(Color::Red))
    }

    /// Show the cursor in the region receiving keys when it is on screen
    fn place_cursor(&mut self, view_model: &ViewModel, regions: &[(RegionId, Rect)]) -> Result<()> {
        let active = view_model.active_region();
        let flags = view_model.region_flags(active);
        let target = regions
            .iter()
            .find(|(region, _)| *region == active)
            .filter(|_| flags.contains(RegionFlags::EDITABLE) && !flags.contains(RegionFlags::WRAP))
            .and_then(|&(region, rect)| {
                let buffer = view_model.buffer(region)?;
                cursor_cell(buffer, rect)
            });

        match target {
            Some((x, y)) => queue!(self.stream, MoveTo(x, y), Show)?,
            None => queue!(self.stream, Hide)?,
        }
        Ok(())
    }
}

/// Screen cell of the buffer cursor inside `rect`, if visible
fn cursor_cell(buffer: &TextBuffer, rect: Rect) -> Option<(u16, u16)> {
    let cursor = buffer.cursor();
    let origin = buffer.origin();
    let row = cursor.row.checked_sub(origin.row)?;
    if row >= rect.inner_height() {
        return None;
    }
    let line = buffer.line(cursor.row).unwrap_or_default();
    let col: usize = line
        .chars()
        .skip(origin.col)
        .take(cursor.col.saturating_sub(origin.col))
        .map(|c| c.width().unwrap_or(0))
        .sum();
    if col > rect.inner_width() {
        return None;
    }
    let (x, y) = rect.inner_origin();
    let x = u16::try_from(x + col as i32).ok()?;
    let y = u16::try_from(y + row as i32).ok()?;
    Some((x, y))
}

/// The lines of `buffer` that fit a `width` x `height` content area
fn visible_lines(buffer: &TextBuffer, width: usize, height: usize, wrap: bool) -> Vec<String> {
    let origin = buffer.origin();
    let source = buffer.lines().iter().skip(origin.row);
    if !wrap {
        return source
            .take(height)
            .map(|line| line.chars().skip(origin.col).collect())
            .collect();
    }

    let mut out = Vec::new();
    for line in source {
        out.extend(wrap_line(line, width));
        if out.len() >= height {
            break;
        }
    }
    out.truncate(height);
    out
}

/// Split a line into chunks no wider than `width` cells
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if width == 0 || line.is_empty() {
        return vec![line.to_string()];
    }
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut used = 0;
    for c in line.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(c);
        used += w;
    }
    chunks.push(current);
    chunks
}

impl<RS: RenderStream> ViewRenderer for TerminalRenderer<RS> {
    fn initialize(&mut self) -> Result<()> {
        self.stream.enable_raw_mode()?;
        self.stream.enter_alternate_screen()?;
        self.stream.clear_screen()?;
        self.stream.hide_cursor()?;
        Ok(())
    }

    fn render_full(&mut self, view_model: &ViewModel, pass: &LayoutPass) -> Result<()> {
        queue!(self.stream, Hide, Clear(ClearType::All))?;
        match &pass.frame {
            Frame::TooSmall(rect) => {
                self.draw_too_small(*rect)?;
                queue!(self.stream, Hide)?;
            }
            Frame::Regions(regions) => {
                for &(region, rect) in regions {
                    self.draw_region(view_model, region, rect)?;
                }
                self.place_cursor(view_model, regions)?;
            }
        }
        self.stream.flush()?;
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        self.stream.show_cursor()?;
        self.stream.leave_alternate_screen()?;
        self.stream.disable_raw_mode()?;
        self.stream.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repl::io::{MockRenderStream, RenderCommand};

    #[test]
    fn wrap_line_should_split_on_cell_width() {
        assert_eq!(wrap_line("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(wrap_line("", 4), vec![""]);
        assert_eq!(wrap_line("日本語", 4), vec!["日本", "語"]);
    }

    #[test]
    fn visible_lines_should_honour_origin_and_wrap() {
        let mut buffer = TextBuffer::with_text("one\ntwo\nthree-four");
        buffer.set_origin(1, 0);
        assert_eq!(visible_lines(&buffer, 5, 5, false), vec!["two", "three-four"]);
        assert_eq!(visible_lines(&buffer, 5, 3, true), vec!["two", "three", "-four"]);

        buffer.set_origin(0, 2);
        assert_eq!(visible_lines(&buffer, 10, 1, false), vec!["e"]);
    }

    #[test]
    fn cursor_cell_should_offset_from_content_origin() {
        let buffer = TextBuffer::with_text("ab\ncd");
        assert_eq!(cursor_cell(&buffer, Rect::new(4, 2, 20, 10)), Some((7, 4)));
        assert_eq!(cursor_cell(&buffer, Rect::new(4, 2, 20, 4)), None);
    }

    #[test]
    fn frame_should_carry_title_inside_top_border() {
        let stream = MockRenderStream::with_size((30, 5));
        let screen = stream.handle();
        let mut renderer = TerminalRenderer::with_render_stream(stream).unwrap();
        renderer.draw_frame(Rect::new(0, 0, 12, 2), "Method").unwrap();
        renderer.stream_mut().flush().unwrap();

        assert_eq!(screen.screen_line(0), "┌─Method────┐");
        assert_eq!(screen.screen_line(1), "│           │");
        assert_eq!(screen.screen_line(2), "└───────────┘");
    }

    #[test]
    fn clipped_print_should_drop_offscreen_cells() {
        let stream = MockRenderStream::with_size((6, 2));
        let screen = stream.handle();
        let mut renderer = TerminalRenderer::with_render_stream(stream).unwrap();
        renderer
            .print_clipped(-1, 0, "abcdefgh", 100, Style::fg(TEXT_COLOR))
            .unwrap();
        renderer
            .print_clipped(0, 5, "hidden", 100, Style::fg(TEXT_COLOR))
            .unwrap();
        assert_eq!(screen.screen_line(0), "bcdefg");
        assert_eq!(screen.screen_line(1), "");
    }

    #[test]
    fn initialize_and_cleanup_should_toggle_terminal_modes() {
        let stream = MockRenderStream::new();
        let log = stream.handle();
        let mut renderer = TerminalRenderer::with_render_stream(stream).unwrap();
        renderer.initialize().unwrap();
        renderer.cleanup().unwrap();

        let commands = log.get_commands();
        assert_eq!(commands[0], RenderCommand::EnableRawMode);
        assert_eq!(commands[1], RenderCommand::EnterAlternateScreen);
        assert!(commands.contains(&RenderCommand::LeaveAlternateScreen));
        assert!(commands.contains(&RenderCommand::DisableRawMode));
    }
}
