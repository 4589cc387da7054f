//! # Application Controller
//!
//! Owns the view model, the renderer and the event source, and runs the
//! single-threaded loop: apply queued background updates, read at most one
//! terminal event, redraw when anything changed.

use crate::cmd_args::CommandLineArgs;
use crate::config::AppConfig;
use crate::repl::geometry::Dimensions;
use crate::repl::io::{EventStream, RenderStream, TerminalEventStream, TerminalRenderStream};
use crate::repl::models::SavedRequest;
use crate::repl::services::{HttpTransport, ReqwestTransport};
use crate::repl::view_models::ViewModel;
use crate::repl::views::{TerminalRenderer, ViewRenderer};
use anyhow::Result;
use crossterm::event::{Event, KeyEvent, KeyEventKind};
use std::io::Stdout;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct AppController<ES: EventStream, RS: RenderStream> {
    view_model: ViewModel,
    view_renderer: TerminalRenderer<RS>,
    event_stream: ES,
}

impl AppController<TerminalEventStream, TerminalRenderStream<Stdout>> {
    /// Controller bound to the real terminal
    pub fn new(cmd_args: CommandLineArgs) -> Result<Self> {
        Self::with_io_streams(cmd_args, TerminalEventStream::new(), TerminalRenderStream::new())
    }
}

impl<ES: EventStream, RS: RenderStream> AppController<ES, RS> {
    /// Create a controller with injected I/O streams
    ///
    /// Loads the configuration, applies command line overrides, builds the
    /// HTTP client and seeds the request fields.
    pub fn with_io_streams(cmd_args: CommandLineArgs, event_stream: ES, render_stream: RS) -> Result<Self> {
        let mut config = AppConfig::load(cmd_args.config_path())?;
        cmd_args.apply_to(&mut config)?;
        let seed = cmd_args.seed_fields(&config.view.default_url_scheme)?;

        let follow_redirects = Arc::new(AtomicBool::new(config.http.follow_redirects));
        let transport = ReqwestTransport::new(&config.http, Arc::clone(&follow_redirects))?;
        Self::with_transport(config, seed, Arc::new(transport), follow_redirects, event_stream, render_stream)
    }

    /// Create a controller around an already built transport
    pub fn with_transport(
        config: AppConfig,
        seed: SavedRequest,
        transport: Arc<dyn HttpTransport>,
        follow_redirects: Arc<AtomicBool>,
        event_stream: ES,
        render_stream: RS,
    ) -> Result<Self> {
        let view_renderer = TerminalRenderer::with_render_stream(render_stream)?;
        let (width, height) = view_renderer.terminal_size();

        let mut view_model = ViewModel::new(
            config.view,
            config.bindings,
            transport,
            follow_redirects,
            Dimensions::new(width, height),
        );
        view_model.apply_saved_request(&seed);
        tracing::info!("buzz starting on a {width}x{height} terminal");

        Ok(Self {
            view_model,
            view_renderer,
            event_stream,
        })
    }

    pub fn view_model(&self) -> &ViewModel {
        &self.view_model
    }

    pub fn view_model_mut(&mut self) -> &mut ViewModel {
        &mut self.view_model
    }

    pub fn renderer(&self) -> &TerminalRenderer<RS> {
        &self.view_renderer
    }

    /// Run until the quit command
    pub async fn run(&mut self) -> Result<()> {
        self.view_renderer.initialize()?;
        let result = self.event_loop().await;
        // restore the terminal even when the loop failed
        let cleanup = self.view_renderer.cleanup();
        result.and(cleanup)
    }

    async fn event_loop(&mut self) -> Result<()> {
        self.render()?;
        while !self.view_model.should_quit() {
            let mut dirty = self.view_model.apply_pending_updates() > 0;

            if self.event_stream.poll(POLL_INTERVAL)? {
                let event = self.event_stream.read()?;
                dirty |= self.handle_event(event);
            }

            if dirty && !self.view_model.should_quit() {
                self.render()?;
            }
            // let the request task make progress on a single-threaded runtime
            tokio::task::yield_now().await;
        }
        tracing::info!("buzz exiting");
        Ok(())
    }

    /// Apply one terminal event; true when the screen needs a redraw
    fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                tracing::debug!("key event: {key:?}");
                self.view_model.handle_key(key);
                true
            }
            Event::Resize(width, height) => {
                tracing::debug!("terminal resized to {width}x{height}");
                self.view_model.update_terminal_size(width, height);
                self.view_renderer.update_size(width, height);
                true
            }
            _ => false,
        }
    }

    /// Process a single key event without running the loop
    pub fn process_key_event(&mut self, key: KeyEvent) -> Result<()> {
        self.handle_event(Event::Key(key));
        self.render()
    }

    /// Wait for the running request to finish, then redraw
    pub async fn wait_for_update(&mut self) -> Result<bool> {
        let applied = self.view_model.wait_for_update().await;
        self.render()?;
        Ok(applied)
    }

    pub fn render(&mut self) -> Result<()> {
        let pass = self.view_model.layout_pass();
        self.view_renderer.render_full(&self.view_model, &pass)
    }

    pub fn should_quit(&self) -> bool {
        self.view_model.should_quit()
    }
}
