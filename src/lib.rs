//! # buzz - Interactive Terminal HTTP Client
//!
//! Compose a request in editable regions (URL, params, method, body,
//! headers), send it with Ctrl+R, and inspect the formatted response.
//!
//! ```text
//! ┌────────────┐   keys    ┌─────────────┐  submit   ┌──────────────┐
//! │ Controller │──────────▶│  ViewModel  │──────────▶│ HttpService  │
//! │ event loop │           │ regions,    │           │ tokio task   │
//! └────────────┘           │ history     │◀──────────└──────────────┘
//!       │                  └─────────────┘  update queue
//!       │ layout pass             │
//!       ▼                         ▼
//! ┌────────────┐           ┌─────────────┐
//! │  Renderer  │◀──────────│ Formatters  │
//! └────────────┘           └─────────────┘
//! ```

pub mod cmd_args;
pub mod config;
pub mod repl;

pub use repl::*;
