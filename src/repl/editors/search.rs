//! Editor for the search field: every key schedules a response re-render.

use super::{EditContext, Editor};
use crate::repl::events::{Update, UpdateSender};
use crossterm::event::KeyEvent;

#[derive(Debug)]
pub struct SearchEditor {
    inner: Box<dyn Editor>,
    updates: UpdateSender,
}

impl SearchEditor {
    pub fn new(inner: Box<dyn Editor>, updates: UpdateSender) -> Self {
        Self { inner, updates }
    }
}

impl Editor for SearchEditor {
    fn handle_key(&mut self, ctx: &mut EditContext<'_>, key: KeyEvent) {
        self.inner.handle_key(ctx, key);
        self.updates.send(Update::RefreshSearch);
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}
