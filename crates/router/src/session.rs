use chrono::{DateTime, Utc};

use crate::ledger::OrderLedger;
use crate::menu::MenuIndex;
use crate::selection::{Candidate, PendingSelection};

/// All mutable state the router reads and writes. Owned by whoever drives
/// the dispatch loop and handed to the router one message at a time.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub menu: MenuIndex,
    pub ledger: OrderLedger,
    pub selection: Option<PendingSelection>,
}

impl Session {
    pub fn new(menu: MenuIndex) -> Self {
        Self { menu, ledger: OrderLedger::new(), selection: None }
    }

    /// Starts a fresh selection, discarding any earlier list or choice.
    pub fn open_selection(&mut self, candidates: Vec<Candidate>, now: DateTime<Utc>) {
        self.selection = Some(PendingSelection::open(candidates, now));
    }

    pub fn has_open_selection(&self) -> bool {
        self.selection.as_ref().map_or(false, |s| !s.is_resolved())
    }

    pub fn chosen_restaurant(&self) -> Option<&Candidate> {
        self.selection.as_ref().and_then(|s| s.chosen())
    }

    pub fn replace_menu(&mut self, menu: MenuIndex) {
        self.menu = menu;
    }
}
