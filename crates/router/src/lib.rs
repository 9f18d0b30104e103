pub mod cancellation;
pub mod error;
pub mod intent;
pub mod ledger;
pub mod menu;
pub mod orders;
pub mod render;
pub mod selection;
pub mod session;
pub mod types;
pub mod vocabulary;

pub mod extractors {
    pub mod json;
}

pub use cancellation::{CancellationTextMatcher, RemovalRequest};
pub use error::MenuError;
pub use intent::{IntentRouter, RouterConfig};
pub use ledger::OrderLedger;
pub use menu::{MatchPattern, MenuIndex, MenuItem};
pub use orders::OrderTextMatcher;
pub use selection::{Candidate, FuzzySelectionResolver, PendingSelection};
pub use session::Session;
pub use types::{Intent, RouteAction, Routed};
pub use vocabulary::Vocabulary;

pub use extractors::json::JsonMenuExtractor;
