use serde::{Deserialize, Serialize};

use crate::selection::Candidate;

/// The classified purpose of one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Ignored,
    Thanks,
    Selection,
    AbandonSelection,
    Help,
    Cuisine,
    Summary,
    Menu,
    Cancellation,
    Addition,
    MenuMissing,
    Unrecognized,
}

/// What the caller must do after routing. The router itself never performs I/O.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteAction {
    /// Nothing to send.
    Ignore,
    /// Send these texts, in order. State changes are already applied.
    Reply(Vec<String>),
    /// Post `notice`, search for `cuisine`, then hand the results to
    /// `IntentRouter::complete_search`.
    SearchRestaurants { cuisine: String, notice: String },
    /// A restaurant was chosen: post `notices`, then fetch and extract its menu.
    LoadMenu { candidate: Candidate, website: String, notices: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Routed {
    pub intent: Intent,
    pub action: RouteAction,
}

impl Routed {
    pub fn ignore() -> Self {
        Self { intent: Intent::Ignored, action: RouteAction::Ignore }
    }

    pub fn reply(intent: Intent, texts: Vec<String>) -> Self {
        Self { intent, action: RouteAction::Reply(texts) }
    }

    pub fn single(intent: Intent, text: impl Into<String>) -> Self {
        Self::reply(intent, vec![text.into()])
    }

    /// Texts to send right away, if any.
    pub fn texts(&self) -> &[String] {
        match &self.action {
            RouteAction::Reply(texts) => texts,
            RouteAction::LoadMenu { notices, .. } => notices,
            RouteAction::SearchRestaurants { notice, .. } => std::slice::from_ref(notice),
            RouteAction::Ignore => &[],
        }
    }
}
