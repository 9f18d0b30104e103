use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use protocol::ChatMessage;
use tracing::{debug, info};

use crate::cancellation::CancellationTextMatcher;
use crate::orders::OrderTextMatcher;
use crate::render;
use crate::selection::{Candidate, FuzzySelectionResolver};
use crate::session::Session;
use crate::types::{Intent, RouteAction, Routed};
use crate::vocabulary::Vocabulary;

#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// When set, messages from any other channel are ignored.
    pub channel_id: Option<String>,
    /// How long an unresolved restaurant list keeps accepting picks.
    pub selection_ttl: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { channel_id: None, selection_ttl: Duration::minutes(15) }
    }
}

/// Classifies each message into exactly one intent, in a fixed priority
/// order, and applies ledger / selection changes for it.
pub struct IntentRouter {
    vocab: Vocabulary,
    config: RouterConfig,
    resolver: FuzzySelectionResolver,
    orders: OrderTextMatcher,
    cancellation: CancellationTextMatcher,
}

impl IntentRouter {
    pub fn new(vocab: Vocabulary, config: RouterConfig) -> Result<Self> {
        let cancellation = CancellationTextMatcher::new(vocab.cancel_triggers.as_slice())?;
        Ok(Self {
            vocab,
            config,
            resolver: FuzzySelectionResolver::new(),
            orders: OrderTextMatcher::new(),
            cancellation,
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Routes one message against `session`. `self_id` is the bot's own
    /// author id, if known.
    pub fn route(
        &self,
        session: &mut Session,
        msg: &ChatMessage,
        self_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Routed {
        if self_id.map_or(false, |id| id == msg.author_id) {
            return Routed::ignore();
        }
        if let Some(channel) = &self.config.channel_id {
            if *channel != msg.channel_id {
                return Routed::ignore();
            }
        }

        let content = msg.text.to_lowercase();
        let command = content.trim();
        let user = msg.display_name.as_str();
        if command.is_empty() {
            debug!(author = %msg.author_id, "ignoring empty message");
            return Routed::ignore();
        }

        if self.vocab.is_thanks(command) {
            return Routed::single(Intent::Thanks, render::THANKS_REPLY);
        }

        if command == self.vocab.abandon_command {
            return self.abandon_selection(session);
        }

        if let Some(routed) = self.try_selection(session, &content, command, now) {
            return routed;
        }

        if self.vocab.is_help(command) {
            return Routed::single(Intent::Help, render::help_text());
        }

        if let Some(cuisine) = self.vocab.find_cuisine(&content) {
            return Routed {
                intent: Intent::Cuisine,
                action: RouteAction::SearchRestaurants {
                    cuisine: cuisine.to_string(),
                    notice: render::searching(cuisine),
                },
            };
        }

        if command == self.vocab.summary_command {
            return Routed::single(Intent::Summary, render::summary(&session.ledger));
        }

        if command == self.vocab.menu_command {
            return Routed::reply(Intent::Menu, render::menu_pages(&session.menu));
        }

        if self.cancellation.is_triggered(&content) {
            return self.cancel(session, user, &content);
        }

        self.add(session, user, &content)
    }

    /// Stores search results as a new open selection and renders the reply.
    /// An empty result leaves the session untouched.
    pub fn complete_search(
        &self,
        session: &mut Session,
        candidates: Vec<Candidate>,
        now: DateTime<Utc>,
    ) -> String {
        if candidates.is_empty() {
            return render::SEARCH_FAILED.to_string();
        }
        let reply = render::candidate_list(&candidates);
        session.open_selection(candidates, now);
        reply
    }

    fn abandon_selection(&self, session: &mut Session) -> Routed {
        if session.has_open_selection() {
            session.selection = None;
            Routed::single(Intent::AbandonSelection, render::SELECTION_CLEARED)
        } else {
            Routed::single(Intent::AbandonSelection, render::NOTHING_TO_CLEAR)
        }
    }

    fn try_selection(
        &self,
        session: &mut Session,
        content: &str,
        command: &str,
        now: DateTime<Utc>,
    ) -> Option<Routed> {
        let pending = session.selection.as_mut().filter(|s| !s.is_resolved())?;

        if pending.is_expired(now, self.config.selection_ttl) {
            info!("restaurant list expired without a pick");
            session.selection = None;
            return None;
        }
        if self.vocab.is_command(command) {
            return None;
        }

        let idx = self.resolver.resolve(content, pending.candidates())?;
        let candidate = pending.choose(idx)?;
        debug!(title = %candidate.title, "restaurant selected");

        let routed = match candidate.website.clone().filter(|w| !w.trim().is_empty()) {
            Some(website) => Routed {
                intent: Intent::Selection,
                action: RouteAction::LoadMenu {
                    notices: vec![render::selected(&candidate), render::FETCHING_MENU.to_string()],
                    candidate,
                    website,
                },
            },
            None => Routed::reply(
                Intent::Selection,
                vec![render::selected(&candidate), render::NO_WEBSITE.to_string()],
            ),
        };
        Some(routed)
    }

    fn cancel(&self, session: &mut Session, user: &str, content: &str) -> Routed {
        if !session.ledger.has_order(user) {
            return Routed::single(Intent::Cancellation, render::no_order(user));
        }

        let requests = self.cancellation.extract_removals(content, &session.menu);
        let removed = session.ledger.remove(user, &requests);
        if removed.is_empty() {
            Routed::single(Intent::Cancellation, render::nothing_to_cancel(user))
        } else {
            Routed::single(Intent::Cancellation, render::removed(user, &removed))
        }
    }

    fn add(&self, session: &mut Session, user: &str, content: &str) -> Routed {
        if session.menu.is_empty() {
            return Routed::single(Intent::MenuMissing, render::MENU_MISSING);
        }

        let additions = self.orders.extract_additions(content, &session.menu);
        if additions.is_empty() {
            return Routed::single(Intent::Unrecognized, render::FALLBACK);
        }

        session.ledger.add(user, &additions);
        Routed::single(Intent::Addition, render::added(user, &additions))
    }
}
