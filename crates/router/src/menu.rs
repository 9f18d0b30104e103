use std::cmp::Reverse;
use std::collections::HashMap;
use std::ops::Range;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::MenuError;

/// One orderable dish. Immutable for the lifetime of a menu generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, description: impl Into<String>, price: f64) -> Self {
        Self { name: name.into(), description: description.into(), price }
    }
}

/// Lower-cases a name and collapses whitespace runs to single spaces.
/// Two names with the same normalized form would produce the same pattern.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plural-tolerant, whitespace-flexible matcher derived from an item name.
#[derive(Debug, Clone)]
pub struct MatchPattern {
    bare: Regex,
    quantified: Regex,
}

impl MatchPattern {
    pub fn for_name(name: &str) -> Result<Self, regex::Error> {
        let lowered = name.to_lowercase();
        let words: Vec<String> = lowered.split_whitespace().map(regex::escape).collect();
        let fragment = format!(r"{}(?:es|s)?", words.join(r"\s+"));

        // `\b` next to a non-word character (e.g. a closing paren) would never match
        let lead = if starts_with_word_char(&lowered) { r"\b" } else { "" };
        let trail = if ends_with_word_char(&lowered) { r"\b" } else { "" };

        let bare = Regex::new(&format!(r"(?i){lead}{fragment}{trail}"))?;
        let quantified = Regex::new(&format!(r"(?i)(\d+)\s+{fragment}{trail}"))?;

        Ok(Self { bare, quantified })
    }

    /// True when the item is mentioned anywhere in `text`, with or without a quantity.
    pub fn is_match(&self, text: &str) -> bool {
        self.bare.is_match(text)
    }

    /// Byte ranges of every mention of the item in `text`.
    pub fn spans<'t>(&'t self, text: &'t str) -> impl Iterator<Item = Range<usize>> + 't {
        self.bare.find_iter(text).map(|m| m.range())
    }

    /// Every "N item" occurrence in `text` with the byte range it covers.
    /// The quantity is `None` when the digits do not fit a `u32`.
    pub fn quantified_spans<'t>(
        &'t self,
        text: &'t str,
    ) -> impl Iterator<Item = (Option<u32>, Range<usize>)> + 't {
        self.quantified.captures_iter(text).filter_map(|caps| {
            let whole = caps.get(0)?;
            let qty = caps.get(1)?.as_str().parse::<u32>().ok();
            Some((qty, whole.range()))
        })
    }

    /// Every "N item" occurrence in `text`, `None` for an unrepresentable quantity.
    pub fn quantities<'t>(&'t self, text: &'t str) -> impl Iterator<Item = Option<u32>> + 't {
        self.quantified_spans(text).map(|(qty, _)| qty)
    }
}

/// Overwrites `range` of `text` with spaces so later matching cannot see it.
/// Byte offsets of the rest of the text are unchanged.
pub(crate) fn blank_out(text: &mut String, range: Range<usize>) {
    let width = range.len();
    text.replace_range(range, &" ".repeat(width));
}

fn starts_with_word_char(s: &str) -> bool {
    s.chars().next().map_or(false, |c| c.is_alphanumeric() || c == '_')
}

fn ends_with_word_char(s: &str) -> bool {
    s.chars().last().map_or(false, |c| c.is_alphanumeric() || c == '_')
}

/// The active menu plus one cached [`MatchPattern`] per item, in menu order.
#[derive(Debug, Clone, Default)]
pub struct MenuIndex {
    items: Vec<MenuItem>,
    patterns: Vec<MatchPattern>,
}

impl MenuIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validates `items` and compiles their patterns. Empty names, negative or
    /// non-finite prices and normalization collisions reject the whole menu.
    pub fn build(items: Vec<MenuItem>) -> Result<Self, MenuError> {
        let mut seen: HashMap<String, String> = HashMap::with_capacity(items.len());
        let mut patterns = Vec::with_capacity(items.len());

        for (position, item) in items.iter().enumerate() {
            let key = normalize_name(&item.name);
            if key.is_empty() {
                return Err(MenuError::EmptyName(position));
            }
            if !item.price.is_finite() || item.price < 0.0 {
                return Err(MenuError::InvalidPrice { name: item.name.clone(), price: item.price });
            }
            if let Some(first) = seen.get(&key) {
                return Err(MenuError::Collision { first: first.clone(), second: item.name.clone() });
            }
            seen.insert(key, item.name.clone());

            let pattern = MatchPattern::for_name(&item.name)
                .map_err(|source| MenuError::Pattern { name: item.name.clone(), source })?;
            patterns.push(pattern);
        }

        Ok(Self { items, patterns })
    }

    /// Replaces the menu wholesale. On error the current index is left as it was.
    pub fn rebuild(&mut self, items: Vec<MenuItem>) -> Result<(), MenuError> {
        *self = Self::build(items)?;
        Ok(())
    }

    pub fn all(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn pattern_for(&self, name: &str) -> Option<&MatchPattern> {
        let key = normalize_name(name);
        self.items
            .iter()
            .position(|item| normalize_name(&item.name) == key)
            .map(|i| &self.patterns[i])
    }

    pub fn entries(&self) -> impl Iterator<Item = (&MenuItem, &MatchPattern)> {
        self.items.iter().zip(self.patterns.iter())
    }

    /// Entries with their menu position, longest normalized name first and
    /// menu order among equal lengths. A name is always visited before any
    /// shorter name it contains.
    pub fn entries_longest_first(&self) -> Vec<(usize, &MenuItem, &MatchPattern)> {
        let mut entries: Vec<_> = self
            .entries()
            .enumerate()
            .map(|(position, (item, pattern))| (position, item, pattern))
            .collect();
        entries.sort_by_key(|(_, item, _)| Reverse(normalize_name(&item.name).len()));
        entries
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
