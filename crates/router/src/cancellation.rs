use std::cmp::Reverse;
use std::collections::HashSet;

use regex::Regex;

use crate::menu::{blank_out, normalize_name, MenuIndex};

/// How much of an item a cancellation asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalRequest {
    Quantity(u32),
    All,
}

/// Extracts "remove N of item X" / "remove item X" requests from free text.
#[derive(Debug, Clone)]
pub struct CancellationTextMatcher {
    trigger: Regex,
    quantified: Regex,
}

impl CancellationTextMatcher {
    pub fn new<S: AsRef<str>>(triggers: &[S]) -> Result<Self, regex::Error> {
        let alternation = triggers
            .iter()
            .map(|t| regex::escape(&t.as_ref().to_lowercase()))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            trigger: Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))?,
            quantified: Regex::new(&format!(r"(?i)\b(?:{alternation})\s+(\d+)\s+"))?,
        })
    }

    /// True when any trigger word appears as a whole word.
    pub fn is_triggered(&self, message: &str) -> bool {
        self.trigger.is_match(message)
    }

    /// Removal requests in the order they were found: quantity-qualified
    /// mentions first, then bare mentions of items not already claimed.
    pub fn extract_removals(&self, message: &str, menu: &MenuIndex) -> Vec<(String, RemovalRequest)> {
        let mut removals: Vec<(String, RemovalRequest)> = Vec::new();
        let mut claimed: HashSet<usize> = HashSet::new();

        for caps in self.quantified.captures_iter(message) {
            let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Ok(qty) = digits.as_str().parse::<u32>() else {
                continue;
            };
            let item_part = normalize_name(self.item_text(&message[whole.end()..]));
            if item_part.is_empty() || qty == 0 {
                continue;
            }

            let Some(position) = closest_item(&item_part, menu) else {
                continue;
            };
            let name = menu.all()[position].name.clone();
            match removals.iter_mut().find(|(existing, _)| *existing == name) {
                Some(existing) => existing.1 = RemovalRequest::Quantity(qty),
                None => removals.push((name, RemovalRequest::Quantity(qty))),
            }
            claimed.insert(position);
        }

        let mut text = message.to_string();
        for (position, _, pattern) in menu.entries_longest_first() {
            if !claimed.contains(&position) {
                continue;
            }
            let spans: Vec<_> = pattern.spans(&text).collect();
            for span in spans {
                blank_out(&mut text, span);
            }
        }

        let mut bare: Vec<usize> = Vec::new();
        for (position, _, pattern) in menu.entries_longest_first() {
            if claimed.contains(&position) {
                continue;
            }
            let spans: Vec<_> = pattern.spans(&text).collect();
            if spans.is_empty() {
                continue;
            }
            for span in spans {
                blank_out(&mut text, span);
            }
            bare.push(position);
        }
        bare.sort_unstable();
        removals.extend(
            bare.into_iter()
                .map(|position| (menu.all()[position].name.clone(), RemovalRequest::All)),
        );

        removals
    }

    /// The item words after a quantity: up to the next trigger word or the
    /// first character that cannot be part of a dish name.
    fn item_text<'t>(&self, rest: &'t str) -> &'t str {
        let clause = match self.trigger.find(rest) {
            Some(next) => &rest[..next.start()],
            None => rest,
        };
        let end = clause
            .find(|c: char| !(c.is_ascii_alphanumeric() || " +&'().-".contains(c)))
            .unwrap_or(clause.len());
        &clause[..end]
    }
}

/// Menu position of the item named by `item_part`. A full name found in the
/// text beats a partial one; then the earliest, then the longest, then menu order.
fn closest_item(item_part: &str, menu: &MenuIndex) -> Option<usize> {
    menu.all()
        .iter()
        .enumerate()
        .filter_map(|(position, item)| {
            let name = normalize_name(&item.name);
            if let Some(at) = item_part.find(&name) {
                Some(((0, at, Reverse(name.len())), position))
            } else if name.contains(item_part) {
                Some(((1, 0, Reverse(name.len())), position))
            } else {
                None
            }
        })
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, position)| position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuItem;

    fn matcher() -> CancellationTextMatcher {
        CancellationTextMatcher::new(&["cancel", "remove", "forget", "less"]).unwrap()
    }

    fn menu() -> MenuIndex {
        MenuIndex::build(vec![
            MenuItem::new("Pork Roll", "", 4.5),
            MenuItem::new("Breakfast Sandwich", "", 5.25),
            MenuItem::new("Taco", "", 3.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_triggers_are_whole_words() {
        let m = matcher();
        assert!(m.is_triggered("cancel my taco"));
        assert!(m.is_triggered("Please REMOVE it"));
        assert!(m.is_triggered("one less taco"));
        assert!(!m.is_triggered("3 boneless wings"));
        assert!(!m.is_triggered("unforgettable taco"));
    }

    #[test]
    fn test_quantity_pass() {
        let found = matcher().extract_removals("cancel 1 pork roll", &menu());
        assert_eq!(found, vec![("Pork Roll".to_string(), RemovalRequest::Quantity(1))]);
    }

    #[test]
    fn test_quantity_pass_tolerates_plural() {
        let found = matcher().extract_removals("remove 2 pork rolls", &menu());
        assert_eq!(found, vec![("Pork Roll".to_string(), RemovalRequest::Quantity(2))]);
    }

    #[test]
    fn test_bare_pass_removes_all() {
        let found = matcher().extract_removals("cancel pork roll", &menu());
        assert_eq!(found, vec![("Pork Roll".to_string(), RemovalRequest::All)]);
    }

    #[test]
    fn test_claimed_items_skip_bare_pass() {
        let found = matcher().extract_removals("forget 1 taco and the breakfast sandwiches", &menu());
        assert_eq!(
            found,
            vec![
                ("Taco".to_string(), RemovalRequest::Quantity(1)),
                ("Breakfast Sandwich".to_string(), RemovalRequest::All),
            ]
        );
    }

    #[test]
    fn test_longest_name_wins_at_same_position() {
        let menu = MenuIndex::build(vec![
            MenuItem::new("Taco", "", 3.0),
            MenuItem::new("Taco Salad", "", 8.0),
        ])
        .unwrap();

        let found = matcher().extract_removals("cancel 1 taco salad", &menu);
        assert_eq!(found, vec![("Taco Salad".to_string(), RemovalRequest::Quantity(1))]);

        let found = matcher().extract_removals("cancel 1 taco", &menu);
        assert_eq!(found, vec![("Taco".to_string(), RemovalRequest::Quantity(1))]);

        let found = matcher().extract_removals("cancel the taco salad", &menu);
        assert_eq!(found, vec![("Taco Salad".to_string(), RemovalRequest::All)]);
    }

    #[test]
    fn test_each_clause_keeps_its_own_item() {
        let found = matcher().extract_removals("cancel 1 taco and cancel 2 pork rolls", &menu());
        assert_eq!(
            found,
            vec![
                ("Taco".to_string(), RemovalRequest::Quantity(1)),
                ("Pork Roll".to_string(), RemovalRequest::Quantity(2)),
            ]
        );
    }

    #[test]
    fn test_unknown_item() {
        assert!(matcher().extract_removals("cancel 2 hot dogs", &menu()).is_empty());
        assert!(matcher().extract_removals("cancel everything", &menu()).is_empty());
    }
}
