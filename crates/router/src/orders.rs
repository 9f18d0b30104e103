use crate::menu::{blank_out, MenuIndex};

/// Extracts "add N of item X" requests from free text.
#[derive(Debug, Clone, Default)]
pub struct OrderTextMatcher;

impl OrderTextMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Per-item totals in menu order. Explicit "N item" mentions are summed;
    /// an item mentioned without any quantity counts once. Zero totals are dropped.
    ///
    /// Longer names claim their text first, so "2 taco salads" never also
    /// counts as tacos.
    pub fn extract_additions(&self, message: &str, menu: &MenuIndex) -> Vec<(String, u32)> {
        let mut text = message.to_string();
        let mut totals: Vec<u32> = vec![0; menu.len()];

        for (position, _, pattern) in menu.entries_longest_first() {
            let quantified: Vec<_> = pattern.quantified_spans(&text).collect();
            // An unparseable quantity still makes the mention explicit
            let explicit = !quantified.is_empty();
            let mut total: u32 = 0;
            for (qty, span) in quantified {
                total = total.saturating_add(qty.unwrap_or(0));
                blank_out(&mut text, span);
            }

            let bare: Vec<_> = pattern.spans(&text).collect();
            if !explicit && !bare.is_empty() {
                total = 1;
            }
            for span in bare {
                blank_out(&mut text, span);
            }

            totals[position] = total;
        }

        menu.all()
            .iter()
            .zip(totals)
            .filter(|(_, total)| *total > 0)
            .map(|(item, total)| (item.name.clone(), total))
            .collect()
    }
}
