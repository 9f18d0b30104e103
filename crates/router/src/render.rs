//! User-facing reply texts.

use crate::ledger::OrderLedger;
use crate::menu::{MenuIndex, MenuItem};
use crate::selection::Candidate;

/// Soft per-message character budget for paginated output.
pub const MESSAGE_CHAR_BUDGET: usize = 1900;

pub const THANKS_REPLY: &str = "You're welcome!";
pub const MENU_HEADER: &str = "**📜 Lunch Menu**";
pub const MENU_EMPTY: &str = "📜 The menu is currently empty.";
pub const MENU_MISSING: &str =
    "📜 No menu is loaded yet. Tell me a cuisine (like `Thai food`) to find a restaurant.";
pub const NO_ORDERS: &str = "No orders yet!";
pub const SEARCH_FAILED: &str = "❌ Couldn't find restaurants right now.";
pub const NO_WEBSITE: &str = "❌ Sorry, I couldn't find a website for this restaurant.";
pub const FETCHING_MENU: &str = "🔍 Fetching menu... this may take a moment.";
pub const PARSING_MENU: &str = "✅ Menu page retrieved. Parsing...";
pub const MENU_LOADED: &str = "📥 Menu loaded! Type `!menu` to begin ordering.";
pub const MENU_LOAD_FAILED: &str = "❌ Sorry, I couldn't load that menu. The current menu is unchanged.";
pub const SELECTION_CLEARED: &str = "👍 Okay, I've cleared the restaurant list.";
pub const NOTHING_TO_CLEAR: &str = "There's no restaurant list waiting for a pick.";
pub const FALLBACK: &str = "Sorry, I didn't quite understand that. \
I can take your order (e.g., `1 pork roll`), or you can use one of my commands: \
`!menu` to view the menu, `!summary` to see all current orders, or `!help` for more information.";

pub fn help_text() -> String {
    [
        "👋 Hi! I'm LunchBot, your lunch and restaurant assistant!",
        "",
        "You can ask me to order from our menu, or just tell me what kind of food you're in the mood for.",
        "",
        "**Here's what I can do:**",
        "• Type `!menu` to see all the available options.",
        "• Order by typing the quantity and item name (e.g., `I'll have 2 pork rolls and 1 breakfast sandwich`).",
        "• To see all current orders, type `!summary`.",
        "• To cancel, you can say `cancel 1 pork roll` or just `cancel pork roll` to remove all of them.",
        "• Want to eat out? Just tell me what cuisine you want (like `I want Thai food` or `Show me Italian restaurants`) and I'll find places nearby!",
        "• Changed your mind about the restaurant list? Type `!nevermind`.",
        "",
        "**Tip:** For best results, try to use the item names as they appear in the menu when ordering.",
    ]
    .join("\n")
}

/// `name xN` when N > 1, otherwise just the name, comma separated.
pub fn format_items<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a u32)>,
{
    items
        .into_iter()
        .map(|(name, qty)| if *qty > 1 { format!("{} x{}", name, qty) } else { name.clone() })
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_pairs(items: &[(String, u32)]) -> String {
    format_items(items.iter().map(|(n, q)| (n, q)))
}

pub fn added(user: &str, items: &[(String, u32)]) -> String {
    format!("✅ Got it, {}! Added {} to your order.", user, format_pairs(items))
}

pub fn removed(user: &str, items: &[(String, u32)]) -> String {
    format!("🗑️ Okay, {}. I've removed {} from your order.", user, format_pairs(items))
}

pub fn nothing_to_cancel(user: &str) -> String {
    format!("⚠️ No matching item found in {}'s order to cancel.", user)
}

pub fn no_order(user: &str) -> String {
    format!("⚠️ No order found for {} to cancel.", user)
}

pub fn selected(candidate: &Candidate) -> String {
    format!("✅ Got it! You've selected **{}**.", candidate.title)
}

pub fn searching(cuisine: &str) -> String {
    format!("🍽️ Looking for **{}** food near you...", title_case(cuisine))
}

pub fn candidate_list(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| format!("**{}**\n📍 {}\n🔗 <{}>", c.title, c.address, c.link))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn summary(ledger: &OrderLedger) -> String {
    if ledger.is_empty() {
        return NO_ORDERS.to_string();
    }
    ledger
        .iter()
        .map(|(user, items)| format!("**{}**: {}", user, format_items(items)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn menu_block(item: &MenuItem) -> String {
    format!("**{}** - ${:.2}\n*_{}_*\n\n", item.name, item.price, item.description)
}

/// The menu as a header followed by pages that each stay within the
/// character budget. Pages only break between items. An empty menu is a
/// single notice.
pub fn menu_pages(menu: &MenuIndex) -> Vec<String> {
    if menu.is_empty() {
        return vec![MENU_EMPTY.to_string()];
    }
    let mut pages = vec![MENU_HEADER.to_string()];
    pages.extend(paginate(menu.all().iter().map(menu_block), MESSAGE_CHAR_BUDGET));
    pages
}

/// Packs blocks into pages of at most `budget` characters. A single block
/// larger than the budget gets a page of its own.
pub fn paginate<I>(blocks: I, budget: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut pages = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for block in blocks {
        let block_len = block.chars().count();
        if !current.is_empty() && current_len + block_len > budget {
            pages.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(&block);
        current_len += block_len;
    }
    if !current.is_empty() {
        pages.push(current);
    }
    pages
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_items() {
        let items = vec![("Pork Roll".to_string(), 3), ("Taco".to_string(), 1)];
        assert_eq!(format_pairs(&items), "Pork Roll x3, Taco");
    }

    #[test]
    fn test_empty_menu_single_notice() {
        assert_eq!(menu_pages(&MenuIndex::empty()), vec![MENU_EMPTY.to_string()]);
    }

    #[test]
    fn test_menu_block_two_decimal_price() {
        let menu = MenuIndex::build(vec![MenuItem::new("Soda", "Can", 1.5)]).unwrap();
        let pages = menu_pages(&menu);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0], MENU_HEADER);
        assert_eq!(pages[1], "**Soda** - $1.50\n*_Can_*\n\n");
    }

    #[test]
    fn test_paginate_never_splits_blocks() {
        let blocks: Vec<String> = (0..50).map(|i| format!("{:02}{}\n", i, "x".repeat(97))).collect();
        let pages = paginate(blocks.clone(), 1900);
        assert!(pages.len() > 1);
        for page in &pages {
            assert!(page.chars().count() <= 1900);
            assert!(page.ends_with('\n'));
        }
        assert_eq!(pages.concat(), blocks.concat());
    }

    #[test]
    fn test_paginate_oversized_block() {
        let pages = paginate(vec!["a".repeat(10), "b".repeat(30), "c".repeat(5)], 20);
        assert_eq!(pages, vec!["a".repeat(10), "b".repeat(30), "c".repeat(5)]);
    }

    #[test]
    fn test_searching_title_cases() {
        assert_eq!(searching("thai"), "🍽️ Looking for **Thai** food near you...");
    }
}
