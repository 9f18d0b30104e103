use std::collections::BTreeMap;

use serde::Serialize;

use crate::cancellation::RemovalRequest;

/// Per-user record of item name to quantity ordered.
///
/// Zero quantities are never stored, and a user whose order empties out is
/// dropped entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderLedger {
    orders: BTreeMap<String, BTreeMap<String, u32>>,
}

impl OrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges additions into `user`'s order, creating it if needed.
    pub fn add(&mut self, user: &str, additions: &[(String, u32)]) {
        let additions: Vec<&(String, u32)> = additions.iter().filter(|(_, qty)| *qty > 0).collect();
        if additions.is_empty() {
            return;
        }

        let order = self.orders.entry(user.to_string()).or_default();
        for (item, qty) in additions {
            let current = order.entry(item.clone()).or_insert(0);
            *current = current.saturating_add(*qty);
        }
    }

    /// Applies removal requests to `user`'s order and returns what was
    /// actually taken off, in request order. Items not in the order are skipped.
    pub fn remove(&mut self, user: &str, requests: &[(String, RemovalRequest)]) -> Vec<(String, u32)> {
        let Some(order) = self.orders.get_mut(user) else {
            return Vec::new();
        };

        let mut removed = Vec::new();
        for (item, request) in requests {
            let Some(current) = order.get(item).copied() else {
                continue;
            };
            match request {
                RemovalRequest::Quantity(qty) if *qty < current => {
                    order.insert(item.clone(), current - qty);
                    removed.push((item.clone(), *qty));
                }
                _ => {
                    order.remove(item);
                    removed.push((item.clone(), current));
                }
            }
        }

        if order.is_empty() {
            self.orders.remove(user);
        }
        removed
    }

    pub fn order(&self, user: &str) -> Option<&BTreeMap<String, u32>> {
        self.orders.get(user)
    }

    pub fn has_order(&self, user: &str) -> bool {
        self.orders.contains_key(user)
    }

    pub fn quantity(&self, user: &str, item: &str) -> u32 {
        self.orders.get(user).and_then(|o| o.get(item)).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, u32>)> {
        self.orders.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice_with(qty: u32) -> OrderLedger {
        let mut ledger = OrderLedger::new();
        ledger.add("alice", &[("Pork Roll".to_string(), qty)]);
        ledger
    }

    #[test]
    fn test_add_merges() {
        let mut ledger = alice_with(3);
        ledger.add("alice", &[("Pork Roll".to_string(), 2), ("Taco".to_string(), 1)]);
        assert_eq!(ledger.quantity("alice", "Pork Roll"), 5);
        assert_eq!(ledger.quantity("alice", "Taco"), 1);
    }

    #[test]
    fn test_add_twice_doubles() {
        let additions = vec![("Pork Roll".to_string(), 3), ("Taco".to_string(), 1)];
        let mut twice = OrderLedger::new();
        twice.add("bob", &additions);
        twice.add("bob", &additions);

        let doubled: Vec<(String, u32)> = additions.iter().map(|(n, q)| (n.clone(), q * 2)).collect();
        let mut once = OrderLedger::new();
        once.add("bob", &doubled);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_add_nothing_creates_no_user() {
        let mut ledger = OrderLedger::new();
        ledger.add("carol", &[]);
        ledger.add("carol", &[("Taco".to_string(), 0)]);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_partial_removal() {
        let mut ledger = alice_with(3);
        let removed = ledger.remove("alice", &[("Pork Roll".to_string(), RemovalRequest::Quantity(1))]);
        assert_eq!(removed, vec![("Pork Roll".to_string(), 1)]);
        assert_eq!(ledger.quantity("alice", "Pork Roll"), 2);
    }

    #[test]
    fn test_full_removal_drops_user() {
        let mut ledger = alice_with(3);
        let removed = ledger.remove("alice", &[("Pork Roll".to_string(), RemovalRequest::All)]);
        assert_eq!(removed, vec![("Pork Roll".to_string(), 3)]);
        assert!(!ledger.has_order("alice"));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_over_removal_reports_existing_quantity() {
        let mut ledger = alice_with(2);
        let removed = ledger.remove("alice", &[("Pork Roll".to_string(), RemovalRequest::Quantity(5))]);
        assert_eq!(removed, vec![("Pork Roll".to_string(), 2)]);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_absent_item_skipped() {
        let mut ledger = alice_with(2);
        let before = ledger.clone();
        let removed = ledger.remove("alice", &[("Taco".to_string(), RemovalRequest::All)]);
        assert!(removed.is_empty());
        assert_eq!(ledger, before);
        assert!(ledger.remove("nobody", &[("Taco".to_string(), RemovalRequest::All)]).is_empty());
    }
}
