// ==========================================
// Seguimiento de pedidos - session state
// ==========================================
// The per-user working set of orders accumulated across a browsing
// session: append-only with membership dedup. Passed explicitly to
// whatever renders it; deliberately not a module-level global.
// ==========================================

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// SessionState
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: Uuid,
    /// Orders added this session, in insertion order
    orders: Vec<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            orders: Vec::new(),
        }
    }

    /// Add an order to the working set.
    ///
    /// Returns false (and leaves the set untouched) when the order is
    /// already present or the code is blank.
    pub fn add_order(&mut self, order_code: &str) -> bool {
        let trimmed = order_code.trim();
        if trimmed.is_empty() || self.orders.iter().any(|o| o == trimmed) {
            return false;
        }
        self.orders.push(trimmed.to_string());
        true
    }

    /// The working set, in the order the user added it.
    pub fn orders(&self) -> &[String] {
        &self.orders
    }

    pub fn clear(&mut self) {
        self.orders.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
