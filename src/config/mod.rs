// ==========================================
// Seguimiento de pedidos - configuration layer
// ==========================================
// Storage: config_kv table, global scope.
// ==========================================

pub mod config_manager;

pub use config_manager::{config_keys, ConfigManager};
