// ==========================================
// Seguimiento de pedidos - application layer
// ==========================================
// Process wiring and per-session state.
// ==========================================

pub mod session;
pub mod state;

pub use session::SessionState;
pub use state::{get_default_db_path, AppState};
