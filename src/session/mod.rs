//! Authentication session: state snapshot and the manager that drives
//! login, logout and token refresh. Tokens stay in `SecretString` and must
//! never be logged.

mod manager;
mod state;

pub use manager::SessionManager;
pub use state::{AuthStatus, Operation, SessionState};
