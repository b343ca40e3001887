// Library interface for folymarket
// This allows integration tests to access internal modules

pub mod cli;
pub mod error;
pub mod history;
pub mod logging;
pub mod model;
pub mod scoring;
pub mod session;
pub mod tui;

// Re-export commonly used items for easier testing
pub use error::SessionError;
pub use model::{Flag, Scenario, ScoringMode, Variable, coerce_value};
pub use scoring::{Outcome, RATIONALES, score, score_all};
pub use session::{Session, SessionInterface, UserAction, session_loop};
