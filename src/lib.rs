// Library interface for spindeck
// This allows integration tests to access internal modules

pub mod errors;
pub mod sessions;
pub mod spin;
pub mod ui;
pub mod writer;

// Re-export commonly used types
pub use errors::SpindeckError;
pub use sessions::Session;
pub use sessions::loader::{LoadState, SessionLoader, SessionSource};
pub use spin::{Rotatable, SpinAnimator, SpinState};
