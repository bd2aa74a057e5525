//! Builder API for ergonomic state construction.

pub mod error;
pub mod state;

pub use error::BuildError;
pub use state::StateBuilder;
