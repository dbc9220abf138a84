pub mod logging;
mod reach;
pub mod state;
pub mod types;

pub use logging::*;
pub use state::AssignmentState;
pub use types::*;
