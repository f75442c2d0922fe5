//! Client-side session: state machine, events and transpose form preview

pub mod events;
pub mod orchestrator;
pub mod preview;

pub use events::SessionEvent;
pub use orchestrator::{SessionOrchestrator, TRANSPOSE_SUCCESS_MESSAGE};
pub use preview::TransposeDraft;
