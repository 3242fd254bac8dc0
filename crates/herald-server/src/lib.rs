//! Poll loop and liveness endpoint for the `podherald` binary.

pub mod health;
pub mod orchestrator;

pub use health::health_router;
pub use orchestrator::{
    AnnounceSettings, Announcer, CycleError, CycleFailure, CycleOutcome, FeedSource, Orchestrator,
    Phase,
};
