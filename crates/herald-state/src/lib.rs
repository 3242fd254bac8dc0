//! Persistence for the last-announced-episode cursor.

pub mod error;
pub mod file;
pub mod object;
pub mod store;

pub use error::StateError;
pub use file::FileStateStore;
pub use object::ObjectStateStore;
pub use store::{from_location, StateStore};
