use async_trait::async_trait;
use herald_core::{Cursor, StateLocation};

use crate::error::StateError;
use crate::file::FileStateStore;
use crate::object::ObjectStateStore;

/// Durable storage for the single cursor record.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the cursor. An absent record is `Cursor::default()`, not an error.
    async fn load(&self) -> Result<Cursor, StateError>;

    /// Replace the stored cursor.
    async fn save(&self, cursor: &Cursor) -> Result<(), StateError>;

    /// Human-readable location for logs.
    fn describe(&self) -> String;
}

/// Build the store selected by configuration.
///
/// # Errors
///
/// Returns [`StateError::ObjectStore`] if the S3 client cannot be configured.
pub fn from_location(location: &StateLocation) -> Result<Box<dyn StateStore>, StateError> {
    match location {
        StateLocation::File(path) => Ok(Box::new(FileStateStore::new(path.clone()))),
        StateLocation::S3 {
            bucket,
            key,
            region,
        } => Ok(Box::new(ObjectStateStore::s3(bucket, key, region)?)),
    }
}
