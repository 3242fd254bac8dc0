//! Cursor stored as a single object in S3 (or any `object_store` backend).

use std::sync::Arc;

use async_trait::async_trait;
use herald_core::Cursor;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};

use crate::error::StateError;
use crate::store::StateStore;

pub struct ObjectStateStore {
    store: Arc<dyn ObjectStore>,
    key: Path,
    label: String,
}

impl std::fmt::Debug for ObjectStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStateStore")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl ObjectStateStore {
    /// Wrap an existing object store; `label` is only used in logs.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, key: &str, label: impl Into<String>) -> Self {
        Self {
            store,
            key: Path::from(key),
            label: label.into(),
        }
    }

    /// S3 bucket store. Credentials come from the usual `AWS_*` environment.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::ObjectStore`] if the S3 client cannot be built.
    pub fn s3(bucket: &str, key: &str, region: &str) -> Result<Self, StateError> {
        let store = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_region(region)
            .build()?;
        Ok(Self::new(Arc::new(store), key, format!("s3://{bucket}/{key}")))
    }
}

#[async_trait]
impl StateStore for ObjectStateStore {
    async fn load(&self) -> Result<Cursor, StateError> {
        let bytes = match self.store.get(&self.key).await {
            Ok(result) => result.bytes().await?,
            Err(object_store::Error::NotFound { .. }) => {
                tracing::debug!(location = %self.label, "state: no cursor object yet");
                return Ok(Cursor::default());
            }
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Cursor::default());
        }
        serde_json::from_slice(&bytes).map_err(|source| StateError::Json {
            context: self.label.clone(),
            source,
        })
    }

    async fn save(&self, cursor: &Cursor) -> Result<(), StateError> {
        let body = serde_json::to_vec(cursor).map_err(|source| StateError::Json {
            context: self.label.clone(),
            source,
        })?;
        self.store.put(&self.key, PutPayload::from(body)).await?;
        tracing::debug!(location = %self.label, "state: cursor saved");
        Ok(())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
