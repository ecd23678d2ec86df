//! Remote Bulk API access
//!
//! The export pipeline only talks to the [`BulkApi`] trait. [`HttpBulkClient`] is
//! the production implementation; tests substitute a scripted in-memory fake.
//!
//! ```no_run
//! use eloquactl::client::{BulkApi, HttpBulkClient};
//! use eloquactl::config::ApiConfig;
//! use eloquactl::types::ExportResource;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ApiConfig {
//!     bulk_url: "https://secure.p01.eloqua.com/api/bulk/{version}".to_string(),
//!     company: "Acme".to_string(),
//!     username: "jane.doe".to_string(),
//!     password: "secret".to_string(),
//!     ..Default::default()
//! };
//! let client = HttpBulkClient::new(&config)?;
//! let fields = client.list_fields(&ExportResource::Contacts).await?;
//! println!("{} contact fields", fields.len());
//! # Ok(())
//! # }
//! ```

mod http;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use http::HttpBulkClient;

use crate::error::Result;
use crate::types::{
    CreatedExport, CustomObject, ExportDefinition, ExportResource, FieldDefinition, ResultPage,
    ScoringModel, SyncId, SyncJob,
};
use async_trait::async_trait;

/// Operations the export workflow needs from the remote service
#[async_trait]
pub trait BulkApi: Send + Sync {
    /// Submit an export definition for `resource`; returns the server-assigned URI
    async fn create_export(
        &self,
        resource: &ExportResource,
        definition: &ExportDefinition,
    ) -> Result<CreatedExport>;

    /// Start synchronizing the export at `export_uri`
    async fn create_sync(&self, export_uri: &str) -> Result<SyncJob>;

    /// Re-fetch a sync's current state
    async fn get_sync(&self, id: SyncId) -> Result<SyncJob>;

    /// Fetch up to `limit` synced rows starting at `offset`
    async fn get_sync_page(&self, id: SyncId, limit: u32, offset: u64) -> Result<ResultPage>;

    /// All field definitions of `resource`, in API order
    async fn list_fields(&self, resource: &ExportResource) -> Result<Vec<FieldDefinition>>;

    /// All custom data object schemas
    async fn list_custom_objects(&self) -> Result<Vec<CustomObject>>;

    /// All lead scoring models
    async fn list_scoring_models(&self) -> Result<Vec<ScoringModel>>;
}
