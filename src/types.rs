//! Core types for eloquactl: export definitions, sync jobs and result pages

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One exported row: output-column alias to rendered value
pub type Row = BTreeMap<String, String>;

/// Identifier of a sync, extracted from its `/syncs/<id>` URI
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncId(pub u64);

impl SyncId {
    /// Get the inner value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for SyncId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SyncId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-side state of a sync job
///
/// Only `success` and `error` are terminal. Any other status the server reports
/// (`pending`, `active`, ...) is treated as still in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Finished; data is ready for download
    Success,
    /// Finished without producing data
    Error,
    /// Queued or running
    #[serde(other)]
    Pending,
}

impl SyncStatus {
    /// Whether the sync will never change state again
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncStatus::Success | SyncStatus::Error)
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Success => "success",
            SyncStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Asynchronous server task materializing an export definition
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncJob {
    /// Sync URI, `/syncs/<id>`
    pub uri: String,
    /// Current state
    pub status: SyncStatus,
    /// URI of the export definition being synced
    #[serde(default)]
    pub synced_instance_uri: Option<String>,
    /// Creation timestamp as reported by the server
    #[serde(default)]
    pub created_at: Option<String>,
    /// When the server finished the sync
    #[serde(default)]
    pub sync_ended_at: Option<String>,
}

/// One page of synced rows
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage {
    /// Rows in server order
    #[serde(default, deserialize_with = "deserialize_rows")]
    pub items: Vec<Row>,
    /// Whether another page follows
    #[serde(default)]
    pub has_more: bool,
    /// Total rows in the sync, when reported
    #[serde(default)]
    pub total_results: Option<u64>,
}

/// Rows arrive as JSON objects whose values are usually strings; numbers and
/// booleans are rendered with their JSON text and `null` becomes empty.
fn deserialize_rows<'de, D>(deserializer: D) -> Result<Vec<Row>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Map<String, serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|object| {
            object
                .into_iter()
                .map(|(k, v)| {
                    let value = match v {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    (k, value)
                })
                .collect()
        })
        .collect())
}

/// Generic paged listing (`/fields`, `/customObjects`, scoring models)
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing<T> {
    /// Entries on this page
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Whether another page follows
    #[serde(default)]
    pub has_more: bool,
}

/// A field definition as listed by `GET /{resource}/fields`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Internal name, used as the default output alias
    pub internal_name: String,
    /// Field data type (e.g. "string", "date")
    #[serde(default)]
    pub data_type: Option<String>,
    /// Field reference expression, e.g. `{{Contact.Field(C_EmailAddress)}}`
    pub statement: String,
}

impl FieldDefinition {
    /// Render the definition as a row for the output sinks
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("name".to_string(), self.name.clone());
        row.insert("internalName".to_string(), self.internal_name.clone());
        row.insert(
            "dataType".to_string(),
            self.data_type.clone().unwrap_or_default(),
        );
        row.insert("statement".to_string(), self.statement.clone());
        row
    }
}

/// Column order used when printing [`FieldDefinition`] rows
pub const FIELD_DEFINITION_COLUMNS: [&str; 4] = ["name", "internalName", "dataType", "statement"];

/// A custom data object schema
#[derive(Clone, Debug, Deserialize)]
pub struct CustomObject {
    /// Display name
    pub name: String,
    /// URI, `/customObjects/<id>`
    pub uri: String,
}

/// A lead scoring model and the fields it exports
#[derive(Clone, Debug, Deserialize)]
pub struct ScoringModel {
    /// Model name
    pub name: String,
    /// Score fields (rating, profile, engagement)
    #[serde(default)]
    pub fields: Vec<ScoringField>,
}

/// One exportable field of a scoring model
#[derive(Clone, Debug, Deserialize)]
pub struct ScoringField {
    /// Field name, used as output alias
    pub name: String,
    /// Field reference expression
    pub statement: String,
}

/// Which collection an export targets
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportResource {
    /// Accounts (companies)
    Accounts,
    /// Contacts; lead scores export through this resource too
    Contacts,
    /// Activities of a single type
    Activities {
        /// Activity type, e.g. "EmailOpen"
        activity_type: String,
    },
    /// Records of one custom data object
    CustomObject {
        /// Custom object schema id
        parent_id: u64,
    },
}

impl ExportResource {
    /// Short name used in logs and generated export names
    pub fn label(&self) -> &'static str {
        match self {
            ExportResource::Accounts => "accounts",
            ExportResource::Contacts => "contacts",
            ExportResource::Activities { .. } => "activities",
            ExportResource::CustomObject { .. } => "cdos",
        }
    }
}

/// Alias to field-expression mapping in output-column order
///
/// Re-inserting an alias replaces its expression and keeps its position.
pub type FieldMap = IndexMap<String, String>;

/// Request body for `POST .../exports`
///
/// Built once per invocation and never changed after submission.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDefinition {
    /// Definition name, at most 100 characters
    pub name: String,
    /// Output columns
    pub fields: FieldMap,
    /// Query-language predicate; omitted when empty
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filter: String,
    /// Row cap; omitted when 0 (unbounded)
    #[serde(skip_serializing_if = "is_zero")]
    pub max_records: u32,
    /// Export system timestamps in UTC
    #[serde(rename = "areSystemTimestampsInUTC")]
    pub timestamps_in_utc: bool,
    /// ISO-8601 duration until the definition is deleted
    pub auto_delete_duration: String,
    /// ISO-8601 duration the synced data stays in staging
    pub data_retention_duration: String,
    /// Custom object schema id; travels in the URL path, not the body
    #[serde(skip)]
    pub parent_id: Option<u64>,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

/// Response of `POST .../exports`
#[derive(Clone, Debug, Deserialize)]
pub struct CreatedExport {
    /// Server-assigned export URI, e.g. `/contacts/exports/123`
    pub uri: String,
    /// Definition name as stored
    #[serde(default)]
    pub name: Option<String>,
}
