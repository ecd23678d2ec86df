//! Export definition builder
//!
//! Turns user input (or server-discovered defaults) into an [`ExportDefinition`]
//! plus the ordered output-column aliases the sinks print.

use crate::client::BulkApi;
use crate::error::{Error, Result};
use crate::types::{ExportDefinition, ExportResource, FieldMap};
use chrono::Utc;
use regex::Regex;

/// Longest export definition name the Bulk API accepts
pub const MAX_NAME_LEN: usize = 100;

/// Default for both staging durations
pub const DEFAULT_DURATION: &str = "PT12H";

/// URI prefix of custom object schemas, `/customObjects/<id>`
pub const CUSTOM_OBJECT_URI_PREFIX: &str = "/customObjects/";

/// Designators in order; every component optional, at least one required
const ISO_8601_DURATION: &str =
    r"^P(?:\d+Y)?(?:\d+M)?(?:\d+W)?(?:\d+D)?(?:T(?:\d+H)?(?:\d+M)?(?:\d+(?:\.\d+)?S)?)?$";

/// Field mapping and the order its aliases should be printed in
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldSelection {
    /// alias to expression
    pub fields: FieldMap,
    /// aliases in input (or discovery) order
    pub keys: Vec<String>,
}

impl FieldSelection {
    fn from_map(fields: FieldMap) -> Self {
        let keys = fields.keys().cloned().collect();
        Self { fields, keys }
    }
}

/// Parse `alias1:expr1,alias2:expr2,...`.
///
/// Every entry needs exactly one `:`; whitespace around alias and expression is
/// trimmed. A repeated alias keeps its first position and its last expression.
pub fn parse_field_spec(spec: &str) -> Result<FieldSelection> {
    let mut fields = FieldMap::new();
    for entry in spec.split(',') {
        let mut parts = entry.split(':');
        let (Some(alias), Some(expression), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::InvalidFieldSpec {
                entry: entry.to_string(),
            });
        };
        fields.insert(alias.trim().to_string(), expression.trim().to_string());
    }
    Ok(FieldSelection::from_map(fields))
}

/// Use the user's `--fields` when given, else every field the API lists for
/// `resource` (internal name as alias, statement as expression).
pub async fn resolve_fields(
    api: &dyn BulkApi,
    resource: &ExportResource,
    spec: &str,
) -> Result<FieldSelection> {
    if !spec.trim().is_empty() {
        return parse_field_spec(spec);
    }

    let discovered = api.list_fields(resource).await?;
    tracing::debug!(
        resource = resource.label(),
        fields = discovered.len(),
        "discovered default fields"
    );
    if discovered.is_empty() {
        return Err(Error::NotFound(format!(
            "no fields listed for {}",
            resource.label()
        )));
    }
    Ok(FieldSelection::from_map(
        discovered
            .into_iter()
            .map(|f| (f.internal_name, f.statement))
            .collect(),
    ))
}

/// Settings shared by every export subcommand
#[derive(Clone, Debug)]
pub struct ExportSettings {
    /// Definition name; generated when empty
    pub name: String,
    /// Row cap, 0 for unbounded
    pub max_records: u32,
    /// Export system timestamps in UTC
    pub utc: bool,
    /// ISO-8601 duration before the definition is deleted
    pub auto_delete_duration: String,
    /// ISO-8601 duration the synced data is kept
    pub data_retention_duration: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            max_records: 0,
            utc: true,
            auto_delete_duration: DEFAULT_DURATION.to_string(),
            data_retention_duration: DEFAULT_DURATION.to_string(),
        }
    }
}

impl ExportSettings {
    /// Check name length and both durations
    pub fn validate(&self) -> Result<()> {
        let len = self.name.chars().count();
        if len > MAX_NAME_LEN {
            return Err(Error::validation(
                "name",
                format!("{len} characters, at most {MAX_NAME_LEN} allowed"),
            ));
        }
        check_duration("auto-delete-duration", &self.auto_delete_duration)?;
        check_duration("data-retention-duration", &self.data_retention_duration)
    }

    /// Build the definition for `resource` from validated settings
    pub fn build(
        &self,
        resource: &ExportResource,
        fields: FieldMap,
        filter: String,
    ) -> Result<ExportDefinition> {
        self.validate()?;
        if fields.is_empty() {
            return Err(Error::validation("fields", "at least one field is required"));
        }

        let name = if self.name.trim().is_empty() {
            generated_name(resource)
        } else {
            self.name.clone()
        };
        let parent_id = match resource {
            ExportResource::CustomObject { parent_id } => Some(*parent_id),
            _ => None,
        };

        Ok(ExportDefinition {
            name,
            fields,
            filter,
            max_records: self.max_records,
            timestamps_in_utc: self.utc,
            auto_delete_duration: self.auto_delete_duration.clone(),
            data_retention_duration: self.data_retention_duration.clone(),
            parent_id,
        })
    }
}

/// `eloquactl <resource> export <UTC timestamp>`
fn generated_name(resource: &ExportResource) -> String {
    format!(
        "eloquactl {} export {}",
        resource.label(),
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    )
}

/// Reject anything that is not an ISO-8601 duration such as `PT12H` or `P1DT6H`
pub fn check_duration(field: &str, value: &str) -> Result<()> {
    let re = Regex::new(ISO_8601_DURATION)
        .map_err(|e| Error::config(field, format!("duration pattern: {e}")))?;
    // "P" and "PT" match the pattern but carry no component
    let has_component = value.bytes().any(|b| b.is_ascii_digit());
    if re.is_match(value) && has_component && !value.ends_with('T') {
        Ok(())
    } else {
        Err(Error::validation(
            field,
            format!("{value:?} is not an ISO-8601 duration (e.g. PT12H, P1D)"),
        ))
    }
}

/// Resolve a custom object by numeric id or exact name
pub async fn resolve_custom_object(api: &dyn BulkApi, name_or_id: &str) -> Result<u64> {
    let name_or_id = name_or_id.trim();
    if !name_or_id.is_empty() && name_or_id.bytes().all(|b| b.is_ascii_digit()) {
        return name_or_id
            .parse()
            .map_err(|_| Error::validation("cdo", format!("{name_or_id:?} is not a valid id")));
    }

    let objects = api.list_custom_objects().await?;
    let object = objects
        .iter()
        .find(|o| o.name == name_or_id)
        .ok_or_else(|| Error::NotFound(format!("custom object {name_or_id:?}")))?;
    let id = custom_object_id(&object.uri)?;
    tracing::debug!(name = name_or_id, id, "resolved custom object");
    Ok(id)
}

fn custom_object_id(uri: &str) -> Result<u64> {
    uri.get(CUSTOM_OBJECT_URI_PREFIX.len()..)
        .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::NotFound(format!("custom object id in URI {uri:?}")))
}

/// Score fields of `model`, followed by the contact id and email address
pub async fn scoring_fields(api: &dyn BulkApi, model: &str) -> Result<FieldSelection> {
    let models = api.list_scoring_models().await?;
    let model = models
        .into_iter()
        .find(|m| m.name == model)
        .ok_or_else(|| Error::NotFound(format!("scoring model {model:?}")))?;

    let mut fields: FieldMap = model
        .fields
        .into_iter()
        .map(|f| (f.name, f.statement))
        .collect();
    append_contact_identity(&mut fields);
    Ok(FieldSelection::from_map(fields))
}

/// Score exports always carry the contact id and email address
pub fn append_contact_identity(fields: &mut FieldMap) {
    fields.insert("ContactId".to_string(), "{{Contact.Id}}".to_string());
    fields.insert(
        "EmailAddress".to_string(),
        "{{Contact.Field(C_EmailAddress)}}".to_string(),
    );
}

/// Like [`append_contact_identity`], keeping `keys` in step
pub fn with_contact_identity(mut selection: FieldSelection) -> FieldSelection {
    append_contact_identity(&mut selection.fields);
    selection.keys = selection.fields.keys().cloned().collect();
    selection
}
