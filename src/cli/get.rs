use super::PrintArgs;
use crate::client::BulkApi;
use crate::definition::resolve_custom_object;
use crate::error::Result;
use crate::types::{ExportResource, FIELD_DEFINITION_COLUMNS, Row};
use clap::Subcommand;

/// Metadata listings
#[derive(Subcommand, Debug)]
pub enum GetCommand {
    /// List contact field definitions
    ContactFields(PrintArgs),
    /// List field definitions of a custom data object
    CdoFields {
        /// Custom object name or numeric id
        #[arg(value_name = "NAME|ID")]
        cdo: String,

        /// Output flags
        #[command(flatten)]
        print: PrintArgs,
    },
}

pub(super) async fn execute(api: &dyn BulkApi, command: GetCommand) -> Result<()> {
    let (resource, print) = match command {
        GetCommand::ContactFields(print) => (ExportResource::Contacts, print),
        GetCommand::CdoFields { cdo, print } => {
            let parent_id = resolve_custom_object(api, &cdo).await?;
            (ExportResource::CustomObject { parent_id }, print)
        }
    };

    let fields = api.list_fields(&resource).await?;
    tracing::info!(resource = resource.label(), fields = fields.len(), "listed fields");

    let rows: Vec<Row> = fields.iter().map(|f| f.to_row()).collect();
    let columns = FIELD_DEFINITION_COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut sink = print.sink(columns)?;
    sink.render(&rows)?;
    sink.finish()
}
