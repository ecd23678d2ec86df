use super::PrintArgs;
use crate::client::BulkApi;
use crate::config::Config;
use crate::definition::{
    DEFAULT_DURATION, ExportSettings, FieldSelection, parse_field_spec, resolve_custom_object,
    resolve_fields, scoring_fields, with_contact_identity,
};
use crate::error::Result;
use crate::export::run_export;
use crate::filter::{
    ActivityFilter, Entity, EntityFilter, check_activity_type, check_optional_date,
};
use crate::types::ExportResource;
use clap::{ArgAction, Args, Subcommand};

/// Export subcommands, one per resource
#[derive(Subcommand, Debug)]
pub enum ExportCommand {
    /// Export accounts
    Accounts(EntityExportArgs),
    /// Export activities of one type
    Activities(ActivityExportArgs),
    /// Export custom data object records
    Cdos(CdoExportArgs),
    /// Export contacts
    Contacts(EntityExportArgs),
    /// Export lead scores of one scoring model
    Scores(ScoresExportArgs),
}

/// Flags shared by every export
#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Export definition name (generated when omitted)
    #[arg(short = 'n', long, default_value = "")]
    pub name: String,

    /// Output fields as `alias:expression,...` (discovered when omitted)
    #[arg(long, default_value = "")]
    pub fields: String,

    /// Filter predicate, AND-ed with generated clauses
    #[arg(long, default_value = "")]
    pub filter: String,

    /// Maximum rows to export (0 for all)
    #[arg(long, default_value_t = 0)]
    pub max_records: u32,

    /// Export system timestamps in UTC
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub utc: bool,

    /// ISO-8601 duration until the export definition is deleted
    #[arg(long, default_value = DEFAULT_DURATION)]
    pub auto_delete_duration: String,

    /// ISO-8601 duration the synced data is retained
    #[arg(long, default_value = DEFAULT_DURATION)]
    pub data_retention_duration: String,
}

impl ExportArgs {
    fn settings(&self) -> ExportSettings {
        ExportSettings {
            name: self.name.clone(),
            max_records: self.max_records,
            utc: self.utc,
            auto_delete_duration: self.auto_delete_duration.clone(),
            data_retention_duration: self.data_retention_duration.clone(),
        }
    }
}

/// `export accounts` / `export contacts`
#[derive(Args, Debug, Clone)]
pub struct EntityExportArgs {
    /// Shared export flags
    #[command(flatten)]
    pub export: ExportArgs,

    /// Output flags
    #[command(flatten)]
    pub print: PrintArgs,

    /// Only these email addresses (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub email_addresses: Vec<String>,

    /// Created on this day (YYYY-MM-DD)
    #[arg(long)]
    pub created_at: Option<String>,

    /// Created after this day (YYYY-MM-DD)
    #[arg(long)]
    pub created_after: Option<String>,

    /// Updated on this day (YYYY-MM-DD)
    #[arg(long)]
    pub updated_at: Option<String>,

    /// Updated after this day (YYYY-MM-DD)
    #[arg(long)]
    pub updated_after: Option<String>,
}

impl EntityExportArgs {
    fn filter(&self, entity: Entity) -> Result<EntityFilter> {
        Ok(EntityFilter {
            entity,
            email_addresses: self.email_addresses.clone(),
            created_at: check_optional_date("created-at", self.created_at.as_deref())?,
            created_after: check_optional_date("created-after", self.created_after.as_deref())?,
            updated_at: check_optional_date("updated-at", self.updated_at.as_deref())?,
            updated_after: check_optional_date("updated-after", self.updated_after.as_deref())?,
        })
    }
}

/// `export activities`
#[derive(Args, Debug, Clone)]
pub struct ActivityExportArgs {
    /// Shared export flags
    #[command(flatten)]
    pub export: ExportArgs,

    /// Output flags
    #[command(flatten)]
    pub print: PrintArgs,

    /// Activity type, e.g. EmailOpen
    #[arg(short = 't', long = "type")]
    pub activity_type: String,

    /// Inclusive lower bound on the activity date (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    /// Exclusive upper bound on the activity date (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<String>,
}

/// `export cdos`
#[derive(Args, Debug, Clone)]
pub struct CdoExportArgs {
    /// Custom object name or numeric id
    #[arg(value_name = "NAME|ID")]
    pub cdo: String,

    /// Shared export flags
    #[command(flatten)]
    pub export: ExportArgs,

    /// Output flags
    #[command(flatten)]
    pub print: PrintArgs,
}

/// `export scores`
#[derive(Args, Debug, Clone)]
pub struct ScoresExportArgs {
    /// Lead scoring model name
    #[arg(value_name = "MODEL")]
    pub model: String,

    /// Shared export flags
    #[command(flatten)]
    pub export: ExportArgs,

    /// Output flags
    #[command(flatten)]
    pub print: PrintArgs,
}

/// Everything needed to submit one export
struct Prepared<'a> {
    resource: ExportResource,
    selection: FieldSelection,
    filter: String,
    export: &'a ExportArgs,
    print: &'a PrintArgs,
}

pub(super) async fn execute(api: &dyn BulkApi, config: &Config, command: ExportCommand) -> Result<()> {
    let prepared = match &command {
        ExportCommand::Accounts(args) => prepare_entity(api, args, Entity::Account).await?,
        ExportCommand::Contacts(args) => prepare_entity(api, args, Entity::Contact).await?,
        ExportCommand::Activities(args) => prepare_activities(api, args).await?,
        ExportCommand::Cdos(args) => prepare_cdo(api, args).await?,
        ExportCommand::Scores(args) => prepare_scores(api, args).await?,
    };
    submit(api, config, prepared).await
}

async fn prepare_entity<'a>(
    api: &dyn BulkApi,
    args: &'a EntityExportArgs,
    entity: Entity,
) -> Result<Prepared<'a>> {
    args.export.settings().validate()?;
    let filter = args.filter(entity)?.build(&args.export.filter)?;
    let resource = match entity {
        Entity::Contact => ExportResource::Contacts,
        Entity::Account => ExportResource::Accounts,
    };
    let selection = resolve_fields(api, &resource, &args.export.fields).await?;
    Ok(Prepared {
        resource,
        selection,
        filter,
        export: &args.export,
        print: &args.print,
    })
}

async fn prepare_activities<'a>(
    api: &dyn BulkApi,
    args: &'a ActivityExportArgs,
) -> Result<Prepared<'a>> {
    args.export.settings().validate()?;
    check_activity_type(&args.activity_type)?;
    let activity = ActivityFilter {
        activity_type: args.activity_type.clone(),
        since: check_optional_date("since", args.since.as_deref())?,
        until: check_optional_date("until", args.until.as_deref())?,
    };
    let resource = ExportResource::Activities {
        activity_type: args.activity_type.clone(),
    };
    let selection = resolve_fields(api, &resource, &args.export.fields).await?;
    Ok(Prepared {
        resource,
        selection,
        filter: activity.build(&args.export.filter),
        export: &args.export,
        print: &args.print,
    })
}

async fn prepare_cdo<'a>(api: &dyn BulkApi, args: &'a CdoExportArgs) -> Result<Prepared<'a>> {
    args.export.settings().validate()?;
    let parent_id = resolve_custom_object(api, &args.cdo).await?;
    let resource = ExportResource::CustomObject { parent_id };
    let selection = resolve_fields(api, &resource, &args.export.fields).await?;
    Ok(Prepared {
        resource,
        selection,
        filter: args.export.filter.trim().to_string(),
        export: &args.export,
        print: &args.print,
    })
}

async fn prepare_scores<'a>(
    api: &dyn BulkApi,
    args: &'a ScoresExportArgs,
) -> Result<Prepared<'a>> {
    args.export.settings().validate()?;
    let selection = if args.export.fields.trim().is_empty() {
        scoring_fields(api, &args.model).await?
    } else {
        with_contact_identity(parse_field_spec(&args.export.fields)?)
    };
    Ok(Prepared {
        resource: ExportResource::Contacts,
        selection,
        filter: args.export.filter.trim().to_string(),
        export: &args.export,
        print: &args.print,
    })
}

async fn submit(api: &dyn BulkApi, config: &Config, prepared: Prepared<'_>) -> Result<()> {
    let Prepared {
        resource,
        selection,
        filter,
        export,
        print,
    } = prepared;

    let definition = export
        .settings()
        .build(&resource, selection.fields, filter)?;
    let mut sink = print.sink(selection.keys)?;
    run_export(api, config, &resource, &definition, sink.as_mut()).await?;
    Ok(())
}
