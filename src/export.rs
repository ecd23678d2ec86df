//! The export pipeline: define, sync, poll, download
//!
//! [`run_export`] drives one export end to end against any [`BulkApi`]. Every step
//! runs after the previous one completes; the first failure ends the run.

use crate::client::BulkApi;
use crate::config::Config;
use crate::download::{DownloadSummary, download_all};
use crate::error::Result;
use crate::output::RowSink;
use crate::sync::{start_sync, wait_for_sync};
use crate::types::{ExportDefinition, ExportResource, SyncId};
use std::time::Instant;

/// What a finished export produced
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportSummary {
    /// Server URI of the export definition
    pub export_uri: String,
    /// The sync that materialized it
    pub sync_id: SyncId,
    /// Pages and rows downloaded
    pub download: DownloadSummary,
}

/// Submit `definition`, wait for its sync, and stream every row into `sink`.
///
/// The sink is finished only when the whole download succeeded.
pub async fn run_export(
    api: &dyn BulkApi,
    config: &Config,
    resource: &ExportResource,
    definition: &ExportDefinition,
    sink: &mut dyn RowSink,
) -> Result<ExportSummary> {
    let started = Instant::now();

    let export = api.create_export(resource, definition).await?;
    tracing::info!(
        resource = resource.label(),
        name = %definition.name,
        export_uri = %export.uri,
        fields = definition.fields.len(),
        "export definition created"
    );

    let job = start_sync(api, &export.uri).await?;
    let sync_id = wait_for_sync(api, job, &config.sync, &config.retry).await?;

    let download = download_all(api, sync_id, config.sync.page_size, &config.retry, sink).await?;
    sink.finish()?;

    tracing::info!(
        sync_id = %sync_id,
        pages = download.pages,
        rows = download.rows,
        elapsed_ms = started.elapsed().as_millis(),
        "export complete"
    );

    Ok(ExportSummary {
        export_uri: export.uri,
        sync_id,
        download,
    })
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_helpers::{Call, FakeBulkApi, page_of};
    use crate::config::SyncConfig;
    use crate::error::Error;
    use crate::output::test_support::SharedBuffer;
    use crate::output::{OutputFormat, create_sink};
    use crate::types::{FieldMap, SyncStatus};
    use std::time::Duration;

    fn config() -> Config {
        Config {
            sync: SyncConfig {
                poll_interval: Duration::from_millis(2),
                timeout: Some(Duration::from_secs(5)),
                page_size: 25_000,
            },
            ..Default::default()
        }
    }

    fn definition() -> ExportDefinition {
        let fields = FieldMap::from([("Id".to_string(), "{{Contact.Id}}".to_string())]);
        ExportDefinition {
            name: "test".to_string(),
            fields,
            filter: String::new(),
            max_records: 0,
            timestamps_in_utc: true,
            auto_delete_duration: "PT12H".to_string(),
            data_retention_duration: "PT12H".to_string(),
            parent_id: None,
        }
    }

    #[tokio::test]
    async fn runs_every_step_in_order() {
        let api = FakeBulkApi::default()
            .with_statuses(vec![Ok(SyncStatus::Pending), Ok(SyncStatus::Success)])
            .with_pages(vec![Ok(page_of(2, true)), Ok(page_of(1, false))]);
        let buffer = SharedBuffer::default();
        let mut sink = create_sink(
            OutputFormat::Ndj,
            vec!["Id".to_string()],
            true,
            Box::new(buffer.clone()),
        );

        let summary = run_export(
            &api,
            &config(),
            &ExportResource::Contacts,
            &definition(),
            sink.as_mut(),
        )
        .await
        .unwrap();

        assert_eq!(summary.export_uri, "/contacts/exports/1");
        assert_eq!(summary.sync_id, SyncId(12345));
        assert_eq!(summary.download, DownloadSummary { pages: 2, rows: 3 });

        let calls = api.calls();
        assert!(matches!(calls[0], Call::CreateExport { .. }));
        assert_eq!(calls[1], Call::CreateSync("/contacts/exports/1".to_string()));
        assert_eq!(calls[2], Call::GetSync(12345));
        assert_eq!(calls[3], Call::GetSync(12345));
        assert_eq!(
            calls[4..],
            [
                Call::GetSyncPage {
                    id: 12345,
                    limit: 25_000,
                    offset: 0
                },
                Call::GetSyncPage {
                    id: 12345,
                    limit: 25_000,
                    offset: 25_000
                },
            ]
        );
        assert_eq!(
            buffer.contents(),
            "{\"Id\":\"0\"}\n{\"Id\":\"1\"}\n{\"Id\":\"0\"}\n"
        );
    }

    #[tokio::test]
    async fn failed_sync_downloads_nothing() {
        let api = FakeBulkApi::default()
            .with_statuses(vec![Ok(SyncStatus::Pending), Ok(SyncStatus::Error)]);
        let buffer = SharedBuffer::default();
        let mut sink = create_sink(OutputFormat::Json, Vec::new(), true, Box::new(buffer.clone()));

        let result = run_export(
            &api,
            &config(),
            &ExportResource::Contacts,
            &definition(),
            sink.as_mut(),
        )
        .await;

        assert!(matches!(result, Err(Error::SyncFailed { id: 12345 })));
        assert_eq!(
            api.count(|c| matches!(c, Call::GetSyncPage { .. })),
            0
        );
        assert!(buffer.contents().is_empty());
    }

    #[tokio::test]
    async fn immediate_success_downloads_single_page() {
        let mut api = FakeBulkApi::default().with_pages(vec![Ok(page_of(5, false))]);
        api.initial_status = SyncStatus::Success;
        let buffer = SharedBuffer::default();
        let mut sink = create_sink(OutputFormat::Table, Vec::new(), true, Box::new(buffer.clone()));

        let summary = run_export(
            &api,
            &config(),
            &ExportResource::Contacts,
            &definition(),
            sink.as_mut(),
        )
        .await
        .unwrap();

        assert_eq!(summary.download, DownloadSummary { pages: 1, rows: 5 });
        assert_eq!(api.count(|c| matches!(c, Call::GetSync(_))), 0);
        assert_eq!(api.count(|c| matches!(c, Call::GetSyncPage { .. })), 1);
        assert_eq!(buffer.contents(), "ID\n0\n1\n2\n3\n4\n");
    }

    #[tokio::test]
    async fn malformed_sync_uri_stops_before_polling() {
        let mut api = FakeBulkApi::default();
        api.sync_uri = "/syncs/abc".to_string();
        let mut sink = create_sink(
            OutputFormat::Ndj,
            Vec::new(),
            true,
            Box::new(SharedBuffer::default()),
        );

        let result = run_export(
            &api,
            &config(),
            &ExportResource::Contacts,
            &definition(),
            sink.as_mut(),
        )
        .await;

        assert!(matches!(result, Err(Error::MalformedSyncUri { .. })));
        assert_eq!(api.calls().len(), 2);
    }
}
