//! Scripted in-memory [`BulkApi`] for orchestrator and pipeline tests.

use super::BulkApi;
use crate::error::{Error, Result};
use crate::types::{
    CreatedExport, CustomObject, ExportDefinition, ExportResource, FieldDefinition, ResultPage,
    Row, ScoringModel, SyncId, SyncJob, SyncStatus,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One recorded call against the fake
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    CreateExport { resource: ExportResource, body: String },
    CreateSync(String),
    GetSync(u64),
    GetSyncPage { id: u64, limit: u32, offset: u64 },
    ListFields(ExportResource),
    ListCustomObjects,
    ListScoringModels,
}

/// A scripted response: `Err(status)` turns into [`Error::Api`]
pub(crate) type Scripted<T> = std::result::Result<T, u16>;

pub(crate) struct FakeBulkApi {
    pub sync_uri: String,
    pub initial_status: SyncStatus,
    statuses: Mutex<VecDeque<Scripted<SyncStatus>>>,
    pages: Mutex<VecDeque<Scripted<ResultPage>>>,
    pub fields: Vec<FieldDefinition>,
    pub custom_objects: Vec<CustomObject>,
    pub scoring_models: Vec<ScoringModel>,
    calls: Mutex<Vec<Call>>,
}

impl Default for FakeBulkApi {
    fn default() -> Self {
        Self {
            sync_uri: "/syncs/12345".to_string(),
            initial_status: SyncStatus::Pending,
            statuses: Mutex::new(VecDeque::new()),
            pages: Mutex::new(VecDeque::new()),
            fields: Vec::new(),
            custom_objects: Vec::new(),
            scoring_models: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeBulkApi {
    /// Statuses returned by successive `get_sync` calls
    pub fn with_statuses(self, statuses: Vec<Scripted<SyncStatus>>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    /// Pages returned by successive `get_sync_page` calls
    pub fn with_pages(self, pages: Vec<Scripted<ResultPage>>) -> Self {
        *self.pages.lock().unwrap() = pages.into();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn job(&self, status: SyncStatus) -> SyncJob {
        SyncJob {
            uri: self.sync_uri.clone(),
            status,
            synced_instance_uri: Some("/contacts/exports/1".to_string()),
            created_at: None,
            sync_ended_at: None,
        }
    }
}

fn api_error(status: u16) -> Error {
    Error::Api {
        status,
        body: format!("scripted failure {status}"),
    }
}

/// A page of `n` rows with a single `Id` column
pub(crate) fn page_of(n: usize, has_more: bool) -> ResultPage {
    let items = (0..n)
        .map(|i| {
            let mut row = Row::new();
            row.insert("Id".to_string(), i.to_string());
            row
        })
        .collect();
    ResultPage {
        items,
        has_more,
        total_results: None,
    }
}

pub(crate) fn field(internal_name: &str, statement: &str) -> FieldDefinition {
    FieldDefinition {
        name: internal_name.to_string(),
        internal_name: internal_name.to_string(),
        data_type: Some("string".to_string()),
        statement: statement.to_string(),
    }
}

#[async_trait]
impl BulkApi for FakeBulkApi {
    async fn create_export(
        &self,
        resource: &ExportResource,
        definition: &ExportDefinition,
    ) -> Result<CreatedExport> {
        self.record(Call::CreateExport {
            resource: resource.clone(),
            body: serde_json::to_string(definition)?,
        });
        Ok(CreatedExport {
            uri: "/contacts/exports/1".to_string(),
            name: Some(definition.name.clone()),
        })
    }

    async fn create_sync(&self, export_uri: &str) -> Result<SyncJob> {
        self.record(Call::CreateSync(export_uri.to_string()));
        Ok(self.job(self.initial_status))
    }

    async fn get_sync(&self, id: SyncId) -> Result<SyncJob> {
        self.record(Call::GetSync(id.get()));
        let next = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(SyncStatus::Pending));
        next.map(|status| self.job(status)).map_err(api_error)
    }

    async fn get_sync_page(&self, id: SyncId, limit: u32, offset: u64) -> Result<ResultPage> {
        self.record(Call::GetSyncPage {
            id: id.get(),
            limit,
            offset,
        });
        let next = self
            .pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(page_of(0, false)));
        next.map_err(api_error)
    }

    async fn list_fields(&self, resource: &ExportResource) -> Result<Vec<FieldDefinition>> {
        self.record(Call::ListFields(resource.clone()));
        Ok(self.fields.clone())
    }

    async fn list_custom_objects(&self) -> Result<Vec<CustomObject>> {
        self.record(Call::ListCustomObjects);
        Ok(self.custom_objects.clone())
    }

    async fn list_scoring_models(&self) -> Result<Vec<ScoringModel>> {
        self.record(Call::ListScoringModels);
        Ok(self.scoring_models.clone())
    }
}
