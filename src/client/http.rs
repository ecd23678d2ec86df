//! reqwest-backed [`BulkApi`] implementation

use super::BulkApi;
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::types::{
    CreatedExport, CustomObject, ExportDefinition, ExportResource, FieldDefinition, Listing,
    ResultPage, ScoringModel, SyncId, SyncJob,
};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Page size used when walking `/fields` and other listings
const LISTING_PAGE_SIZE: u32 = 1000;

/// Bulk API client using HTTP basic auth
#[derive(Clone, Debug)]
pub struct HttpBulkClient {
    http: reqwest::Client,
    base_url: String,
    user: String,
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncRequest<'a> {
    synced_instance_uri: &'a str,
}

impl HttpBulkClient {
    /// Build a client from the API configuration
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("eloquactl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            user: config.auth_user(),
            password: config.password.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let request = self.http.get(self.url(path)).query(query);
        self.send(request).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.http.post(self.url(path)).json(body);
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Walk a paged listing until the server reports no more entries
    async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        extra_query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut offset: u64 = 0;

        loop {
            let mut query = extra_query.to_vec();
            query.push(("limit", LISTING_PAGE_SIZE.to_string()));
            query.push(("offset", offset.to_string()));

            let page: Listing<T> = self.get_json(path, &query).await?;
            let received = page.items.len();
            items.extend(page.items);

            if !page.has_more || received == 0 {
                break;
            }
            offset += received as u64;
        }

        Ok(items)
    }
}

fn exports_path(resource: &ExportResource) -> String {
    match resource {
        ExportResource::Accounts => "/accounts/exports".to_string(),
        ExportResource::Contacts => "/contacts/exports".to_string(),
        ExportResource::Activities { .. } => "/activities/exports".to_string(),
        ExportResource::CustomObject { parent_id } => {
            format!("/customObjects/{parent_id}/exports")
        }
    }
}

fn fields_request(resource: &ExportResource) -> (String, Vec<(&'static str, String)>) {
    match resource {
        ExportResource::Accounts => ("/accounts/fields".to_string(), Vec::new()),
        ExportResource::Contacts => ("/contacts/fields".to_string(), Vec::new()),
        ExportResource::Activities { activity_type } => (
            "/activities/fields".to_string(),
            vec![("activityType", activity_type.clone())],
        ),
        ExportResource::CustomObject { parent_id } => {
            (format!("/customObjects/{parent_id}/fields"), Vec::new())
        }
    }
}

#[async_trait]
impl BulkApi for HttpBulkClient {
    async fn create_export(
        &self,
        resource: &ExportResource,
        definition: &ExportDefinition,
    ) -> Result<CreatedExport> {
        self.post_json(&exports_path(resource), definition).await
    }

    async fn create_sync(&self, export_uri: &str) -> Result<SyncJob> {
        self.post_json(
            "/syncs",
            &SyncRequest {
                synced_instance_uri: export_uri,
            },
        )
        .await
    }

    async fn get_sync(&self, id: SyncId) -> Result<SyncJob> {
        self.get_json(&format!("/syncs/{id}"), &[]).await
    }

    async fn get_sync_page(&self, id: SyncId, limit: u32, offset: u64) -> Result<ResultPage> {
        self.get_json(
            &format!("/syncs/{id}/data"),
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await
    }

    async fn list_fields(&self, resource: &ExportResource) -> Result<Vec<FieldDefinition>> {
        let (path, query) = fields_request(resource);
        self.list_all(&path, &query).await
    }

    async fn list_custom_objects(&self) -> Result<Vec<CustomObject>> {
        self.list_all("/customObjects", &[]).await
    }

    async fn list_scoring_models(&self) -> Result<Vec<ScoringModel>> {
        self.list_all("/contacts/scoring/models", &[]).await
    }
}
