//! wiremock-backed Bulk API stand-in

use eloquactl::config::{ApiConfig, Config, SyncConfig};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path prefix every Bulk API 2.0 request carries
pub const API_ROOT: &str = "/api/bulk/2.0";

/// Company, user and password used by every test client
pub const CREDENTIALS: (&str, &str, &str) = ("Acme", "jane", "secret");

/// Config pointing at `server`, polling every few milliseconds
pub fn config_for(server: &MockServer) -> Config {
    let (company, username, password) = CREDENTIALS;
    Config {
        api: ApiConfig {
            bulk_url: format!("{}/api/bulk/{{version}}", server.uri()),
            company: company.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            ..Default::default()
        },
        sync: SyncConfig {
            poll_interval: Duration::from_millis(5),
            timeout: Some(Duration::from_secs(10)),
            page_size: 25_000,
        },
        ..Default::default()
    }
}

/// `POST /{resource}/exports` answering with `export_uri`
pub async fn mount_create_export(server: &MockServer, resource: &str, export_uri: &str) {
    Mock::given(method("POST"))
        .and(path(format!("{API_ROOT}/{resource}/exports")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "e2e",
            "uri": export_uri
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// `POST /syncs` answering with `/syncs/{sync_id}` in `status`
pub async fn mount_create_sync(server: &MockServer, sync_id: u64, status: &str) {
    Mock::given(method("POST"))
        .and(path(format!("{API_ROOT}/syncs")))
        .respond_with(ResponseTemplate::new(201).set_body_json(sync_body(sync_id, status)))
        .expect(1)
        .mount(server)
        .await;
}

/// `GET /syncs/{id}` answering `status` for the next `times` calls
pub async fn mount_sync_status(server: &MockServer, sync_id: u64, status: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("{API_ROOT}/syncs/{sync_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(sync_body(sync_id, status)))
        .up_to_n_times(times)
        .expect(times)
        .mount(server)
        .await;
}

/// `GET /syncs/{id}/data` at `offset` answering `rows`
pub async fn mount_page(server: &MockServer, sync_id: u64, offset: u64, rows: Vec<Value>, has_more: bool) {
    Mock::given(method("GET"))
        .and(path(format!("{API_ROOT}/syncs/{sync_id}/data")))
        .and(query_param("limit", "25000"))
        .and(query_param("offset", offset.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalResults": rows.len(),
            "limit": 25000,
            "offset": offset,
            "count": rows.len(),
            "hasMore": has_more,
            "items": rows
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn sync_body(sync_id: u64, status: &str) -> Value {
    json!({
        "syncedInstanceUri": "/contacts/exports/18",
        "status": status,
        "createdAt": "2019-09-05T10:00:00.000Z",
        "uri": format!("/syncs/{sync_id}")
    })
}

/// Contact rows `{"Id": n, "Email": "n@example.com"}` for `ids`
pub fn contact_rows(ids: std::ops::Range<u64>) -> Vec<Value> {
    ids.map(|id| json!({"Id": id.to_string(), "Email": format!("{id}@example.com")}))
        .collect()
}
