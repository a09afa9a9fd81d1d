//! HTTP request handlers
//!
//! Thin adapters between the HTTP surface and the directory operations.
//! Filesystem work runs on the blocking pool.

use axum::body::Body;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{
    ConnectInfo, DefaultBodyLimit, FromRequest, FromRequestParts, Multipart, Query, State,
};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, extract, middleware};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::audit::AuditRecord;
use crate::error::{ApiError, StoreError};
use crate::middleware::log_request;
use crate::server::state::AppState;
use crate::storage::{Entry, SortKey};
use crate::usage::{DiskUsageReport, disk_usage};

/// Multipart field carrying uploaded files
const UPLOAD_FIELD: &str = "files";

pub fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/upload", post(upload))
        .route("/files", get(list_files))
        .route("/folder", post(create_folder))
        .route("/rename", post(rename))
        .route("/delete", post(delete))
        .route("/move", post(move_entry))
        .route("/download/{category}/{stored_id}", get(download))
        .route("/admin/logs", get(audit_logs))
        .route("/admin/disk-usage", get(disk_usage_report))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// JSON body whose rejections render as `ApiError`
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
struct JsonBody<T>(T);

/// Query string whose rejections render as `ApiError`
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
struct QueryParams<T>(T);

/// Path parameters whose rejections render as `ApiError`
#[derive(FromRequestParts)]
#[from_request(via(extract::Path), rejection(ApiError))]
struct PathParams<T>(T);

#[derive(Debug, Deserialize)]
struct UploadQuery {
    category: Option<String>,
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    category: String,
    path: Option<String>,
    search: Option<String>,
    sort: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PathQuery {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FolderRequest {
    category: String,
    path: Option<String>,
    folder_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenameRequest {
    category: String,
    path: Option<String>,
    old_name: String,
    new_name: String,
}

#[derive(Debug, Deserialize)]
struct DeleteRequest {
    category: String,
    path: Option<String>,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoveRequest {
    category: String,
    src_path: Option<String>,
    dest_path: Option<String>,
    name: String,
}

/// Runs a storage task on the blocking pool
async fn blocking<T, E, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ApiError::Internal(format!("storage task failed: {e}")))?
        .map_err(Into::into)
}

fn actor(addr: &SocketAddr) -> String {
    addr.ip().to_string()
}

async fn upload(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    QueryParams(query): QueryParams<UploadQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let mut multipart = multipart?;
    let category = query
        .category
        .unwrap_or_else(|| state.default_category.to_string());
    let path = query.path.unwrap_or_default();

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if files.len() == state.limits.max_files {
            return Err(ApiError::TooManyFiles(state.limits.max_files));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        if data.len() as u64 > state.limits.max_file_bytes {
            return Err(ApiError::FileTooLarge {
                name: file_name,
                limit: state.limits.max_file_bytes,
            });
        }
        files.push((file_name, data));
    }

    if files.is_empty() {
        return Err(ApiError::NoFiles);
    }

    let store = Arc::clone(&state.store);
    let actor = actor(&addr);
    let entries: Vec<Entry> = blocking(move || {
        files
            .iter()
            .map(|(name, data)| store.ingest(&actor, &category, &path, name, data))
            .collect::<Result<Vec<_>, StoreError>>()
    })
    .await?;

    Ok(Json(json!({ "success": true, "entries": entries })))
}

async fn list_files(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<Vec<Entry>>, ApiError> {
    let store = Arc::clone(&state.store);
    let entries = blocking(move || {
        store.list(
            &query.category,
            query.path.as_deref().unwrap_or(""),
            query.search.as_deref(),
            SortKey::from_query(query.sort.as_deref()),
        )
    })
    .await?;
    Ok(Json(entries))
}

async fn create_folder(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    JsonBody(request): JsonBody<FolderRequest>,
) -> Result<Json<Value>, ApiError> {
    let store = Arc::clone(&state.store);
    let actor = actor(&addr);
    let outcome = blocking(move || {
        store.create_folder(
            &actor,
            &request.category,
            request.path.as_deref().unwrap_or(""),
            &request.folder_name,
        )
    })
    .await?;
    Ok(Json(json!({ "success": true, "created": outcome.is_created() })))
}

async fn rename(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    JsonBody(request): JsonBody<RenameRequest>,
) -> Result<Json<Value>, ApiError> {
    let store = Arc::clone(&state.store);
    let actor = actor(&addr);
    blocking(move || {
        store.rename(
            &actor,
            &request.category,
            request.path.as_deref().unwrap_or(""),
            &request.old_name,
            &request.new_name,
        )
    })
    .await?;
    Ok(Json(json!({ "success": true })))
}

async fn delete(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    JsonBody(request): JsonBody<DeleteRequest>,
) -> Result<Json<Value>, ApiError> {
    let store = Arc::clone(&state.store);
    let actor = actor(&addr);
    blocking(move || {
        store.delete_entry(
            &actor,
            &request.category,
            request.path.as_deref().unwrap_or(""),
            &request.name,
        )
    })
    .await?;
    Ok(Json(json!({ "success": true })))
}

async fn move_entry(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    JsonBody(request): JsonBody<MoveRequest>,
) -> Result<Json<Value>, ApiError> {
    let store = Arc::clone(&state.store);
    let actor = actor(&addr);
    blocking(move || {
        store.move_entry(
            &actor,
            &request.category,
            request.src_path.as_deref().unwrap_or(""),
            request.dest_path.as_deref().unwrap_or(""),
            &request.name,
        )
    })
    .await?;
    Ok(Json(json!({ "success": true })))
}

async fn download(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    PathParams((category, stored_id)): PathParams<(String, String)>,
    QueryParams(query): QueryParams<PathQuery>,
) -> Result<Response, ApiError> {
    let store = Arc::clone(&state.store);
    let actor = actor(&addr);
    let target = blocking(move || {
        store.prepare_download(
            &actor,
            &category,
            query.path.as_deref().unwrap_or(""),
            &stored_id,
        )
    })
    .await?;

    let file = tokio::fs::File::open(&target.file_path)
        .await
        .map_err(StoreError::from)?;
    let length = file.metadata().await.map_err(StoreError::from)?.len();

    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        ),
        (header::CONTENT_LENGTH, HeaderValue::from(length)),
        (
            header::CONTENT_DISPOSITION,
            content_disposition(&target.display_name),
        ),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

async fn audit_logs(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Json<Vec<AuditRecord>>, ApiError> {
    let store = Arc::clone(&state.store);
    let actor = actor(&addr);
    let records = blocking(move || Ok::<_, ApiError>(store.audit().query(&actor))).await?;
    Ok(Json(records))
}

async fn disk_usage_report(
    State(state): State<AppState>,
) -> Result<Json<DiskUsageReport>, ApiError> {
    let root = state.store.root().to_path_buf();
    let probe = Arc::clone(&state.probe);
    let report = blocking(move || disk_usage(&root, probe.as_ref())).await?;
    Ok(Json(report))
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name
fn content_disposition(display_name: &str) -> HeaderValue {
    let fallback: String = display_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();
    let value = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(display_name)
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_ascii() {
        let value = content_disposition("vacation.jpg");
        assert_eq!(
            value.to_str().unwrap(),
            "attachment; filename=\"vacation.jpg\"; filename*=UTF-8''vacation.jpg"
        );
    }

    #[test]
    fn test_content_disposition_escapes_quotes_and_unicode() {
        let value = content_disposition("a \"b\" é.txt");
        let text = value.to_str().unwrap();
        assert!(text.contains("filename=\"a _b_ _.txt\""));
        assert!(text.contains("filename*=UTF-8''a%20%22b%22%20%C3%A9.txt"));
    }
}
