use std::sync::Arc;

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use crate::domain::model::Attachment;
use crate::utils::error::{FieldError, SubmitError};
use crate::web::AppState;

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// The submission endpoint. Accepts `application/json` or
/// `multipart/form-data` (attachments require multipart), runs the
/// pipeline, and maps the outcome to a response.
pub async fn send(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Value>, SubmitError> {
    let client = client_key(request.headers());
    let (payload, attachments) = read_payload(request).await?;

    state.pipeline.handle(&client, &payload, attachments).await?;
    Ok(Json(json!({"success": true})))
}

/// Rate-limit bucket for a request: first entry of `x-forwarded-for`, then
/// `x-real-ip`, then a shared "unknown" bucket for unattributable clients.
pub fn client_key(headers: &HeaderMap) -> String {
    if let Some(value) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = value.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(value) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let value = value.trim();
        if !value.is_empty() {
            return value.to_string();
        }
    }
    "unknown".to_string()
}

async fn read_payload(request: Request) -> Result<(Value, Vec<Attachment>), SubmitError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json")
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &()).await.map_err(|e| {
            SubmitError::Validation(vec![FieldError::new(
                "body",
                format!("invalid multipart body: {e}"),
            )])
        })?;
        read_multipart(multipart).await
    } else if content_type.starts_with("application/json") {
        let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|_| {
                SubmitError::Validation(vec![FieldError::new("body", "body too large or unreadable")])
            })?;
        let payload: Value = serde_json::from_slice(&bytes).map_err(|_| {
            SubmitError::Validation(vec![FieldError::new("body", "must be valid JSON")])
        })?;
        Ok((payload, Vec::new()))
    } else {
        Err(SubmitError::Validation(vec![FieldError::new(
            "content-type",
            "must be application/json or multipart/form-data",
        )]))
    }
}

/// Text parts become payload fields; file parts named `attachments` are
/// collected in order with their filenames.
async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(Value, Vec<Attachment>), SubmitError> {
    let mut map = serde_json::Map::new();
    let mut attachments = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        SubmitError::Validation(vec![FieldError::new(
            "body",
            format!("invalid multipart field: {e}"),
        )])
    })? {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(filename) = field.file_name().map(str::to_string) {
            if name != "attachments" {
                return Err(SubmitError::Validation(vec![FieldError::new(
                    name,
                    "file parts must be named \"attachments\"",
                )]));
            }
            let content = field.bytes().await.map_err(|e| {
                SubmitError::Validation(vec![FieldError::new(
                    "attachments",
                    format!("unreadable attachment: {e}"),
                )])
            })?;
            attachments.push(Attachment {
                filename,
                content: content.to_vec(),
            });
        } else {
            let text = field.text().await.map_err(|e| {
                SubmitError::Validation(vec![FieldError::new(
                    name.clone(),
                    format!("unreadable field: {e}"),
                )])
            })?;
            map.insert(name, Value::String(text));
        }
    }

    Ok((Value::Object(map), attachments))
}
