use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::Method,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use rolodex_store::{Contact, Database, NewContact};

use crate::avatar_store::AvatarStore;
use crate::config::Config;
use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub avatars: Arc<AvatarStore>,
    pub config: Arc<Config>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    // Slack on top of the avatar cap so the text fields of a maximal upload
    // still fit in the body limit.
    let body_limit = state.config.max_avatar_size + 64 * 1024;

    Router::new()
        .route("/health", get(health_check))
        .route("/contacts", get(list_contacts).post(create_contact))
        .route("/contacts/search", get(search_contacts))
        .route(
            "/contacts/{id}",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
        .nest_service("/static", ServeDir::new(state.config.static_root.clone()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Deserialize)]
struct SearchQuery {
    keyword: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn list_contacts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let db = state.db.lock().await;
    let contacts = db.list_contacts(query.skip, query.limit)?;
    Ok(Json(contacts))
}

async fn search_contacts(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let db = state.db.lock().await;
    let contacts = db.search_contacts(&query.keyword)?;
    Ok(Json(contacts))
}

async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Contact>, ApiError> {
    let db = state.db.lock().await;
    let contact = db.get_contact(id)?.ok_or(ApiError::NotFound)?;
    Ok(Json(contact))
}

async fn create_contact(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Contact>, ApiError> {
    let (mut input, avatar_part) = read_contact_form(multipart).await?;
    input.validate()?;

    if let Some((filename, data)) = avatar_part {
        let reference = state.avatars.store(&input.phone, &filename, &data).await?;
        input.avatar = Some(reference);
    }

    let contact = {
        let db = state.db.lock().await;
        db.create_contact(&input)?
    };

    info!(id = contact.id, phone = %contact.phone, "Contact created via API");
    Ok(Json(contact))
}

async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<Contact>, ApiError> {
    let (mut input, avatar_part) = read_contact_form(multipart).await?;
    input.validate()?;

    if let Some((filename, data)) = avatar_part {
        let reference = state.avatars.store(&input.phone, &filename, &data).await?;
        input.avatar = Some(reference);
    }

    let contact = {
        let db = state.db.lock().await;
        db.update_contact(id, &input)?
    };

    info!(id = contact.id, "Contact updated via API");
    Ok(Json(contact))
}

async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    {
        let db = state.db.lock().await;
        db.delete_contact(id)?;
    }

    info!(id, "Contact deleted via API");
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Decode the multipart contact form into the validated input shape plus the
/// optional avatar file part (`(original_filename, bytes)`).
///
/// Missing text fields decode to empty strings so validation reports them
/// field by field.  A file part without a filename (a browser submitting an
/// empty file input) counts as no avatar.
async fn read_contact_form(
    mut multipart: Multipart,
) -> Result<(NewContact, Option<(String, Bytes)>), ApiError> {
    let mut input = NewContact::default();
    let mut avatar: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "name" => input.name = read_text(field).await?,
            "phone" => input.phone = read_text(field).await?,
            "email" => input.email = Some(read_text(field).await?),
            "category" => input.category = read_text(field).await?,
            "avatar" => {
                let filename = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read avatar field: {}", e))
                })?;
                if let Some(filename) = filename.filter(|f| !f.is_empty()) {
                    avatar = Some((filename, data));
                }
            }
            _ => {} // unknown fields are ignored
        }
    }

    Ok((input, avatar))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    let name = field.name().unwrap_or("field").to_string();
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read field '{}': {}", name, e)))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
