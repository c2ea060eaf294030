//! Wallpaper endpoints: listing, upload, edit, delete, download

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use wallctl_core::models::{Device, LabelKind, LabelList, ValidationError, WallpaperName};

use super::{ListParams, WallpaperPage};
use crate::db::{DeleteOutcome, NewWallpaper, WallpaperRepo, WallpaperView};
use crate::http::error::ApiError;
use crate::http::extractors::{ensure_owner, ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::http::server::AppState;

/// Upload response; `warning` is set when orientation does not suit the device
#[derive(Serialize)]
pub struct UploadResponse {
    pub wallpaper: WallpaperView,
    pub warning: Option<String>,
}

/// Edit request: every field is required, labels replace the old set
#[derive(Deserialize)]
pub struct EditRequest {
    pub name: String,
    pub device: String,
    pub tags: String,
    pub colors: String,
}

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteResponse {
    Deleted,
    Unlinked { removed_links: u64 },
}

#[derive(Deserialize)]
pub struct ModalParams {
    pub wallpaper_id: i64,
    pub collection_id: Option<i64>,
}

#[derive(Serialize)]
pub struct ModalResponse {
    pub wallpaper: WallpaperView,
    pub in_collection: bool,
}

/// Raw multipart fields of an upload
#[derive(Default)]
struct UploadForm {
    name: Option<String>,
    device: Option<String>,
    tags: Option<String>,
    colors: Option<String>,
    file: Option<(String, Bytes)>,
}

fn multipart_error(e: MultipartError) -> ApiError {
    ApiError::Upload {
        message: e.body_text(),
    }
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match name.as_str() {
            "file" => {
                let filename = field.file_name().map(str::to_owned).unwrap_or_default();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                form.file = Some((filename, bytes));
            }
            "name" => form.name = Some(field.text().await.map_err(multipart_error)?),
            "device" => form.device = Some(field.text().await.map_err(multipart_error)?),
            "tags" => form.tags = Some(field.text().await.map_err(multipart_error)?),
            "colors" => form.colors = Some(field.text().await.map_err(multipart_error)?),
            other => tracing::debug!(field = other, "ignoring unknown upload field"),
        }
    }

    Ok(form)
}

fn parse_device(input: Option<&str>) -> Result<Device, ValidationError> {
    match input.map(str::trim) {
        None | Some("") => Err(ValidationError::Empty { field: "device" }),
        Some(s) => s.parse(),
    }
}

/// Wallpaper name made safe for a quoted `filename=` parameter.
fn attachment_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// GET /wallpapers - search, filter and paginate the whole library
async fn list_wallpapers(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<WallpaperPage>, ApiError> {
    let filter = params.filter(None)?;
    let page = WallpaperRepo::new(&state.pool)
        .search(&filter, params.pagination())
        .await?;
    Ok(Json(WallpaperPage::from(page)))
}

/// POST /upload_wallpaper - multipart: name, file, device, tags, colors
async fn upload_wallpaper(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let form = read_upload_form(multipart).await?;

    let name = WallpaperName::new(form.name.as_deref().unwrap_or_default())?;
    let device = parse_device(form.device.as_deref())?;
    let tags = LabelList::parse(LabelKind::Tag, form.tags.as_deref().unwrap_or_default())?;
    let colors = LabelList::parse(LabelKind::Color, form.colors.as_deref().unwrap_or_default())?;
    let (filename, bytes) = form
        .file
        .filter(|(filename, _)| !filename.is_empty())
        .ok_or(ValidationError::Empty { field: "file" })?;

    let stored = state.uploads.save_verified(&filename, &bytes).await?;
    let warning = device.orientation_warning(stored.resolution);

    let repo = WallpaperRepo::new(&state.pool);
    let new = NewWallpaper {
        name,
        resolution: stored.resolution,
        path: stored.relative_path.clone(),
        owner_id: user.id,
        device,
        tags,
        colors,
    };
    let id = match repo.create(&new).await {
        Ok(id) => id,
        Err(e) => {
            state.uploads.remove(&stored.relative_path).await;
            return Err(e.into());
        }
    };

    if let Some(warning) = &warning {
        tracing::info!(wallpaper_id = id, %warning, "orientation mismatch");
    }
    let wallpaper = repo.view(id).await?;
    Ok((StatusCode::CREATED, Json(UploadResponse { wallpaper, warning })))
}

/// POST /edit_wallpaper/{id} - owner only
async fn edit_wallpaper(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<EditRequest>,
) -> Result<Json<WallpaperView>, ApiError> {
    let repo = WallpaperRepo::new(&state.pool);
    let existing = repo.get(id).await?;
    ensure_owner(&user, existing.user_id, "wallpaper", id)?;

    let name = WallpaperName::new(&req.name)?;
    let device = parse_device(Some(&req.device))?;
    let tags = LabelList::parse(LabelKind::Tag, &req.tags)?;
    let colors = LabelList::parse(LabelKind::Color, &req.colors)?;

    repo.update(id, &name, device, &tags, &colors).await?;
    Ok(Json(repo.view(id).await?))
}

/// POST /delete_wallpaper/{id} - owner only
async fn delete_wallpaper(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let repo = WallpaperRepo::new(&state.pool);
    let existing = repo.get(id).await?;
    ensure_owner(&user, existing.user_id, "wallpaper", id)?;

    let response = match repo.delete_for_owner(id, user.id).await? {
        DeleteOutcome::Deleted { path } => {
            state.uploads.remove(&path).await;
            DeleteResponse::Deleted
        }
        DeleteOutcome::Unlinked { removed_links } => DeleteResponse::Unlinked { removed_links },
    };
    Ok(Json(response))
}

/// GET /download_wallpaper/{id} - stored file as an attachment
async fn download_wallpaper(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Response, ApiError> {
    let record = WallpaperRepo::new(&state.pool).get(id).await?;
    let bytes = state.uploads.read(&record.path).await?;

    let mime = mime_guess::from_path(&record.path).first_or_octet_stream();
    let ext = FsPath::new(&record.path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");
    let disposition = format!("attachment; filename=\"{}.{}\"", attachment_name(&record.name), ext);

    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// GET /load_wallpaper_modal?wallpaper_id=&collection_id=
async fn load_wallpaper_modal(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    ApiQuery(params): ApiQuery<ModalParams>,
) -> Result<Json<ModalResponse>, ApiError> {
    let repo = WallpaperRepo::new(&state.pool);
    let wallpaper = repo.view(params.wallpaper_id).await?;
    let in_collection = match params.collection_id {
        Some(collection_id) => repo.in_collection(wallpaper.id, collection_id).await?,
        None => false,
    };
    Ok(Json(ModalResponse {
        wallpaper,
        in_collection,
    }))
}

/// Wallpaper routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/wallpapers", get(list_wallpapers))
        .route("/upload_wallpaper", post(upload_wallpaper))
        .route("/edit_wallpaper/{id}", post(edit_wallpaper))
        .route("/delete_wallpaper/{id}", post(delete_wallpaper))
        .route("/download_wallpaper/{id}", get(download_wallpaper))
        .route("/load_wallpaper_modal", get(load_wallpaper_modal))
}
