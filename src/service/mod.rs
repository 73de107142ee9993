//service/mod.rs
pub mod file_service;
pub mod photo_service;
pub mod page;

use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{web, Error, HttpResponse};
use bytes::BytesMut;
use futures::TryStreamExt;
use log::{debug, error, info, warn};
use log_mdc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::app_state::AppState;
use crate::error::StoreError;
use crate::index::{PhotoKey, PhotoRecord};
use crate::service::photo_service::PhotoService;

/// Multipart field carrying the uploaded image
pub const UPLOAD_FIELD: &str = "form_file";

const UPLOAD_FAILED: &str = "Invalid file type or upload failed";

/// MDC key carrying the filename a request works on
const MDC_FILE_KEY: &str = "file";

/// Puts the filename into the logging MDC and takes it out again when dropped
struct FileLogContext;

impl FileLogContext {
    fn enter(filename: &str) -> Self {
        log_mdc::insert(MDC_FILE_KEY, filename);
        FileLogContext
    }
}

impl Drop for FileLogContext {
    fn drop(&mut self) {
        log_mdc::remove(MDC_FILE_KEY);
    }
}

/// Body of `POST /photos`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPhoto {
    pub name: String,
    pub url: String,
    pub user: String,
    /// Unix seconds; the current time when omitted
    pub timestamp: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PhotoCreated {
    pub key: PhotoKey,
}

struct UploadedFile {
    filename: String,
    data: BytesMut,
}

fn redirect_home() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .finish()
}

fn upload_failed() -> HttpResponse {
    HttpResponse::BadRequest()
        .content_type("text/plain; charset=utf-8")
        .body(UPLOAD_FAILED)
}

/// Read the `form_file` part of the body. Other parts are drained and skipped.
/// Returns `None` when the part is missing or carries no filename.
async fn read_upload_field(mut payload: Multipart, limit: usize) -> Result<Option<UploadedFile>, StoreError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| StoreError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        let disposition = field.content_disposition();
        let field_name = disposition.get_name().map(str::to_string);
        let filename = disposition.get_filename().map(str::to_string);

        let is_upload = field_name.as_deref() == Some(UPLOAD_FIELD);
        let mut data = BytesMut::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| StoreError::InvalidInput(format!("Malformed multipart body: {}", e)))?
        {
            if !is_upload {
                continue;
            }
            if data.len() + chunk.len() > limit {
                return Err(StoreError::InvalidInput(format!("Upload exceeds {} bytes", limit)));
            }
            data.extend_from_slice(&chunk);
        }

        if !is_upload {
            debug!("Skipping multipart field {:?}", field_name);
            continue;
        }
        return Ok(match filename {
            Some(filename) if !filename.is_empty() => Some(UploadedFile { filename, data }),
            _ => None,
        });
    }
    Ok(None)
}

pub async fn index_service(app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let files = app_state.file_service.list().map_err(|e| {
        error!("Failed to list files: {}", e);
        e
    })?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page::render_index(&files)))
}

pub async fn upload_service(payload: Multipart, app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let limit = app_state.config.server.max_payload_size;
    let upload = match read_upload_field(payload, limit).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            warn!("Upload request without a {} file", UPLOAD_FIELD);
            return Ok(upload_failed());
        }
        Err(e) => {
            warn!("Upload rejected: {}", e);
            return Ok(upload_failed());
        }
    };

    let _log_context = FileLogContext::enter(&upload.filename);
    info!("Received {} ({} bytes)", upload.filename, upload.data.len());

    match app_state.file_service.upload(&upload.filename, &upload.data).await {
        Ok(name) => {
            info!("Upload stored as {}", name);
            Ok(redirect_home())
        }
        Err(StoreError::InvalidInput(msg)) => {
            warn!("Upload rejected: {}", msg);
            Ok(upload_failed())
        }
        Err(e) => {
            error!("Upload of {} failed: {}", upload.filename, e);
            Err(e.into())
        }
    }
}

pub async fn list_files_service(app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let files = app_state.file_service.list()?;
    Ok(HttpResponse::Ok().json(files))
}

pub async fn get_file_service(filename: String, app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let _log_context = FileLogContext::enter(&filename);

    let data = app_state.file_service.read(&filename).map_err(|e| {
        if e.is_not_found() {
            debug!("Requested missing file {}", filename);
        } else {
            error!("Failed to read {}: {}", filename, e);
        }
        e
    })?;

    let content_type = mime_guess::from_path(&filename).first_or_octet_stream();
    let etag = hex::encode(md5::compute(&data).0);
    Ok(HttpResponse::Ok()
        .content_type(content_type.to_string())
        .insert_header((header::ETAG, format!("\"{}\"", etag)))
        .body(data))
}

pub async fn delete_service(filename: String, app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let _log_context = FileLogContext::enter(&filename);

    match app_state.file_service.delete(&filename).await {
        Ok(()) => {
            info!("Deleted {}", filename);
            Ok(redirect_home())
        }
        Err(e) if e.is_not_found() => Ok(HttpResponse::NotFound()
            .content_type("text/plain; charset=utf-8")
            .body("File not found")),
        Err(e) => {
            error!("Failed to delete {}: {}", filename, e);
            Err(e.into())
        }
    }
}

fn photo_service(app_state: &AppState) -> Result<&PhotoService, StoreError> {
    app_state
        .photo_service
        .as_deref()
        .ok_or_else(|| StoreError::NotFound("photo index is disabled".to_string()))
}

pub async fn list_photos_service(
    query: web::Query<HashMap<String, String>>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let service = photo_service(&app_state)?;
    let photos = service.fetch_by(query.iter().map(|(field, value)| (field.as_str(), value.as_str())))?;
    Ok(HttpResponse::Ok().json(photos))
}

pub async fn add_photo_service(photo: NewPhoto, app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let service = photo_service(&app_state)?;
    let mut record = PhotoRecord::new(photo.name, photo.url, photo.user);
    if let Some(timestamp) = photo.timestamp {
        record = record.with_timestamp(timestamp);
    }
    let key = service.add(&record).map_err(|e| {
        error!("Failed to add photo record: {}", e);
        e
    })?;
    Ok(HttpResponse::Created().json(PhotoCreated { key }))
}
