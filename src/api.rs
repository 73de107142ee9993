//! Route definitions

use actix_multipart::Multipart;
use actix_web::{get, post, web, Error, HttpResponse};
use std::collections::HashMap;

use crate::app_state::AppState;
use crate::service::{
    add_photo_service, delete_service, get_file_service, index_service, list_files_service,
    list_photos_service, upload_service, NewPhoto,
};

#[get("/")]
pub async fn home(app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    index_service(app_state).await
}

#[post("/upload")]
pub async fn upload(payload: Multipart, app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    upload_service(payload, app_state).await
}

#[get("/files")]
pub async fn list_files(app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    list_files_service(app_state).await
}

#[get("/files/{filename}")]
pub async fn get_file(path: web::Path<String>, app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    get_file_service(path.into_inner(), app_state).await
}

#[get("/delete/{filename}")]
pub async fn delete_file(path: web::Path<String>, app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    delete_service(path.into_inner(), app_state).await
}

#[get("/photos")]
pub async fn list_photos(
    query: web::Query<HashMap<String, String>>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    list_photos_service(query, app_state).await
}

#[post("/photos")]
pub async fn add_photo(photo: web::Json<NewPhoto>, app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    add_photo_service(photo.into_inner(), app_state).await
}

/// Register every route on an app or scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(home)
        .service(upload)
        .service(list_files)
        .service(get_file)
        .service(delete_file)
        .service(list_photos)
        .service(add_photo);
}
