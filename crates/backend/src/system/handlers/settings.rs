use axum::extract::Multipart;
use axum::Json;
use contracts::system::settings::SiteSettings;

use crate::domain::catalog::error::CatalogError;
use crate::shared::config;
use crate::shared::data::db::get_connection;
use crate::shared::uploads::MultipartForm;
use crate::system::settings::service;

/// GET /api/system/settings
pub async fn get_settings() -> Result<Json<SiteSettings>, CatalogError> {
    let settings = service::get(get_connection()?).await?;
    Ok(Json(settings))
}

/// POST /api/system/settings (multipart)
pub async fn save_settings(mut multipart: Multipart) -> Result<Json<SiteSettings>, CatalogError> {
    let cfg = config::current();
    let form = MultipartForm::read(&mut multipart, cfg.uploads.max_bytes).await?;
    let uploads_dir = config::get_uploads_dir(cfg);

    let settings = service::save(get_connection()?, &form, &uploads_dir).await?;
    Ok(Json(settings))
}
