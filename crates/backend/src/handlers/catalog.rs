use axum::extract::{Multipart, Path, Query};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::catalog::{BulkDeleteRequest, BulkDeleteResponse, CatalogEntity};
use contracts::shared::metadata::FieldMap;
use contracts::shared::pagination::{Page, PageQuery};
use std::collections::BTreeMap;

use crate::domain::catalog::error::CatalogError;
use crate::domain::catalog::service;
use crate::shared::config;
use crate::shared::data::db::get_connection;
use crate::shared::uploads::MultipartForm;

/// GET /api/:collection?page=&per_page=&search=&is_active=&<reference>=
pub async fn list(
    Path(collection): Path<String>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Json<Page<CatalogEntity>>, CatalogError> {
    let kind = service::resolve_kind(&collection)?;
    let limits = config::current().pagination;
    let query = PageQuery::from_params(params, limits.default_per_page);

    let page = service::list(get_connection()?, kind, &query, limits).await?;
    Ok(Json(page))
}

/// GET /api/:collection/:id
pub async fn get_by_id(
    Path((collection, id)): Path<(String, i64)>,
) -> Result<Json<CatalogEntity>, CatalogError> {
    let kind = service::resolve_kind(&collection)?;
    let entity = service::get_by_id(get_connection()?, kind, id).await?;
    Ok(Json(entity))
}

/// POST /api/:collection
pub async fn create(
    Path(collection): Path<String>,
    Json(input): Json<FieldMap>,
) -> Result<(StatusCode, Json<CatalogEntity>), CatalogError> {
    let kind = service::resolve_kind(&collection)?;
    let entity = service::create(get_connection()?, kind, &input).await?;
    Ok((StatusCode::CREATED, Json(entity)))
}

/// PUT /api/:collection/:id
pub async fn update(
    Path((collection, id)): Path<(String, i64)>,
    Json(input): Json<FieldMap>,
) -> Result<Json<CatalogEntity>, CatalogError> {
    let kind = service::resolve_kind(&collection)?;
    let entity = service::update(get_connection()?, kind, id, &input).await?;
    Ok(Json(entity))
}

/// PATCH /api/:collection/:id
pub async fn patch(
    Path((collection, id)): Path<(String, i64)>,
    Json(input): Json<FieldMap>,
) -> Result<Json<CatalogEntity>, CatalogError> {
    let kind = service::resolve_kind(&collection)?;
    let entity = service::patch(get_connection()?, kind, id, &input).await?;
    Ok(Json(entity))
}

/// DELETE /api/:collection/:id
pub async fn delete(
    Path((collection, id)): Path<(String, i64)>,
) -> Result<StatusCode, CatalogError> {
    let kind = service::resolve_kind(&collection)?;
    let uploads_dir = config::get_uploads_dir(config::current());
    service::delete(get_connection()?, kind, id, &uploads_dir).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/:collection/bulk
pub async fn bulk_delete(
    Path(collection): Path<String>,
    Json(request): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, CatalogError> {
    let kind = service::resolve_kind(&collection)?;
    let uploads_dir = config::get_uploads_dir(config::current());
    let result = service::bulk_delete(get_connection()?, kind, &request.ids, &uploads_dir).await?;
    Ok(Json(result))
}

/// POST /api/:collection/:id/images
pub async fn upload_images(
    Path((collection, id)): Path<(String, i64)>,
    mut multipart: Multipart,
) -> Result<Json<CatalogEntity>, CatalogError> {
    let kind = service::resolve_kind(&collection)?;
    let cfg = config::current();
    let form = MultipartForm::read(&mut multipart, cfg.uploads.max_bytes)
        .await
        .map_err(|e| e.or_field(kind.image_fields().next().map(|f| f.key)))?;
    let uploads_dir = config::get_uploads_dir(cfg);

    let entity = service::store_images(get_connection()?, kind, id, &form, &uploads_dir).await?;
    Ok(Json(entity))
}
