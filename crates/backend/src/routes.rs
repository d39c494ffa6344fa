use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::path::Path;
use tower_http::services::ServeDir;

use crate::shared::config::UploadsConfig;
use crate::{handlers, system};

/// Конфигурация всех роутов приложения
pub fn configure_routes(uploads_dir: &Path, uploads: &UploadsConfig) -> Router {
    // Multipart routes accept images up to the configured size
    let upload_limit = DefaultBodyLimit::max(uploads.body_limit());

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // SYSTEM SETTINGS
        // ========================================
        .route(
            "/api/system/settings",
            get(system::handlers::settings::get_settings)
                .post(system::handlers::settings::save_settings)
                .layer(upload_limit.clone()),
        )
        // ========================================
        // CATALOG RESOURCES (metals, brands, users, ...)
        // ========================================
        .route(
            "/api/:collection",
            get(handlers::catalog::list).post(handlers::catalog::create),
        )
        .route(
            "/api/:collection/bulk",
            delete(handlers::catalog::bulk_delete),
        )
        .route(
            "/api/:collection/:id",
            get(handlers::catalog::get_by_id)
                .put(handlers::catalog::update)
                .patch(handlers::catalog::patch)
                .delete(handlers::catalog::delete),
        )
        .route(
            "/api/:collection/:id/images",
            post(handlers::catalog::upload_images).layer(upload_limit),
        )
        // Загруженные изображения
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .fallback_service(ServeDir::new("dist"))
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::uploads::tests::{file_body, BOUNDARY};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use contracts::shared::api_error::ApiErrorBody;
    use tower::ServiceExt;

    #[tokio::test]
    async fn oversized_cover_gets_size_error_on_its_field() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadsConfig {
            dir: "uploads".into(),
            max_bytes: 16 * 1024,
        };
        let app = configure_routes(dir.path(), &uploads);

        // larger than the route limit, far below axum's 2 MB default
        let body = file_body("cover", "cover.png", uploads.body_limit() + 1024);
        let request = Request::builder()
            .method("POST")
            .uri("/api/brands/1/images")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ApiErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert!(body.field_errors().contains_key("cover"));
    }
}
