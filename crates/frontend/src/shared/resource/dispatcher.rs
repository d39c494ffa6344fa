use std::collections::BTreeMap;

use contracts::domain::catalog::{BulkDeleteResponse, CatalogEntity, ResourceKind};
use contracts::shared::api_error::ApiError;
use contracts::shared::resource::{ApiRequest, HttpMethod, MutationRequest};
use contracts::shared::upload::ImageUploadPlan;
use gloo_net::http::{Method, Request, RequestBuilder};
use web_sys::FormData;

use super::api::read_body;
use crate::shared::api_utils::api_url;
use crate::shared::object_url::PendingImage;

/// Sends mutations of one resource collection.
///
/// No retries and no local patching: callers reload the list afterwards.
#[derive(Debug, Clone, Copy)]
pub struct MutationDispatcher {
    kind: ResourceKind,
}

impl MutationDispatcher {
    pub fn new(kind: ResourceKind) -> Self {
        Self { kind }
    }

    /// Execute a mutation; returns the saved record for create/update/patch
    pub async fn send(&self, mutation: &MutationRequest) -> Result<Option<CatalogEntity>, ApiError> {
        let text = execute(&mutation.to_api_request(self.kind)).await?;

        if mutation.returns_entity() {
            let entity = serde_json::from_str::<CatalogEntity>(&text)
                .map_err(|e| ApiError::Decode(e.to_string()))?;
            return Ok(Some(entity));
        }
        if let MutationRequest::BulkDelete(_) = mutation {
            if let Ok(result) = serde_json::from_str::<BulkDeleteResponse>(&text) {
                log::info!(
                    "{}: deleted {}, skipped {:?}",
                    self.kind,
                    result.deleted,
                    result.skipped
                );
            }
        }
        Ok(None)
    }

    /// POST /api/{collection}/{id}/images with picked files and remove flags
    pub async fn upload_images(
        &self,
        id: i64,
        plan: &ImageUploadPlan,
        files: &BTreeMap<String, PendingImage>,
    ) -> Result<CatalogEntity, ApiError> {
        let form_data = multipart_body(plan, files)?;

        let url = api_url(&format!("/api/{}/{}/images", self.kind.collection_name(), id));
        let response = Request::post(&url)
            .body(form_data)
            .map_err(|e| ApiError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let text = read_body(response).await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Multipart body with picked files and `remove_<field>` flags of `plan`
pub fn multipart_body(
    plan: &ImageUploadPlan,
    files: &BTreeMap<String, PendingImage>,
) -> Result<FormData, ApiError> {
    let form_data = FormData::new().map_err(|e| ApiError::Network(format!("{e:?}")))?;
    for field in plan.file_fields() {
        let Some(pending) = files.get(field) else {
            continue;
        };
        form_data
            .append_with_blob_and_filename(field, &pending.file, &pending.file.name())
            .map_err(|e| ApiError::Network(format!("{e:?}")))?;
    }
    for (name, value) in plan.text_parts() {
        form_data
            .append_with_str(&name, &value)
            .map_err(|e| ApiError::Network(format!("{e:?}")))?;
    }
    Ok(form_data)
}

/// Send a transport-neutral request; JSON body when present
pub async fn execute(request: &ApiRequest) -> Result<String, ApiError> {
    let builder = RequestBuilder::new(&api_url(&request.path))
        .method(method(request.method))
        .header("Accept", "application/json");

    let prepared = match &request.body {
        Some(body) => builder.json(body),
        None => builder.build(),
    }
    .map_err(|e| ApiError::Network(e.to_string()))?;

    let response = prepared
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    read_body(response).await
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}
