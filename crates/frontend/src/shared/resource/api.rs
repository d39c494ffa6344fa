//! HTTP side of the list: page and option loading

use contracts::domain::catalog::{CatalogEntity, OptionItem, ResourceKind};
use contracts::shared::api_error::ApiError;
use contracts::shared::pagination::{normalize_page, Page, PageQuery};
use contracts::shared::resource::OptionsRequest;
use gloo_net::http::{Request, Response};
use serde_json::Value;

use crate::shared::api_utils::api_url;

/// GET /api/{collection}?page=&per_page=&...
pub async fn fetch_page(
    kind: ResourceKind,
    query: &PageQuery,
) -> Result<Page<CatalogEntity>, ApiError> {
    let query_string =
        serde_qs::to_string(&query.to_params()).map_err(|e| ApiError::Decode(e.to_string()))?;
    let url = format!(
        "{}?{}",
        api_url(&format!("/api/{}", kind.collection_name())),
        query_string
    );

    let response = Request::get(&url)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    let text = read_body(response).await?;

    let value: Value = serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?;
    let page = normalize_page(value)?.decode_items::<CatalogEntity>()?;
    Ok(page)
}

/// All active records of the source resource as dropdown options
pub async fn fetch_options(request: &OptionsRequest) -> Result<Vec<OptionItem>, ApiError> {
    let mut collector = request.collector();
    while let Some(query) = collector.next_query() {
        let page = fetch_page(request.source, &query).await?;
        collector.push(page);
    }
    Ok(collector.finish())
}

/// Body text of a successful response; error bodies are classified
pub async fn read_body(response: Response) -> Result<String, ApiError> {
    let status = response.status();
    let ok = response.ok();
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    if !ok {
        return Err(ApiError::from_response(status, &text));
    }
    Ok(text)
}
