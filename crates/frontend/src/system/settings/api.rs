use std::collections::BTreeMap;

use contracts::shared::api_error::ApiError;
use contracts::shared::upload::ImageUploadPlan;
use contracts::system::settings::SiteSettings;
use gloo_net::http::Request;
use web_sys::FormData;

use crate::shared::api_utils::api_url;
use crate::shared::object_url::PendingImage;
use crate::shared::resource::api::read_body;
use crate::shared::resource::dispatcher::multipart_body;

const SETTINGS_PATH: &str = "/api/system/settings";

/// Fetch site settings
pub async fn fetch_settings() -> Result<SiteSettings, ApiError> {
    let response = Request::get(&api_url(SETTINGS_PATH))
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    let text = read_body(response).await?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Multipart body: text fields plus logo/favicon changes
pub fn settings_form(
    settings: &SiteSettings,
    images: &ImageUploadPlan,
    files: &BTreeMap<String, PendingImage>,
) -> Result<FormData, ApiError> {
    let form_data = multipart_body(images, files)?;
    let texts = [
        ("site_name", settings.site_name.as_str()),
        ("support_email", settings.support_email.as_deref().unwrap_or("")),
    ];
    for (name, value) in texts {
        form_data
            .append_with_str(name, value)
            .map_err(|e| ApiError::Network(format!("{e:?}")))?;
    }
    Ok(form_data)
}

/// Save settings in one multipart request
pub async fn save_settings(form_data: FormData) -> Result<SiteSettings, ApiError> {
    let response = Request::post(&api_url(SETTINGS_PATH))
        .body(form_data)
        .map_err(|e| ApiError::Network(e.to_string()))?
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    let text = read_body(response).await?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}
