use serde::{Deserialize, Serialize};

use crate::shared::api_error::FieldErrors;
use crate::shared::metadata::ValidationRules;

/// Image fields of the settings form
pub const SETTINGS_IMAGE_FIELDS: [&str; 2] = ["logo", "favicon"];

/// Настройки сайта (название, контакт, логотип, favicon)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(default)]
    pub site_name: String,
    #[serde(default)]
    pub support_email: Option<String>,
    /// Public URL of the stored logo, if any
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub favicon_url: Option<String>,
}

impl SiteSettings {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        let name_rules = ValidationRules::required().with_max_length(255);
        if let Err(msg) = name_rules.validate_string(&self.site_name, "Название сайта") {
            errors.insert("site_name".to_string(), msg);
        }

        if let Some(email) = self.support_email.as_deref().filter(|e| !e.trim().is_empty()) {
            if !looks_like_email(email) {
                errors.insert(
                    "support_email".to_string(),
                    "Некорректный адрес электронной почты".to_string(),
                );
            }
        }

        errors
    }
}

fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_name_is_required() {
        let errors = SiteSettings::default().validate();
        assert!(errors.contains_key("site_name"));
    }

    #[test]
    fn email_is_optional_but_checked() {
        let mut settings = SiteSettings {
            site_name: "Jewel Admin".into(),
            ..Default::default()
        };
        assert!(settings.validate().is_empty());

        settings.support_email = Some("support".into());
        assert!(settings.validate().contains_key("support_email"));

        settings.support_email = Some("support@example.com".into());
        assert!(settings.validate().is_empty());
    }
}
