use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::resource::ResourceKind;
use crate::shared::api_error::FieldErrors;
use crate::shared::metadata::{FieldMap, FieldSource, FieldSpec};

// ============================================================================
// Entity
// ============================================================================

/// Запись справочника каталога (металл, бриллиант, бренд, администратор...)
///
/// Common columns are explicit fields; kind-specific values live in
/// `attributes` and are serialized flat next to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntity {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub attributes: FieldMap,
}

fn default_active() -> bool {
    true
}

impl CatalogEntity {
    /// Пустая запись для вставки (id назначает хранилище)
    pub fn blank() -> Self {
        Self {
            id: 0,
            name: String::new(),
            code: None,
            description: None,
            is_active: true,
            display_order: None,
            created_at: None,
            updated_at: None,
            attributes: FieldMap::new(),
        }
    }

    /// Protected records (e.g. the super admin) are excluded from selection
    /// and deletion.
    pub fn is_protected(&self, kind: ResourceKind) -> bool {
        kind.protection_flag()
            .and_then(|flag| self.attributes.get(flag))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Current value of a field as JSON
    pub fn field_value(&self, key: &str) -> Value {
        match key {
            "id" => Value::from(self.id),
            "name" => Value::String(self.name.clone()),
            "code" => self.code.clone().map(Value::String).unwrap_or(Value::Null),
            "description" => self
                .description
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
            "is_active" => Value::Bool(self.is_active),
            "display_order" => self.display_order.map(Value::from).unwrap_or(Value::Null),
            other => self.attributes.get(other).cloned().unwrap_or(Value::Null),
        }
    }

    /// ID stored in a reference field
    pub fn reference_id(&self, key: &str) -> Option<i64> {
        match self.field_value(key) {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Assign an already coerced value to a field
    pub fn set_field_value(&mut self, spec: &FieldSpec, value: Value) {
        match (spec.source, spec.key) {
            (FieldSource::Base, "name") => {
                self.name = value.as_str().unwrap_or_default().to_string();
            }
            (FieldSource::Base, "code") => self.code = non_empty_string(value),
            (FieldSource::Base, "description") => self.description = non_empty_string(value),
            (FieldSource::Base, "is_active") => {
                self.is_active = value.as_bool().unwrap_or(self.is_active);
            }
            (FieldSource::Base, "display_order") => {
                self.display_order = value.as_i64().and_then(|v| i32::try_from(v).ok());
            }
            (_, key) => {
                if value.is_null() {
                    self.attributes.remove(key);
                } else {
                    self.attributes.insert(key.to_string(), value);
                }
            }
        }
    }

    /// Replace every editable field (PUT semantics): absent keys are cleared.
    pub fn replace_fields(&mut self, kind: ResourceKind, input: &FieldMap) {
        for spec in kind.fields().iter().filter(|f| f.is_editable()) {
            let raw = input.get(spec.key).cloned().unwrap_or(Value::Null);
            self.set_field_value(spec, spec.coerce(&raw));
        }
    }

    /// Apply only the keys present in `input` (PATCH semantics).
    pub fn patch_fields(&mut self, kind: ResourceKind, input: &FieldMap) {
        for spec in kind.fields().iter().filter(|f| f.is_editable()) {
            if let Some(raw) = input.get(spec.key) {
                self.set_field_value(spec, spec.coerce(raw));
            }
        }
    }

    /// Validate raw input for every editable field present in the schema.
    ///
    /// With `partial` set only keys present in `input` are checked.
    pub fn validate_input(kind: ResourceKind, input: &FieldMap, partial: bool) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for spec in kind.fields().iter().filter(|f| f.is_editable()) {
            let raw = match input.get(spec.key) {
                Some(v) => v.clone(),
                None if partial => continue,
                None => Value::Null,
            };
            if let Err(msg) = spec.validate(&raw) {
                errors.insert(spec.key.to_string(), msg);
            }
        }
        errors
    }

    /// Label for dropdown options ("AU750 — Золото 750")
    pub fn option_label(&self) -> String {
        match self.code.as_deref() {
            Some(code) if !code.is_empty() => format!("{} — {}", code, self.name),
            _ => self.name.clone(),
        }
    }

    pub fn option_item(&self) -> OptionItem {
        OptionItem {
            id: self.id,
            label: self.option_label(),
        }
    }
}

fn non_empty_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// Элемент выпадающего списка ссылочного поля
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub id: i64,
    pub label: String,
}

/// Body of `DELETE /api/{collection}/bulk`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<i64>,
}

/// Result of a bulk delete; protected records are reported in `skipped`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleteResponse {
    pub deleted: u64,
    #[serde(default)]
    pub skipped: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metal() -> CatalogEntity {
        serde_json::from_value(json!({
            "id": 7,
            "name": "Золото 750",
            "code": "AU750",
            "description": null,
            "is_active": false,
            "display_order": 3,
            "purity": 750.0
        }))
        .unwrap()
    }

    #[test]
    fn flat_wire_format_keeps_attributes() {
        let entity = metal();
        assert_eq!(entity.attributes.get("purity"), Some(&json!(750.0)));
        assert!(!entity.attributes.contains_key("name"));

        let back = serde_json::to_value(&entity).unwrap();
        assert_eq!(back["purity"], json!(750.0));
        assert_eq!(back["code"], json!("AU750"));
    }

    #[test]
    fn missing_is_active_defaults_to_true() {
        let entity: CatalogEntity = serde_json::from_value(json!({"id": 1, "name": "17"})).unwrap();
        assert!(entity.is_active);
        assert_eq!(entity.code, None);
    }

    #[test]
    fn patch_touches_only_given_keys() {
        let mut entity = metal();
        let before = entity.clone();
        let mut input = FieldMap::new();
        input.insert("is_active".into(), json!(true));
        entity.patch_fields(ResourceKind::Metal, &input);

        assert!(entity.is_active);
        assert_eq!(entity.name, before.name);
        assert_eq!(entity.code, before.code);
        assert_eq!(entity.display_order, before.display_order);
        assert_eq!(entity.attributes, before.attributes);
    }

    #[test]
    fn replace_clears_absent_fields() {
        let mut entity = metal();
        let mut input = FieldMap::new();
        input.insert("name".into(), json!("Серебро 925"));
        input.insert("code".into(), json!("AG925"));
        entity.replace_fields(ResourceKind::Metal, &input);

        assert_eq!(entity.name, "Серебро 925");
        assert_eq!(entity.display_order, None);
        assert!(!entity.attributes.contains_key("purity"));
        assert!(!entity.is_active);
    }

    #[test]
    fn replace_ignores_read_only_protection_flag() {
        let mut admin: CatalogEntity = serde_json::from_value(json!({
            "id": 1, "name": "root", "email": "root@example.com", "is_super_admin": true
        }))
        .unwrap();
        let mut input = FieldMap::new();
        input.insert("name".into(), json!("root"));
        input.insert("email".into(), json!("root@example.com"));
        input.insert("is_super_admin".into(), json!(false));
        admin.replace_fields(ResourceKind::Admin, &input);

        assert!(admin.is_protected(ResourceKind::Admin));
    }

    #[test]
    fn validate_input_reports_required_fields() {
        let errors = CatalogEntity::validate_input(ResourceKind::Metal, &FieldMap::new(), false);
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("code"));

        let partial = CatalogEntity::validate_input(ResourceKind::Metal, &FieldMap::new(), true);
        assert!(partial.is_empty());
    }

    #[test]
    fn option_label_prefers_code() {
        assert_eq!(metal().option_label(), "AU750 — Золото 750");
        let mut no_code = metal();
        no_code.code = None;
        assert_eq!(no_code.option_label(), "Золото 750");
    }
}
