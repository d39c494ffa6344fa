//! Field descriptor for catalog resources
//!
//! All descriptors are `'static` constants built with `const fn` helpers.

use serde_json::{Number, Value};

use super::field_type::{FieldKind, FieldSource};
use super::validation::ValidationRules;
use crate::domain::catalog::ResourceKind;
use crate::shared::upload;

/// Flat key → value record exchanged with forms and the REST API
pub type FieldMap = serde_json::Map<String, Value>;

/// Metadata for a single field of a resource
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub source: FieldSource,
    pub rules: ValidationRules,
    /// Resource whose records populate the options of a reference field
    pub options_from: Option<ResourceKind>,
    /// Parent field whose value narrows the options of this field
    pub depends_on: Option<&'static str>,
    pub read_only: bool,
}

impl FieldSpec {
    /// Field stored in a common column
    pub const fn base(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            source: FieldSource::Base,
            rules: ValidationRules::none(),
            options_from: None,
            depends_on: None,
            read_only: false,
        }
    }

    /// Kind-specific field stored in the attributes map
    pub const fn attribute(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            source: FieldSource::Attribute,
            rules: ValidationRules::none(),
            options_from: None,
            depends_on: None,
            read_only: false,
        }
    }

    pub const fn rules(self, rules: ValidationRules) -> Self {
        Self { rules, ..self }
    }

    pub const fn references(self, resource: ResourceKind) -> Self {
        Self {
            kind: FieldKind::Reference,
            options_from: Some(resource),
            ..self
        }
    }

    pub const fn depends_on(self, parent: &'static str) -> Self {
        Self {
            depends_on: Some(parent),
            ..self
        }
    }

    pub const fn read_only(self) -> Self {
        Self {
            read_only: true,
            ..self
        }
    }

    /// Whether the value is sent in JSON create/update payloads
    pub fn is_editable(&self) -> bool {
        !self.read_only && self.kind != FieldKind::Image
    }

    /// Validate a raw form value
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        if !self.is_editable() {
            return Ok(());
        }

        match self.kind {
            FieldKind::Text | FieldKind::TextArea => {
                let text = match value {
                    Value::Null => String::new(),
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                self.rules.validate_string(&text, self.label)
            }
            FieldKind::Integer | FieldKind::Decimal | FieldKind::Reference => {
                let number = parse_number(value)
                    .map_err(|_| format!("{} должен быть числом", self.label))?;
                let Some(number) = number else {
                    if self.rules.is_required() {
                        return Err(format!("{} не может быть пустым", self.label));
                    }
                    return Ok(());
                };
                if self.kind != FieldKind::Decimal && number.fract() != 0.0 {
                    return Err(format!("{} должен быть целым числом", self.label));
                }
                self.rules.validate_number(number, self.label)
            }
            FieldKind::Flag | FieldKind::Image => Ok(()),
        }
    }

    /// Convert a raw form value into its canonical JSON representation.
    ///
    /// Blank text and unparsable numbers become `null`; flags accept the
    /// usual HTML form spellings.
    pub fn coerce(&self, value: &Value) -> Value {
        match self.kind {
            FieldKind::Text | FieldKind::TextArea | FieldKind::Image => match value {
                Value::Null => Value::Null,
                Value::String(s) if s.trim().is_empty() => Value::Null,
                Value::String(s) => Value::String(s.trim().to_string()),
                other => Value::String(other.to_string()),
            },
            FieldKind::Integer | FieldKind::Reference => match parse_number(value) {
                Ok(Some(n)) if n.fract() == 0.0 => Value::Number(Number::from(n as i64)),
                _ => Value::Null,
            },
            FieldKind::Decimal => match parse_number(value) {
                Ok(Some(n)) => Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null),
                _ => Value::Null,
            },
            FieldKind::Flag => Value::Bool(is_truthy(value)),
        }
    }
}

/// `Ok(None)` for empty input, `Err` for text that is not a number
fn parse_number(value: &Value) -> Result<Option<f64>, ()> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_f64().map(Some).ok_or(()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().map(Some).map_err(|_| ()),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => Err(()),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => upload::is_truthy(s),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PURITY: FieldSpec = FieldSpec::attribute("purity", "Проба", FieldKind::Decimal)
        .rules(ValidationRules::required().with_range(0.0, 999.9));

    #[test]
    fn numeric_validation_accepts_strings_and_comma_decimals() {
        assert!(PURITY.validate(&json!("585")).is_ok());
        assert!(PURITY.validate(&json!("999,9")).is_ok());
        assert!(PURITY.validate(&json!(750)).is_ok());
        assert!(PURITY.validate(&json!("abc")).is_err());
        assert!(PURITY.validate(&json!("")).is_err());
        assert!(PURITY.validate(&json!(1200)).is_err());
    }

    #[test]
    fn integer_fields_reject_fractions() {
        let order = FieldSpec::base("display_order", "Порядок", FieldKind::Integer);
        assert!(order.validate(&json!("3")).is_ok());
        assert!(order.validate(&json!("3.5")).is_err());
        assert!(order.validate(&Value::Null).is_ok());
    }

    #[test]
    fn coerce_normalizes_form_input() {
        let reference = FieldSpec::attribute("diamond_type_id", "Тип", FieldKind::Reference);
        assert_eq!(reference.coerce(&json!("12")), json!(12));
        assert_eq!(reference.coerce(&json!("")), Value::Null);

        let name = FieldSpec::base("name", "Наименование", FieldKind::Text);
        assert_eq!(name.coerce(&json!("  Gold ")), json!("Gold"));
        assert_eq!(name.coerce(&json!("   ")), Value::Null);

        let flag = FieldSpec::base("is_active", "Активен", FieldKind::Flag);
        assert_eq!(flag.coerce(&json!("on")), json!(true));
        assert_eq!(flag.coerce(&Value::Null), json!(false));
    }

    #[test]
    fn read_only_fields_are_never_validated() {
        let flag = FieldSpec::attribute("is_super_admin", "Суперадминистратор", FieldKind::Text)
            .rules(ValidationRules::required())
            .read_only();
        assert!(flag.validate(&Value::Null).is_ok());
        assert!(!flag.is_editable());
    }
}
