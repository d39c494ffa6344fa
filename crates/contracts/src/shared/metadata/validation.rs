//! Validation rules for catalog fields

/// Validation rules for a field
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ValidationRules {
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

impl ValidationRules {
    /// Create empty validation rules (all optional, no constraints)
    pub const fn none() -> Self {
        Self {
            required: false,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
        }
    }

    /// Create validation rules for required field
    pub const fn required() -> Self {
        Self {
            required: true,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
        }
    }

    pub const fn with_max_length(self, max: usize) -> Self {
        Self {
            max_length: Some(max),
            ..self
        }
    }

    pub const fn with_range(self, min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..self
        }
    }

    /// Check if field is required
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Validate a string value against the rules
    pub fn validate_string(&self, value: &str, field_label: &str) -> Result<(), String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            if self.required {
                return Err(format!("{} не может быть пустым", field_label));
            }
            return Ok(());
        }

        let length = trimmed.chars().count();
        if let Some(min) = self.min_length {
            if length < min {
                return Err(format!(
                    "{} должен содержать минимум {} символов",
                    field_label, min
                ));
            }
        }

        if let Some(max) = self.max_length {
            if length > max {
                return Err(format!(
                    "{} не должен превышать {} символов",
                    field_label, max
                ));
            }
        }

        Ok(())
    }

    /// Validate a numeric value against min/max rules
    pub fn validate_number(&self, value: f64, field_label: &str) -> Result<(), String> {
        if let Some(min) = self.min {
            if value < min {
                return Err(format!("{} должен быть не менее {}", field_label, min));
            }
        }

        if let Some(max) = self.max {
            if value > max {
                return Err(format!("{} должен быть не более {}", field_label, max));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank_strings() {
        let rules = ValidationRules::required();
        assert!(rules.validate_string("   ", "Код").is_err());
        assert!(rules.validate_string("AU-750", "Код").is_ok());
    }

    #[test]
    fn optional_blank_skips_length_checks() {
        let rules = ValidationRules {
            min_length: Some(3),
            ..ValidationRules::none()
        };
        assert!(rules.validate_string("", "Описание").is_ok());
        assert!(rules.validate_string("ab", "Описание").is_err());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let rules = ValidationRules::none().with_max_length(5);
        assert!(rules.validate_string("Белое", "Цвет").is_ok());
        assert!(rules.validate_string("Жёлтое", "Цвет").is_err());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let rules = ValidationRules::none().with_range(0.0, 999.0);
        assert!(rules.validate_number(0.0, "Проба").is_ok());
        assert!(rules.validate_number(999.0, "Проба").is_ok());
        assert!(rules.validate_number(-1.0, "Проба").is_err());
        assert!(rules.validate_number(1000.0, "Проба").is_err());
    }
}
