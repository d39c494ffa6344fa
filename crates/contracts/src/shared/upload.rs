//! Image fields in multipart uploads.
//!
//! A request carries, per image field, either a file part named after the
//! field, or a text part `remove_<field>=true` to clear the stored image
//! without uploading a new one.

use std::collections::BTreeMap;

/// Requested change of one image field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageChange {
    #[default]
    Keep,
    Replace {
        file_name: String,
    },
    Remove,
}

impl ImageChange {
    /// Decide from the parts present in a request; a new file wins over the
    /// remove flag.
    pub fn from_parts(file_name: Option<String>, remove_flag: Option<&str>) -> Self {
        match (file_name, remove_flag) {
            (Some(file_name), _) => Self::Replace { file_name },
            (None, Some(flag)) if is_truthy(flag) => Self::Remove,
            _ => Self::Keep,
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

/// Name of the text part that clears `field`
pub fn remove_flag_name(field: &str) -> String {
    format!("remove_{}", field)
}

/// Form spelling of a boolean; `None` for anything unrecognized
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

pub fn is_truthy(value: &str) -> bool {
    parse_flag(value) == Some(true)
}

/// Pending image changes of one record, keyed by field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageUploadPlan {
    changes: BTreeMap<String, ImageChange>,
}

impl ImageUploadPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, change: ImageChange) {
        let field = field.into();
        if change.is_keep() {
            self.changes.remove(&field);
        } else {
            self.changes.insert(field, change);
        }
    }

    pub fn get(&self, field: &str) -> &ImageChange {
        static KEEP: ImageChange = ImageChange::Keep;
        self.changes.get(field).unwrap_or(&KEEP)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Text parts to send: one `remove_<field>=true` per removed image
    pub fn text_parts(&self) -> Vec<(String, String)> {
        self.changes
            .iter()
            .filter(|(_, c)| matches!(c, ImageChange::Remove))
            .map(|(field, _)| (remove_flag_name(field), "true".to_string()))
            .collect()
    }

    /// Fields that carry a new file
    pub fn file_fields(&self) -> Vec<&str> {
        self.changes
            .iter()
            .filter(|(_, c)| matches!(c, ImageChange::Replace { .. }))
            .map(|(field, _)| field.as_str())
            .collect()
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_wins_over_remove_flag() {
        assert_eq!(
            ImageChange::from_parts(Some("logo.png".into()), Some("true")),
            ImageChange::Replace {
                file_name: "logo.png".into()
            }
        );
        assert_eq!(ImageChange::from_parts(None, Some("true")), ImageChange::Remove);
        assert_eq!(ImageChange::from_parts(None, Some("false")), ImageChange::Keep);
        assert_eq!(ImageChange::from_parts(None, None), ImageChange::Keep);
    }

    #[test]
    fn plan_lists_parts_to_send() {
        let mut plan = ImageUploadPlan::new();
        plan.set("logo", ImageChange::Remove);
        plan.set(
            "favicon",
            ImageChange::Replace {
                file_name: "favicon.ico".into(),
            },
        );

        assert_eq!(
            plan.text_parts(),
            vec![("remove_logo".to_string(), "true".to_string())]
        );
        assert_eq!(plan.file_fields(), vec!["favicon"]);

        plan.set("logo", ImageChange::Keep);
        assert!(plan.text_parts().is_empty());
        assert_eq!(plan.get("logo"), &ImageChange::Keep);
    }

    #[test]
    fn flag_spellings() {
        assert_eq!(parse_flag(" Yes "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
        assert!(is_truthy("ON"));
        assert!(!is_truthy("off"));
    }
}
