//! Field kind enumeration for the catalog form schema

/// Kind of value a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    #[default]
    Text,
    TextArea,
    Integer,
    Decimal,
    Flag,
    /// ID of a record of another resource kind
    Reference,
    /// Image path, changed only through multipart upload
    Image,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::TextArea => "textarea",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Flag => "flag",
            Self::Reference => "reference",
            Self::Image => "image",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Decimal | Self::Reference)
    }
}

/// Where the field lives in the entity record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldSource {
    /// Common column (name, code, description, is_active, display_order)
    Base,
    /// Kind-specific value stored in the attributes map
    #[default]
    Attribute,
}

impl FieldSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Attribute => "attribute",
        }
    }
}
