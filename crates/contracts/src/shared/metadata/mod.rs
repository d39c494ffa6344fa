//! Field schema used to describe catalog resources.
//!
//! Descriptors are `'static` constants: every resource kind exposes a slice
//! of [`FieldSpec`] that drives form rendering, client-side validation and
//! server-side input parsing.
//!
//! ```rust,ignore
//! use contracts::domain::catalog::ResourceKind;
//!
//! for field in ResourceKind::Metal.fields() {
//!     if field.rules.is_required() {
//!         println!("Required: {}", field.label);
//!     }
//! }
//! ```

mod field_type;
mod types;
mod validation;

pub use field_type::{FieldKind, FieldSource};
pub use types::{FieldMap, FieldSpec};
pub use validation::ValidationRules;
