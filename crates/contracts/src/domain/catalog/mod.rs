//! Catalog resources: kinds, field schema and the entity record

pub mod aggregate;
pub mod resource;

pub use aggregate::{BulkDeleteRequest, BulkDeleteResponse, CatalogEntity, OptionItem};
pub use resource::ResourceKind;
