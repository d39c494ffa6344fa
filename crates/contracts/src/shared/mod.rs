pub mod api_error;
pub mod metadata;
pub mod pagination;
pub mod resource;
pub mod upload;
