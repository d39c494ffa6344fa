mod fields;
mod view;

pub use view::CatalogDetails;
