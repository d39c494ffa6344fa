//! Browser side of the list-resource controller: HTTP, dispatch and
//! reactive state for one catalog resource.

pub mod api;
pub mod controller;
pub mod dispatcher;

pub use controller::ResourceHandle;
pub use dispatcher::MutationDispatcher;
