//! Generic list-resource controller shared by every catalog admin page:
//! paginated list, row selection, create/edit form and mutations.

pub mod controller;
pub mod form;
pub mod list_store;
pub mod mutation;
pub mod selection;

pub use controller::{AfterMutation, ResourceController};
pub use form::{
    Draft, FormController, FormMode, FormState, OptionsCollector, OptionsRequest, SubmitBlocked,
    SubmitOutcome,
};
pub use list_store::{ListStore, LoadOutcome, LoadState, LoadTicket};
pub use mutation::{ApiRequest, HttpMethod, MutationRequest};
pub use selection::SelectionTracker;
