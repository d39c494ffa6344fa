use super::form::FormController;
use super::list_store::{ListStore, LoadOutcome, LoadTicket};
use super::mutation::MutationRequest;
use super::selection::SelectionTracker;
use crate::domain::catalog::{CatalogEntity, ResourceKind};
use crate::shared::api_error::ApiError;
use crate::shared::pagination::{Page, PageQuery};

/// What the caller has to do after a mutation response
#[derive(Debug, Clone, PartialEq)]
pub enum AfterMutation {
    /// Reload the list with this ticket
    Reload(LoadTicket),
    /// Show the error; nothing changed locally
    Failed(ApiError),
}

/// List, selection and form of one resource page.
///
/// Holds no IO: every method returns the request to perform and takes its
/// result back, so the same controller runs in the browser and in tests.
#[derive(Debug, Clone)]
pub struct ResourceController {
    kind: ResourceKind,
    pub list: ListStore<CatalogEntity>,
    pub selection: SelectionTracker,
    pub form: FormController,
}

impl ResourceController {
    pub fn new(kind: ResourceKind, per_page: u64) -> Self {
        Self {
            kind,
            list: ListStore::new(PageQuery::new(per_page)),
            selection: SelectionTracker::new(),
            form: FormController::new(kind),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Apply a list response and reconcile the selection with the new page.
    ///
    /// Protected records are not selectable.
    pub fn apply_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Page<CatalogEntity>, ApiError>,
    ) -> LoadOutcome {
        let outcome = self.list.complete(ticket, result);
        if outcome == LoadOutcome::Applied {
            let kind = self.kind;
            let selectable: Vec<i64> = self
                .list
                .items()
                .iter()
                .filter(|e| !e.is_protected(kind))
                .map(|e| e.id)
                .collect();
            self.selection.reconcile(selectable);
        }
        outcome
    }

    pub fn find(&self, id: i64) -> Option<&CatalogEntity> {
        self.list.items().iter().find(|e| e.id == id)
    }

    /// Bulk delete of the current selection; `None` when nothing is selected
    pub fn bulk_delete_request(&self) -> Option<MutationRequest> {
        if self.selection.is_empty() {
            return None;
        }
        Some(MutationRequest::BulkDelete(self.selection.selected_ids()))
    }

    /// Delete of one listed record; protected records are refused
    pub fn delete_request(&self, id: i64) -> Option<MutationRequest> {
        let entity = self.find(id)?;
        if entity.is_protected(self.kind) {
            return None;
        }
        Some(MutationRequest::Delete(id))
    }

    pub fn toggle_active_request(&self, id: i64) -> Option<MutationRequest> {
        self.find(id).map(MutationRequest::toggle_active)
    }

    /// React to the response of a list-level mutation (delete, bulk delete,
    /// activation toggle). Success always reloads from the server.
    pub fn after_mutation<T>(
        &mut self,
        mutation: &MutationRequest,
        result: Result<T, ApiError>,
    ) -> AfterMutation {
        match result {
            Ok(_) => {
                if mutation.clears_selection() {
                    self.selection.clear();
                }
                AfterMutation::Reload(self.list.refresh())
            }
            Err(e) => AfterMutation::Failed(e),
        }
    }
}
