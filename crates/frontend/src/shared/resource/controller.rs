use std::collections::BTreeMap;

use contracts::domain::catalog::ResourceKind;
use contracts::shared::api_error::ApiError;
use contracts::shared::pagination::DEFAULT_PER_PAGE;
use contracts::shared::resource::{
    AfterMutation, LoadOutcome, LoadTicket, MutationRequest, OptionsRequest, ResourceController,
    SubmitOutcome,
};
use contracts::shared::upload::ImageChange;
use leptos::prelude::*;
use serde_json::Value;
use wasm_bindgen_futures::spawn_local;

use super::api::{fetch_options, fetch_page};
use super::dispatcher::MutationDispatcher;
use crate::shared::object_url::PendingImage;

/// Reactive wrapper around [`ResourceController`].
///
/// The controller decides, this handle performs the HTTP calls and feeds
/// the results back.
#[derive(Clone, Copy)]
pub struct ResourceHandle {
    kind: ResourceKind,
    pub state: RwSignal<ResourceController>,
    /// Picked files keyed by image field; dropped entries revoke their preview
    pub files: RwSignal<BTreeMap<String, PendingImage>, LocalStorage>,
    /// Ошибка операции над списком (удаление, переключение активности)
    pub notice: RwSignal<Option<String>>,
}

impl ResourceHandle {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            state: RwSignal::new(ResourceController::new(kind, DEFAULT_PER_PAGE)),
            files: RwSignal::new_local(BTreeMap::new()),
            notice: RwSignal::new(None),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    // ========================================================================
    // List
    // ========================================================================

    fn load(self, ticket: LoadTicket) {
        let kind = self.kind;
        spawn_local(async move {
            let result = fetch_page(kind, &ticket.query).await;
            let outcome = self.state.try_update(|c| c.apply_load(&ticket, result));
            match outcome {
                Some(LoadOutcome::Failed(e)) => {
                    log::warn!("{}: load failed: {}", kind, e);
                    self.notice
                        .try_set(Some(format!("Не удалось загрузить список: {}", e.user_message())));
                }
                Some(LoadOutcome::Discarded) => {
                    log::debug!("{}: stale response #{} discarded", kind, ticket.generation);
                }
                Some(LoadOutcome::Applied) | None => {}
            }
        });
    }

    pub fn reload(self) {
        if let Some(ticket) = self.state.try_update(|c| c.list.refresh()) {
            self.load(ticket);
        }
    }

    pub fn set_page(self, page: u64) {
        if let Some(ticket) = self.state.try_update(|c| c.list.set_page(page)) {
            self.load(ticket);
        }
    }

    pub fn set_per_page(self, per_page: u64) {
        if let Some(ticket) = self.state.try_update(|c| c.list.set_per_page(per_page)) {
            self.load(ticket);
        }
    }

    pub fn set_filter(self, key: &'static str, value: String) {
        if let Some(ticket) = self.state.try_update(|c| c.list.set_filter(key, value)) {
            self.load(ticket);
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn toggle(self, id: i64) {
        self.state.update(|c| c.selection.toggle(id));
    }

    pub fn toggle_all(self) {
        self.state.update(|c| c.selection.toggle_all());
    }

    // ========================================================================
    // Mutations from the list
    // ========================================================================

    pub fn toggle_active(self, id: i64) {
        if let Some(mutation) = self.state.with_untracked(|c| c.toggle_active_request(id)) {
            self.mutate(mutation);
        }
    }

    pub fn delete(self, id: i64) {
        let Some(mutation) = self.state.with_untracked(|c| c.delete_request(id)) else {
            return;
        };
        if confirm(&format!("Удалить запись #{}?", id)) {
            self.mutate(mutation);
        }
    }

    pub fn bulk_delete(self) {
        let Some(mutation) = self.state.with_untracked(|c| c.bulk_delete_request()) else {
            return;
        };
        let count = self.state.with_untracked(|c| c.selection.len());
        if confirm(&format!("Удалить выбранные элементы? Количество: {}", count)) {
            self.mutate(mutation);
        }
    }

    fn mutate(self, mutation: MutationRequest) {
        self.notice.set(None);
        let dispatcher = MutationDispatcher::new(self.kind);
        spawn_local(async move {
            let result = dispatcher.send(&mutation).await;
            match self.state.try_update(|c| c.after_mutation(&mutation, result)) {
                Some(AfterMutation::Reload(ticket)) => self.load(ticket),
                Some(AfterMutation::Failed(e)) => {
                    log::warn!("{}: mutation failed: {}", self.kind, e);
                    self.notice.try_set(Some(e.user_message()));
                }
                None => {}
            }
        });
    }

    // ========================================================================
    // Form
    // ========================================================================

    pub fn open_create(self) {
        self.files.set(BTreeMap::new());
        if let Some(requests) = self.state.try_update(|c| c.form.open_create()) {
            self.load_options(requests);
        }
    }

    pub fn open_edit(self, id: i64) {
        self.files.set(BTreeMap::new());
        let requests = self.state.try_update(|c| {
            let entity = c.find(id).cloned()?;
            Some(c.form.open_edit(&entity))
        });
        if let Some(Some(requests)) = requests {
            self.load_options(requests);
        }
    }

    pub fn set_field(self, key: &str, value: Value) {
        if let Some(requests) = self.state.try_update(|c| c.form.set_field(key, value)) {
            self.load_options(requests);
        }
    }

    fn load_options(self, requests: Vec<OptionsRequest>) {
        for request in requests {
            spawn_local(async move {
                let result = fetch_options(&request).await;
                if let Err(e) = &result {
                    log::warn!("{}: options of '{}' failed: {}", self.kind, request.field, e);
                }
                let applied = self.state.try_update(|c| c.form.set_options(&request, result));
                if applied == Some(false) {
                    log::debug!("{}: options of '{}' dropped", self.kind, request.field);
                }
            });
        }
    }

    pub fn pick_image(self, field: &str, file: web_sys::File) {
        let change = ImageChange::Replace {
            file_name: file.name(),
        };
        self.files.update(|files| {
            files.insert(field.to_string(), PendingImage::new(file));
        });
        self.state.update(|c| c.form.set_image(field, change));
    }

    pub fn remove_image(self, field: &str) {
        self.files.update(|files| {
            files.remove(field);
        });
        self.state.update(|c| c.form.set_image(field, ImageChange::Remove));
    }

    pub fn cancel(self) {
        self.state.update(|c| c.form.cancel());
        self.files.set(BTreeMap::new());
    }

    pub fn submit(self) {
        let submitted = self.state.try_update(|c| c.form.submit());
        let mutation = match submitted {
            Some(Ok(mutation)) => mutation,
            Some(Err(blocked)) => {
                log::debug!("{}: submit blocked: {}", self.kind, blocked);
                return;
            }
            None => return,
        };

        let dispatcher = MutationDispatcher::new(self.kind);
        spawn_local(async move {
            let result = dispatcher.send(&mutation).await.and_then(|saved| {
                saved.ok_or_else(|| ApiError::Decode("empty response".to_string()))
            });

            let outcome = self.state.try_update(|c| c.form.complete(result));
            let Some(SubmitOutcome::Saved { entity, images }) = outcome else {
                return;
            };

            if !images.is_empty() {
                let files = self.files.try_update(std::mem::take).unwrap_or_default();
                if let Err(e) = dispatcher.upload_images(entity.id, &images, &files).await {
                    log::warn!("{}: image upload for #{} failed: {}", self.kind, entity.id, e);
                    self.notice
                        .try_set(Some(format!("Запись сохранена, но изображение не загружено: {}", e.user_message())));
                }
            }
            self.files.try_set(BTreeMap::new());
            self.reload();
        });
    }
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|win| win.confirm_with_message(message).ok())
        .unwrap_or(false)
}
