use std::collections::BTreeMap;

use serde_json::Value;

use super::mutation::MutationRequest;
use crate::domain::catalog::{CatalogEntity, OptionItem, ResourceKind};
use crate::shared::api_error::{ApiError, FieldErrors};
use crate::shared::metadata::FieldMap;
use crate::shared::pagination::{Page, PageQuery};
use crate::shared::upload::{ImageChange, ImageUploadPlan};

/// Page size used when loading options of a reference field
pub const OPTIONS_PER_PAGE: u64 = 100;

/// Upper bound on option pages fetched for one field
const MAX_OPTION_PAGES: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Closed,
    Editing,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

// ============================================================================
// Draft
// ============================================================================

/// Unsaved values of the form, keyed by field.
///
/// A copy of the record's editable fields; editing it never touches the
/// record shown in the list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    values: FieldMap,
}

impl Draft {
    pub fn blank(kind: ResourceKind) -> Self {
        let values = kind
            .fields()
            .iter()
            .filter(|f| f.is_editable())
            .map(|f| {
                let initial = match f.key {
                    "is_active" => Value::Bool(true),
                    _ => Value::Null,
                };
                (f.key.to_string(), initial)
            })
            .collect();
        Self { values }
    }

    pub fn from_entity(kind: ResourceKind, entity: &CatalogEntity) -> Self {
        let values = kind
            .fields()
            .iter()
            .filter(|f| f.is_editable())
            .map(|f| (f.key.to_string(), entity.field_value(f.key)))
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> &Value {
        self.values.get(key).unwrap_or(&Value::Null)
    }

    /// Value as shown in a text input
    pub fn text(&self, key: &str) -> String {
        match self.get(key) {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key).as_bool().unwrap_or(false)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn values(&self) -> &FieldMap {
        &self.values
    }

    /// Coerced payload with every editable field of `kind`
    pub fn payload(&self, kind: ResourceKind) -> FieldMap {
        kind.fields()
            .iter()
            .filter(|f| f.is_editable())
            .map(|f| (f.key.to_string(), f.coerce(self.get(f.key))))
            .collect()
    }
}

// ============================================================================
// Options of reference fields
// ============================================================================

/// Request for the options of one reference field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsRequest {
    pub field: &'static str,
    pub source: ResourceKind,
    /// Parent key and value for dependent fields
    pub filter: Option<(String, String)>,
}

impl OptionsRequest {
    pub fn to_query(&self) -> PageQuery {
        self.page_query(1)
    }

    pub fn page_query(&self, page: u64) -> PageQuery {
        let mut query = PageQuery::new(OPTIONS_PER_PAGE).with_filter("is_active", "true");
        query.page = page.max(1);
        match &self.filter {
            Some((key, value)) => query.with_filter(key.clone(), value.clone()),
            None => query,
        }
    }

    pub fn collector(&self) -> OptionsCollector {
        OptionsCollector {
            request: self.clone(),
            items: Vec::new(),
            next_page: Some(1),
        }
    }
}

/// Walks the pages of an options source until the last one
#[derive(Debug, Clone)]
pub struct OptionsCollector {
    request: OptionsRequest,
    items: Vec<OptionItem>,
    next_page: Option<u64>,
}

impl OptionsCollector {
    /// Query of the next page to fetch, `None` once all pages are in
    pub fn next_query(&self) -> Option<PageQuery> {
        self.next_page.map(|page| self.request.page_query(page))
    }

    pub fn push(&mut self, page: Page<CatalogEntity>) {
        let Some(requested) = self.next_page else {
            return;
        };
        self.items.extend(page.items.iter().map(CatalogEntity::option_item));

        let meta = &page.meta;
        // a server that clamps or repeats pages must not loop forever
        self.next_page = (meta.current_page == requested
            && meta.current_page < meta.last_page
            && requested < MAX_OPTION_PAGES)
            .then_some(requested + 1);
    }

    pub fn finish(self) -> Vec<OptionItem> {
        self.items
    }
}

// ============================================================================
// Submission
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitBlocked {
    #[error("form is not open")]
    NotOpen,
    #[error("submission already in flight")]
    InFlight,
    #[error("draft has {} invalid field(s)", .0.len())]
    Invalid(FieldErrors),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Saved; the form is closed. Pending image changes still have to be uploaded.
    Saved {
        entity: CatalogEntity,
        images: ImageUploadPlan,
    },
    /// Server refused; errors are on the form which stays open
    Rejected,
    /// No submission was in flight
    Ignored,
}

// ============================================================================
// Controller
// ============================================================================

/// Create/edit modal of one resource kind
#[derive(Debug, Clone)]
pub struct FormController {
    kind: ResourceKind,
    state: FormState,
    mode: FormMode,
    draft: Draft,
    errors: FieldErrors,
    banner: Option<String>,
    options: BTreeMap<&'static str, Vec<OptionItem>>,
    images: ImageUploadPlan,
}

impl FormController {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            state: FormState::Closed,
            mode: FormMode::Create,
            draft: Draft::blank(kind),
            errors: FieldErrors::new(),
            banner: None,
            options: BTreeMap::new(),
            images: ImageUploadPlan::new(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != FormState::Closed
    }

    pub fn is_submitting(&self) -> bool {
        self.state == FormState::Submitting
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn options(&self, field: &str) -> &[OptionItem] {
        self.options.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn images(&self) -> &ImageUploadPlan {
        &self.images
    }

    pub fn open_create(&mut self) -> Vec<OptionsRequest> {
        self.open(FormMode::Create, Draft::blank(self.kind))
    }

    pub fn open_edit(&mut self, entity: &CatalogEntity) -> Vec<OptionsRequest> {
        self.open(FormMode::Edit(entity.id), Draft::from_entity(self.kind, entity))
    }

    fn open(&mut self, mode: FormMode, draft: Draft) -> Vec<OptionsRequest> {
        self.state = FormState::Editing;
        self.mode = mode;
        self.draft = draft;
        self.errors.clear();
        self.banner = None;
        self.options.clear();
        self.images.clear();

        self.kind
            .reference_fields()
            .filter_map(|f| self.options_request(f.key))
            .collect()
    }

    /// Options request for `field` given the current draft; `None` when the
    /// field depends on a parent that is still unset.
    fn options_request(&self, field: &'static str) -> Option<OptionsRequest> {
        let spec = self.kind.field(field)?;
        let source = spec.options_from?;
        let filter = match spec.depends_on {
            Some(parent) => {
                let value = self.draft.text(parent);
                if value.trim().is_empty() {
                    return None;
                }
                Some((parent.to_string(), value))
            }
            None => None,
        };
        Some(OptionsRequest {
            field: spec.key,
            source,
            filter,
        })
    }

    /// Update one draft value.
    ///
    /// Changing a parent field resets its dependents and clears their
    /// options; the returned requests reload them for the new parent.
    pub fn set_field(&mut self, key: &str, value: Value) -> Vec<OptionsRequest> {
        let Some(spec) = self.kind.field(key) else {
            return Vec::new();
        };
        if !spec.is_editable() || self.state != FormState::Editing {
            return Vec::new();
        }

        let changed = self.draft.get(key) != &value;
        self.draft.set(key, value);
        self.errors.remove(key);
        if !changed {
            return Vec::new();
        }

        let mut requests = Vec::new();
        for dependent in self.kind.dependents_of(key) {
            self.draft.set(dependent.key, Value::Null);
            self.errors.remove(dependent.key);
            self.options.remove(dependent.key);
            requests.extend(self.options_request(dependent.key));
        }
        requests
    }

    pub fn set_image(&mut self, field: &str, change: ImageChange) {
        if self.kind.image_fields().any(|f| f.key == field) {
            self.images.set(field, change);
        }
    }

    /// Store loaded options. Returns `false` when the response no longer
    /// matches the draft (parent changed meanwhile) or the load failed; the
    /// list then stays empty.
    pub fn set_options(
        &mut self,
        request: &OptionsRequest,
        result: Result<Vec<OptionItem>, ApiError>,
    ) -> bool {
        if !self.is_open() || self.options_request(request.field).as_ref() != Some(request) {
            return false;
        }
        match result {
            Ok(items) => {
                self.options.insert(request.field, items);
                true
            }
            Err(_) => false,
        }
    }

    /// Validate the draft and build the mutation to send.
    ///
    /// Invalid drafts never produce a request; the errors land on the form.
    pub fn submit(&mut self) -> Result<MutationRequest, SubmitBlocked> {
        match self.state {
            FormState::Closed => return Err(SubmitBlocked::NotOpen),
            FormState::Submitting => return Err(SubmitBlocked::InFlight),
            FormState::Editing => {}
        }

        let errors = CatalogEntity::validate_input(self.kind, self.draft.values(), false);
        if !errors.is_empty() {
            self.errors = errors.clone();
            self.banner = None;
            return Err(SubmitBlocked::Invalid(errors));
        }

        self.errors.clear();
        self.banner = None;
        self.state = FormState::Submitting;

        let payload = self.draft.payload(self.kind);
        Ok(match self.mode {
            FormMode::Create => MutationRequest::Create(payload),
            FormMode::Edit(id) => MutationRequest::Update { id, payload },
        })
    }

    /// Feed back the response of the submitted mutation
    pub fn complete(&mut self, result: Result<CatalogEntity, ApiError>) -> SubmitOutcome {
        if self.state != FormState::Submitting {
            return SubmitOutcome::Ignored;
        }

        match result {
            Ok(entity) => {
                let images = std::mem::take(&mut self.images);
                self.close();
                SubmitOutcome::Saved { entity, images }
            }
            Err(e) => {
                self.state = FormState::Editing;
                if let Some(fields) = e.field_errors() {
                    self.errors.extend(fields.clone());
                }
                self.banner = Some(e.user_message());
                SubmitOutcome::Rejected
            }
        }
    }

    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.state = FormState::Closed;
        self.mode = FormMode::Create;
        self.draft = Draft::blank(self.kind);
        self.errors.clear();
        self.banner = None;
        self.options.clear();
        self.images.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::pagination::PageMeta;
    use serde_json::json;

    fn metal(is_active: bool) -> CatalogEntity {
        serde_json::from_value(json!({
            "id": 3,
            "name": "Платина 950",
            "code": "PT950",
            "is_active": is_active,
            "display_order": 2,
            "purity": 950.0
        }))
        .unwrap()
    }

    #[test]
    fn empty_required_field_blocks_submit() {
        let mut form = FormController::new(ResourceKind::Metal);
        form.open_create();
        form.set_field("code", json!("AU585"));

        let blocked = form.submit();
        assert!(matches!(blocked, Err(SubmitBlocked::Invalid(ref e)) if e.contains_key("name")));
        assert!(form.error("name").is_some());
        assert_eq!(form.state(), FormState::Editing);

        form.set_field("name", json!("Золото 585"));
        assert!(form.error("name").is_none());
        assert!(matches!(form.submit(), Ok(MutationRequest::Create(_))));
        assert_eq!(form.submit(), Err(SubmitBlocked::InFlight));
    }

    #[test]
    fn edit_echoes_unchanged_fields() {
        let entity = metal(false);
        let mut form = FormController::new(ResourceKind::Metal);
        form.open_edit(&entity);
        form.set_field("is_active", json!(true));

        let Ok(MutationRequest::Update { id, payload }) = form.submit() else {
            panic!("expected update");
        };
        assert_eq!(id, 3);

        let mut saved = entity.clone();
        saved.replace_fields(ResourceKind::Metal, &payload);
        assert!(saved.is_active);
        assert_eq!(saved.name, entity.name);
        assert_eq!(saved.code, entity.code);
        assert_eq!(saved.display_order, entity.display_order);
        assert_eq!(saved.attributes, entity.attributes);
    }

    #[test]
    fn server_errors_keep_form_open() {
        let mut form = FormController::new(ResourceKind::Metal);
        form.open_edit(&metal(true));
        form.submit().unwrap();

        let err = ApiError::from_response(
            422,
            r#"{"message":"Проверьте заполнение полей","errors":{"code":["Код уже используется"]}}"#,
        );
        assert_eq!(form.complete(Err(err)), SubmitOutcome::Rejected);
        assert!(form.is_open());
        assert!(!form.is_submitting());
        assert_eq!(form.error("code"), Some("Код уже используется"));
        assert_eq!(form.banner(), Some("Проверьте заполнение полей"));
    }

    #[test]
    fn success_closes_and_hands_over_images() {
        let mut form = FormController::new(ResourceKind::Brand);
        form.open_create();
        form.set_field("name", json!("Tiffany"));
        form.set_field("code", json!("TIF"));
        form.set_image("cover", ImageChange::Remove);
        form.submit().unwrap();

        let mut saved = CatalogEntity::blank();
        saved.id = 12;
        let SubmitOutcome::Saved { entity, images } = form.complete(Ok(saved)) else {
            panic!("expected saved");
        };
        assert_eq!(entity.id, 12);
        assert_eq!(images.get("cover"), &ImageChange::Remove);
        assert!(!form.is_open());
        assert_eq!(form.complete(Err(ApiError::Network("x".into()))), SubmitOutcome::Ignored);
    }

    #[test]
    fn parent_change_resets_dependents() {
        let mut form = FormController::new(ResourceKind::Diamond);
        let requests = form.open_create();
        // only the type is loadable while it is unset
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].source, ResourceKind::DiamondType);

        let requests = form.set_field("diamond_type_id", json!(2));
        assert_eq!(requests.len(), 3);
        let clarity = requests.iter().find(|r| r.field == "clarity_id").unwrap().clone();
        assert_eq!(clarity.filter, Some(("diamond_type_id".into(), "2".into())));
        assert_eq!(
            clarity.to_query().filters.get("diamond_type_id").map(String::as_str),
            Some("2")
        );

        let items = vec![OptionItem { id: 8, label: "VVS1".into() }];
        assert!(form.set_options(&clarity, Ok(items)));
        form.set_field("clarity_id", json!(8));

        form.set_field("diamond_type_id", json!(4));
        assert_eq!(form.draft().get("clarity_id"), &Value::Null);
        assert!(form.options("clarity_id").is_empty());

        // late response for the old parent is dropped
        let late = vec![OptionItem { id: 9, label: "VS2".into() }];
        assert!(!form.set_options(&clarity, Ok(late)));
        assert!(form.options("clarity_id").is_empty());
    }

    #[test]
    fn cancel_discards_draft() {
        let mut form = FormController::new(ResourceKind::Size);
        form.open_create();
        form.set_field("name", json!("18"));
        form.cancel();
        assert!(!form.is_open());
        assert_eq!(form.submit(), Err(SubmitBlocked::NotOpen));
        form.open_create();
        assert_eq!(form.draft().text("name"), "");
    }

    fn shape_sizes(ids: std::ops::Range<i64>, total: u64, page: u64) -> Page<CatalogEntity> {
        let items = ids
            .map(|id| {
                serde_json::from_value(json!({"id": id, "name": format!("R{}", id), "is_active": true}))
                    .unwrap()
            })
            .collect();
        Page::new(items, PageMeta::compute(total, OPTIONS_PER_PAGE, page))
    }

    #[test]
    fn options_are_collected_across_pages() {
        let request = OptionsRequest {
            field: "shape_size_id",
            source: ResourceKind::ShapeSize,
            filter: Some(("diamond_type_id".into(), "1".into())),
        };
        let mut collector = request.collector();

        let first = collector.next_query().unwrap();
        assert_eq!((first.page, first.per_page), (1, OPTIONS_PER_PAGE));
        collector.push(shape_sizes(1..101, 120, 1));

        let second = collector.next_query().unwrap();
        assert_eq!(second.page, 2);
        assert_eq!(second.filters.get("diamond_type_id").map(String::as_str), Some("1"));
        collector.push(shape_sizes(101..121, 120, 2));

        assert!(collector.next_query().is_none());
        let options = collector.finish();
        assert_eq!(options.len(), 120);
        assert_eq!(options.last().map(|o| o.id), Some(120));
    }

    #[test]
    fn clamped_page_stops_collection() {
        let request = OptionsRequest {
            field: "metal_id",
            source: ResourceKind::Metal,
            filter: None,
        };
        let mut collector = request.collector();
        collector.push(shape_sizes(1..101, 250, 1));
        // server answered page 1 again instead of page 2
        collector.push(shape_sizes(1..101, 250, 1));
        assert!(collector.next_query().is_none());
    }
}
