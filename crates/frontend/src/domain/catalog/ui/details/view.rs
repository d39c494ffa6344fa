use super::fields::field_input;
use crate::shared::icons::icon;
use crate::shared::modal::Modal;
use crate::shared::resource::ResourceHandle;
use contracts::shared::resource::FormMode;
use leptos::prelude::*;

/// Create/edit form of one catalog record, shown in a modal
#[component]
pub fn CatalogDetails(handle: ResourceHandle) -> impl IntoView {
    let state = handle.state;
    let kind = handle.kind();

    let title = Signal::derive(move || match state.with(|c| c.form.mode()) {
        FormMode::Create => format!("{}: новая запись", kind.element_name()),
        FormMode::Edit(id) => format!("{} #{}", kind.element_name(), id),
    });
    let banner = move || state.with(|c| c.form.banner().map(str::to_string));
    let submitting = move || state.with(|c| c.form.is_submitting());

    view! {
        <Modal title=title on_close=Callback::new(move |_| handle.cancel())>
            <div class="details-container">
                {move || banner().map(|b| view! { <div class="error">{b}</div> })}

                <div class="details-form">
                    {kind
                        .fields()
                        .iter()
                        .filter(|f| !f.read_only)
                        .map(|spec| field_input(handle, spec))
                        .collect_view()}
                </div>

                <div class="details-actions">
                    <button
                        class="button button--primary"
                        on:click=move |_| handle.submit()
                        disabled=submitting
                    >
                        {icon("save")}
                        {move || if submitting() { "Сохранение..." } else { "Сохранить" }}
                    </button>
                    <button class="button button--secondary" on:click=move |_| handle.cancel()>
                        {icon("cancel")}
                        {"Отмена"}
                    </button>
                </div>
            </div>
        </Modal>
    }
}
