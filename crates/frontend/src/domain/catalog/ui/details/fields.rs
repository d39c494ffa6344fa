//! Inputs generated from field descriptors

use crate::shared::api_utils::asset_url;
use crate::shared::icons::icon;
use crate::shared::object_url::{picked_file, PendingImage};
use crate::shared::resource::ResourceHandle;
use contracts::shared::metadata::{FieldKind, FieldSpec};
use contracts::shared::resource::FormMode;
use contracts::shared::upload::ImageChange;
use leptos::prelude::*;
use serde_json::Value;

pub fn field_input(handle: ResourceHandle, spec: &'static FieldSpec) -> AnyView {
    let key = spec.key;
    let state = handle.state;
    let text = move || state.with(|c| c.form.draft().text(key));
    let error = move || state.with(|c| c.form.error(key).map(str::to_string));
    let set_text = move |ev: leptos::ev::Event| handle.set_field(key, Value::String(event_target_value(&ev)));

    let input = match spec.kind {
        FieldKind::Text => view! {
            <input type="text" id=key prop:value=text on:input=set_text />
        }
        .into_any(),
        FieldKind::TextArea => view! {
            <textarea id=key rows="3" prop:value=text on:input=set_text />
        }
        .into_any(),
        FieldKind::Integer | FieldKind::Decimal => {
            let step = if spec.kind == FieldKind::Decimal { "any" } else { "1" };
            view! {
                <input type="number" id=key step=step prop:value=text on:input=set_text />
            }
            .into_any()
        }
        FieldKind::Flag => view! {
            <input
                type="checkbox"
                id=key
                prop:checked=move || state.with(|c| c.form.draft().flag(key))
                on:change=move |ev| handle.set_field(key, Value::Bool(event_target_checked(&ev)))
            />
        }
        .into_any(),
        FieldKind::Reference => reference_select(handle, spec),
        FieldKind::Image => image_input(handle, spec),
    };

    view! {
        <div class="form-group" class:form-group--invalid=move || error().is_some()>
            <label for=key>
                {spec.label}
                {spec.rules.is_required().then_some(" *")}
            </label>
            {input}
            {move || error().map(|e| view! { <div class="field-error">{e}</div> })}
        </div>
    }
    .into_any()
}

/// Dropdown of a reference field; dependent fields stay disabled until
/// their parent is chosen
fn reference_select(handle: ResourceHandle, spec: &'static FieldSpec) -> AnyView {
    let key = spec.key;
    let state = handle.state;
    let current = move || state.with(|c| c.form.draft().text(key));
    let options = move || state.with(|c| c.form.options(key).to_vec());
    let parent_unset = move || match spec.depends_on {
        Some(parent) => state.with(|c| c.form.draft().text(parent).trim().is_empty()),
        None => false,
    };

    view! {
        <select
            id=key
            disabled=parent_unset
            on:change=move |ev| handle.set_field(key, Value::String(event_target_value(&ev)))
        >
            <option value="" selected=move || current().is_empty()>{"— не выбрано —"}</option>
            {move || {
                options()
                    .into_iter()
                    .map(|item| {
                        let value = item.id.to_string();
                        let is_current = value.clone();
                        view! {
                            <option value=value selected=move || current() == is_current>
                                {item.label}
                            </option>
                        }
                    })
                    .collect_view()
            }}
        </select>
    }
    .into_any()
}

/// Image slot: stored picture, local preview of a picked file, or nothing
/// after removal
fn image_input(handle: ResourceHandle, spec: &'static FieldSpec) -> AnyView {
    let key = spec.key;
    let state = handle.state;
    let files = handle.files;

    let stored = move || {
        state.with(|c| match c.form.mode() {
            FormMode::Edit(id) => c
                .find(id)
                .and_then(|e| e.field_value(key).as_str().map(asset_url)),
            FormMode::Create => None,
        })
    };
    let preview = move || match state.with(|c| c.form.images().get(key).clone()) {
        ImageChange::Replace { .. } => files.with(|f| f.get(key).and_then(PendingImage::preview_url)),
        ImageChange::Remove => None,
        ImageChange::Keep => stored(),
    };

    view! {
        <div class="image-field">
            {move || match preview() {
                Some(src) => view! { <img class="image-field__preview" src=src alt="" /> }.into_any(),
                None => view! { <span class="image-field__empty">{icon("image")}</span> }.into_any(),
            }}
            <input
                type="file"
                id=key
                accept="image/*"
                on:change=move |ev| {
                    if let Some(file) = picked_file(&ev) {
                        handle.pick_image(key, file);
                    }
                }
            />
            <button
                type="button"
                class="button button--secondary"
                disabled=move || preview().is_none()
                on:click=move |_| handle.remove_image(key)
            >
                {icon("delete")}
                {"Удалить изображение"}
            </button>
        </div>
    }
    .into_any()
}
