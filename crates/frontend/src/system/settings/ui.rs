use std::collections::BTreeMap;

use super::api;
use crate::shared::api_utils::asset_url;
use crate::shared::icons::icon;
use crate::shared::object_url::{picked_file, PendingImage};
use contracts::shared::api_error::FieldErrors;
use contracts::shared::upload::{ImageChange, ImageUploadPlan};
use contracts::system::settings::{SiteSettings, SETTINGS_IMAGE_FIELDS};
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

fn image_label(field: &str) -> &'static str {
    match field {
        "logo" => "Логотип",
        _ => "Favicon",
    }
}

fn stored_image(settings: &SiteSettings, field: &str) -> Option<String> {
    match field {
        "logo" => settings.logo_url.clone(),
        _ => settings.favicon_url.clone(),
    }
}

/// Настройки сайта: название, email поддержки, логотип и favicon
#[component]
pub fn SettingsPage() -> impl IntoView {
    let form = RwSignal::new(SiteSettings::default());
    // Last saved state; stored images are previewed from it
    let saved = RwSignal::new(SiteSettings::default());
    let errors = RwSignal::new(FieldErrors::new());
    let banner = RwSignal::new(None::<String>);
    let notice = RwSignal::new(None::<String>);
    let saving = RwSignal::new(false);
    let images = RwSignal::new(ImageUploadPlan::new());
    let files = RwSignal::new_local(BTreeMap::<String, PendingImage>::new());

    spawn_local(async move {
        match api::fetch_settings().await {
            Ok(settings) => {
                form.try_set(settings.clone());
                saved.try_set(settings);
            }
            Err(e) => {
                log::warn!("settings load failed: {}", e);
                banner.try_set(Some(e.user_message()));
            }
        }
    });

    let save = move || {
        if saving.get_untracked() {
            return;
        }
        let current = form.get_untracked();
        let client_errors = current.validate();
        if !client_errors.is_empty() {
            errors.set(client_errors);
            return;
        }

        let plan = images.get_untracked();
        let body = match files.try_with_untracked(|f| api::settings_form(&current, &plan, f)) {
            Some(Ok(body)) => body,
            Some(Err(e)) => {
                banner.set(Some(e.user_message()));
                return;
            }
            None => return,
        };

        errors.set(FieldErrors::new());
        banner.set(None);
        notice.set(None);
        saving.set(true);
        spawn_local(async move {
            let result = api::save_settings(body).await;
            match result {
                Ok(settings) => {
                    form.try_set(settings.clone());
                    saved.try_set(settings);
                    images.try_set(ImageUploadPlan::new());
                    files.try_set(BTreeMap::new());
                    notice.try_set(Some("Настройки сохранены".to_string()));
                }
                Err(e) => {
                    log::warn!("settings save failed: {}", e);
                    if let Some(fields) = e.field_errors() {
                        errors.try_set(fields.clone());
                    }
                    banner.try_set(Some(e.user_message()));
                }
            }
            saving.try_set(false);
        });
    };

    let field_error = move |key: &'static str| move || errors.with(|e| e.get(key).cloned());

    view! {
        <div class="content">
            <div class="header">
                <h2>{"Настройки сайта"}</h2>
                <div class="header__actions">
                    <button
                        class="button button--primary"
                        on:click=move |_| save()
                        disabled=move || saving.get()
                    >
                        {icon("save")}
                        {move || if saving.get() { "Сохранение..." } else { "Сохранить" }}
                    </button>
                </div>
            </div>

            {move || banner.get().map(|b| view! { <div class="error">{b}</div> })}
            {move || notice.get().map(|n| view! { <div class="notice">{n}</div> })}

            <div class="details-form">
                <div class="form-group">
                    <label for="site_name">{"Название сайта *"}</label>
                    <input
                        type="text"
                        id="site_name"
                        prop:value=move || form.with(|f| f.site_name.clone())
                        on:input=move |ev| form.update(|f| f.site_name = event_target_value(&ev))
                    />
                    {move || field_error("site_name")().map(|e| view! { <div class="field-error">{e}</div> })}
                </div>

                <div class="form-group">
                    <label for="support_email">{"Email поддержки"}</label>
                    <input
                        type="email"
                        id="support_email"
                        prop:value=move || form.with(|f| f.support_email.clone().unwrap_or_default())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            form.update(|f| {
                                f.support_email = if value.trim().is_empty() { None } else { Some(value) };
                            });
                        }
                    />
                    {move || field_error("support_email")().map(|e| view! { <div class="field-error">{e}</div> })}
                </div>

                {SETTINGS_IMAGE_FIELDS
                    .into_iter()
                    .map(|field| {
                        let preview = move || match images.with(|p| p.get(field).clone()) {
                            ImageChange::Replace { .. } => {
                                files.with(|f| f.get(field).and_then(PendingImage::preview_url))
                            }
                            ImageChange::Remove => None,
                            ImageChange::Keep => saved.with(|s| stored_image(s, field)).map(|u| asset_url(&u)),
                        };
                        view! {
                            <div class="form-group">
                                <label for=field>{image_label(field)}</label>
                                <div class="image-field">
                                    {move || match preview() {
                                        Some(src) => view! { <img class="image-field__preview" src=src alt="" /> }.into_any(),
                                        None => view! { <span class="image-field__empty">{icon("image")}</span> }.into_any(),
                                    }}
                                    <input
                                        type="file"
                                        id=field
                                        accept="image/*"
                                        on:change=move |ev| {
                                            if let Some(file) = picked_file(&ev) {
                                                let change = ImageChange::Replace { file_name: file.name() };
                                                files.update(|f| {
                                                    f.insert(field.to_string(), PendingImage::new(file));
                                                });
                                                images.update(|p| p.set(field, change));
                                            }
                                        }
                                    />
                                    <button
                                        type="button"
                                        class="button button--secondary"
                                        disabled=move || preview().is_none()
                                        on:click=move |_| {
                                            files.update(|f| {
                                                f.remove(field);
                                            });
                                            images.update(|p| p.set(field, ImageChange::Remove));
                                        }
                                    >
                                        {icon("delete")}
                                        {"Удалить"}
                                    </button>
                                </div>
                                {move || field_error(field)().map(|e| view! { <div class="field-error">{e}</div> })}
                            </div>
                        }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}
