pub mod global_context;
pub mod sidebar;

use crate::domain::catalog::ui::list::CatalogList;
use crate::shared::icons::icon;
use crate::system::settings::ui::SettingsPage;
use contracts::domain::catalog::ResourceKind;
use global_context::{AppGlobalContext, SETTINGS_KEY};
use leptos::prelude::*;
use sidebar::Sidebar;

/// Main application shell.
///
/// ```text
/// +------------------------------------------+
/// |              TopHeader                   |
/// +------------------------------------------+
/// |  Sidebar  |          Content             |
/// +------------------------------------------+
/// ```
#[component]
pub fn Shell() -> impl IntoView {
    let ctx = use_context::<AppGlobalContext>().expect("AppGlobalContext not found");

    view! {
        <div class="app-layout">
            <header class="top-header">
                <button class="button button--icon" on:click=move |_| ctx.toggle_left()>
                    {icon("menu")}
                </button>
                <span class="top-header__title">{"Ювелирный каталог"}</span>
            </header>
            <div class="app-body">
                <div data-zone="left" class="left" class:hidden=move || !ctx.left_open.get()>
                    <Sidebar />
                </div>
                <div class="app-main">
                    {move || render_page(ctx.active.get())}
                </div>
            </div>
        </div>
    }
}

/// Страница по ключу; каждый ресурс получает свой экземпляр списка
fn render_page(active: Option<String>) -> AnyView {
    match active.as_deref() {
        Some(SETTINGS_KEY) => view! { <SettingsPage /> }.into_any(),
        Some(key) => match ResourceKind::from_collection(key) {
            Some(kind) => view! { <CatalogList kind=kind /> }.into_any(),
            None => view! { <div class="error">{format!("Неизвестный раздел: {}", key)}</div> }
                .into_any(),
        },
        None => view! {
            <div class="placeholder">{"Выберите раздел в меню слева"}</div>
        }
        .into_any(),
    }
}
