//! Sidebar: catalog resources grouped by area plus site settings

use crate::layout::global_context::{AppGlobalContext, SETTINGS_KEY};
use crate::shared::icons::icon;
use contracts::domain::catalog::ResourceKind;
use leptos::prelude::*;

struct MenuGroup {
    label: &'static str,
    icon: &'static str,
    items: Vec<ResourceKind>,
}

fn get_menu_groups() -> Vec<MenuGroup> {
    use ResourceKind::*;

    vec![
        MenuGroup {
            label: "Пользователи",
            icon: "users",
            items: vec![Admin, UserGroup],
        },
        MenuGroup {
            label: "Бриллианты",
            icon: "diamond",
            items: vec![Diamond, DiamondType, Clarity, Color, ShapeSize],
        },
        MenuGroup {
            label: "Справочники",
            icon: "database",
            items: vec![Metal, Size, Brand, ColorstoneQuality],
        },
        MenuGroup {
            label: "Заказы",
            icon: "file-text",
            items: vec![OrderStatus],
        },
    ]
}

#[component]
pub fn Sidebar() -> impl IntoView {
    let ctx = use_context::<AppGlobalContext>().expect("AppGlobalContext not found");
    let is_active = move |key: &str| ctx.active.get().as_deref() == Some(key);

    view! {
        <nav class="sidebar">
            {get_menu_groups()
                .into_iter()
                .map(|group| {
                    view! {
                        <div class="sidebar__group">
                            <div class="sidebar__group-title">
                                {icon(group.icon)}
                                <span>{group.label}</span>
                            </div>
                            {group
                                .items
                                .into_iter()
                                .map(|kind| {
                                    let key = kind.collection_name();
                                    view! {
                                        <a
                                            class="sidebar__item"
                                            class:sidebar__item--active=move || is_active(key)
                                            on:click=move |_| ctx.activate(key)
                                        >
                                            {kind.list_name()}
                                        </a>
                                    }
                                })
                                .collect_view()}
                        </div>
                    }
                })
                .collect_view()}
            <div class="sidebar__group">
                <a
                    class="sidebar__item"
                    class:sidebar__item--active=move || is_active(SETTINGS_KEY)
                    on:click=move |_| ctx.activate(SETTINGS_KEY)
                >
                    {icon("settings")}
                    <span>{"Настройки сайта"}</span>
                </a>
            </div>
        </nav>
    }
}
