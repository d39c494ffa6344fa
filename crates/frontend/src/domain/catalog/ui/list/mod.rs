use crate::domain::catalog::ui::details::CatalogDetails;
use crate::shared::api_utils::asset_url;
use crate::shared::components::pagination_controls::PaginationControls;
use crate::shared::components::table_checkbox::{HeaderCheckbox, TableCheckbox};
use crate::shared::icons::icon;
use crate::shared::resource::ResourceHandle;
use contracts::domain::catalog::{CatalogEntity, ResourceKind};
use leptos::prelude::*;

/// Строка таблицы, подготовленная для отображения
#[derive(Clone, Debug, PartialEq)]
struct CatalogRow {
    id: i64,
    name: String,
    code: String,
    is_active: bool,
    display_order: String,
    image: Option<String>,
    updated_at: String,
    protected: bool,
}

impl CatalogRow {
    fn new(kind: ResourceKind, e: &CatalogEntity) -> Self {
        let image = kind
            .image_fields()
            .next()
            .and_then(|f| e.field_value(f.key).as_str().map(asset_url));
        Self {
            id: e.id,
            name: e.name.clone(),
            code: e.code.clone().unwrap_or_else(|| "-".to_string()),
            is_active: e.is_active,
            display_order: e
                .display_order
                .map(|o| o.to_string())
                .unwrap_or_else(|| "-".to_string()),
            image,
            updated_at: e
                .updated_at
                .map(format_timestamp)
                .unwrap_or_else(|| "-".to_string()),
            protected: e.is_protected(kind),
        }
    }
}

fn format_timestamp(dt: chrono::DateTime<chrono::Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Список записей одного справочника: фильтры, таблица с выбором,
/// пагинация и модальная форма.
#[component]
pub fn CatalogList(kind: ResourceKind) -> impl IntoView {
    let handle = ResourceHandle::new(kind);
    let state = handle.state;
    handle.reload();

    let has_code = kind.field("code").is_some();
    let has_image = kind.image_fields().next().is_some();
    let has_order = kind.has_display_order();

    let rows = Memo::new(move |_| {
        state.with(|c| {
            c.list
                .items()
                .iter()
                .map(|e| CatalogRow::new(kind, e))
                .collect::<Vec<_>>()
        })
    });
    let meta = Signal::derive(move || state.with(|c| c.list.page().map(|p| p.meta.clone())));
    let per_page = Signal::derive(move || state.with(|c| c.list.query().per_page));
    let selected_count = move || state.with(|c| c.selection.len());
    let all_selected = Signal::derive(move || state.with(|c| c.selection.is_all_selected()));
    let nothing_selectable =
        Signal::derive(move || state.with(|c| c.selection.selectable().is_empty()));
    let is_loading = move || state.with(|c| c.list.is_loading());
    let form_open = move || state.with(|c| c.form.is_open());
    let search_value = move || {
        state.with(|c| c.list.query().filters.get("search").cloned().unwrap_or_default())
    };

    view! {
        <div class="content">
            <div class="header">
                <h2>{kind.list_name()}</h2>
                <div class="header__actions">
                    <button class="button button--primary" on:click=move |_| handle.open_create()>
                        {icon("plus")}
                        {"Создать"}
                    </button>
                    <button class="button button--secondary" on:click=move |_| handle.reload()>
                        {icon("refresh")}
                        {"Обновить"}
                    </button>
                    <button
                        class="button button--secondary"
                        on:click=move |_| handle.bulk_delete()
                        disabled=move || selected_count() == 0
                    >
                        {icon("delete")}
                        {move || format!("Удалить ({})", selected_count())}
                    </button>
                </div>
            </div>

            <div class="filter-panel">
                <input
                    type="search"
                    class="filter-panel__search"
                    placeholder="Поиск по наименованию или коду"
                    prop:value=search_value
                    on:change=move |ev| handle.set_filter("search", event_target_value(&ev))
                />
                <select
                    class="filter-panel__select"
                    on:change=move |ev| handle.set_filter("is_active", event_target_value(&ev))
                >
                    <option value="">{"Все"}</option>
                    <option value="true">{"Активные"}</option>
                    <option value="false">{"Неактивные"}</option>
                </select>
                {move || is_loading().then(|| view! { <span class="filter-panel__loading">{"Загрузка..."}</span> })}
            </div>

            {move || handle.notice.get().map(|e| view! { <div class="error">{e}</div> })}

            <div class="table-container">
                <table class="table__data table--striped">
                    <thead class="table__head">
                        <tr>
                            <HeaderCheckbox
                                checked=all_selected
                                disabled=nothing_selectable
                                on_toggle=Callback::new(move |_| handle.toggle_all())
                            />
                            <th class="table__header-cell">{"ID"}</th>
                            {has_image.then(|| view! { <th class="table__header-cell">{"Изображение"}</th> })}
                            <th class="table__header-cell">{"Наименование"}</th>
                            {has_code.then(|| view! { <th class="table__header-cell">{"Код"}</th> })}
                            <th class="table__header-cell">{"Активен"}</th>
                            {has_order.then(|| view! { <th class="table__header-cell">{"Порядок"}</th> })}
                            <th class="table__header-cell">{"Изменено"}</th>
                            <th class="table__header-cell"></th>
                        </tr>
                    </thead>
                    <tbody>
                        {move || {
                            let items = rows.get();
                            if items.is_empty() {
                                return view! {
                                    <tr><td class="table__cell table__cell--empty" colspan="9">{"Нет записей"}</td></tr>
                                }
                                .into_any();
                            }
                            items
                                .into_iter()
                                .map(|row| render_row(handle, row, has_code, has_image, has_order))
                                .collect_view()
                                .into_any()
                        }}
                    </tbody>
                </table>
            </div>

            <PaginationControls
                meta=meta
                per_page=per_page
                on_page_change=Callback::new(move |page| handle.set_page(page))
                on_page_size_change=Callback::new(move |size| handle.set_per_page(size))
            />

            <Show when=form_open>
                <CatalogDetails handle=handle />
            </Show>
        </div>
    }
}

fn render_row(
    handle: ResourceHandle,
    row: CatalogRow,
    has_code: bool,
    has_image: bool,
    has_order: bool,
) -> impl IntoView {
    let state = handle.state;
    let id = row.id;
    let is_selected = Signal::derive(move || state.with(|c| c.selection.is_selected(id)));
    let protected = row.protected;

    view! {
        <tr
            class="table__row"
            class:table__row--selected=move || is_selected.get()
            on:click=move |_| handle.open_edit(id)
        >
            <TableCheckbox
                checked=is_selected
                disabled=Signal::derive(move || protected)
                on_toggle=Callback::new(move |_| handle.toggle(id))
            />
            <td class="table__cell">{id}</td>
            {has_image.then(|| view! {
                <td class="table__cell">
                    {match row.image.clone() {
                        Some(src) => view! { <img src=src alt="" class="table__thumb" /> }.into_any(),
                        None => view! { <span>{"-"}</span> }.into_any(),
                    }}
                </td>
            })}
            <td class="table__cell">{row.name.clone()}</td>
            {has_code.then(|| view! { <td class="table__cell">{row.code.clone()}</td> })}
            <td class="table__cell">
                <button
                    class="badge"
                    class:badge--active=row.is_active
                    title="Переключить активность"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        handle.toggle_active(id);
                    }
                >
                    {if row.is_active { "Да" } else { "Нет" }}
                </button>
            </td>
            {has_order.then(|| view! { <td class="table__cell">{row.display_order.clone()}</td> })}
            <td class="table__cell">{row.updated_at.clone()}</td>
            <td class="table__cell table__cell--actions" on:click=|e| e.stop_propagation()>
                <button class="button button--icon" title="Изменить" on:click=move |_| handle.open_edit(id)>
                    {icon("edit")}
                </button>
                {(!protected).then(|| view! {
                    <button class="button button--icon" title="Удалить" on:click=move |_| handle.delete(id)>
                        {icon("delete")}
                    </button>
                })}
            </td>
        </tr>
    }
}
