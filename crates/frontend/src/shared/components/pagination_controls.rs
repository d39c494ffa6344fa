use crate::shared::icons::icon;
use contracts::shared::pagination::PageMeta;
use leptos::prelude::*;

const PAGE_SIZE_OPTIONS: [u64; 4] = [10, 25, 50, 100];

/// Pagination controls over server-reported page meta.
///
/// Pages are 1-based, exactly as the API reports them.
#[component]
pub fn PaginationControls(
    /// Meta of the page currently shown (`None` before the first load)
    #[prop(into)]
    meta: Signal<Option<PageMeta>>,

    /// Requested page size
    #[prop(into)]
    per_page: Signal<u64>,

    /// Callback when page changes
    on_page_change: Callback<u64>,

    /// Callback when page size changes
    on_page_size_change: Callback<u64>,
) -> impl IntoView {
    let current = move || meta.get().map(|m| m.current_page).unwrap_or(1);
    let last = move || meta.get().map(|m| m.last_page).unwrap_or(1);
    let has_prev = move || meta.get().map(|m| m.has_prev()).unwrap_or(false);
    let has_next = move || meta.get().map(|m| m.has_next()).unwrap_or(false);

    view! {
        <div class="pagination-controls">
            <button
                class="pagination-btn"
                on:click=move |_| on_page_change.run(1)
                disabled=move || !has_prev()
                title="Первая страница"
            >
                {icon("chevrons-left")}
            </button>
            <button
                class="pagination-btn"
                on:click=move |_| on_page_change.run(current().saturating_sub(1).max(1))
                disabled=move || !has_prev()
                title="Предыдущая страница"
            >
                {icon("chevron-left")}
            </button>
            <span class="pagination-info">
                {move || match meta.get() {
                    Some(m) => match (m.from, m.to) {
                        (Some(from), Some(to)) => {
                            format!("{} / {} ({}–{} из {})", m.current_page, m.last_page, from, to, m.total)
                        }
                        _ => format!("{} / {} (0)", m.current_page, m.last_page),
                    },
                    None => "—".to_string(),
                }}
            </span>
            <button
                class="pagination-btn"
                on:click=move |_| on_page_change.run(current() + 1)
                disabled=move || !has_next()
                title="Следующая страница"
            >
                {icon("chevron-right")}
            </button>
            <button
                class="pagination-btn"
                on:click=move |_| on_page_change.run(last())
                disabled=move || !has_next()
                title="Последняя страница"
            >
                {icon("chevrons-right")}
            </button>
            <select
                class="page-size-select"
                on:change=move |ev| {
                    if let Ok(size) = event_target_value(&ev).parse::<u64>() {
                        on_page_size_change.run(size);
                    }
                }
                prop:value=move || per_page.get().to_string()
            >
                {PAGE_SIZE_OPTIONS
                    .iter()
                    .map(|&size| {
                        view! {
                            <option value=size.to_string() selected=move || per_page.get() == size>
                                {size.to_string()}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
        </div>
    }
}
