use leptos::prelude::*;

/// Чекбокс строки таблицы
///
/// Рендерит <td> с чекбоксом; клик не доходит до строки (stop_propagation).
/// Protected rows get a disabled box that never changes the selection.
#[component]
pub fn TableCheckbox(
    checked: Signal<bool>,
    on_toggle: Callback<()>,
    #[prop(into)]
    disabled: Signal<bool>,
) -> impl IntoView {
    view! {
        <td
            class="table__cell table__cell--checkbox"
            on:click=|e| e.stop_propagation()
        >
            <input
                type="checkbox"
                class="table__checkbox"
                prop:checked=checked
                prop:disabled=disabled
                on:change=move |_| on_toggle.run(())
            />
        </td>
    }
}

/// Чекбокс «выбрать все» в заголовке таблицы
#[component]
pub fn HeaderCheckbox(
    checked: Signal<bool>,
    #[prop(into)]
    disabled: Signal<bool>,
    on_toggle: Callback<()>,
) -> impl IntoView {
    view! {
        <th class="table__header-cell table__header-cell--checkbox">
            <input
                type="checkbox"
                class="table__checkbox"
                prop:checked=checked
                prop:disabled=disabled
                on:change=move |_| on_toggle.run(())
            />
        </th>
    }
}
