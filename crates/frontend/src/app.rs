use crate::layout::global_context::AppGlobalContext;
use crate::layout::Shell;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    // Provide the AppGlobalContext store to the whole app via context.
    let ctx = AppGlobalContext::new();
    provide_context(ctx);

    // Active page follows ?active=... in the URL
    ctx.init_router_integration();

    view! {
        <Shell />
    }
}
