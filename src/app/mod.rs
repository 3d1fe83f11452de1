use crate::pages::ItemListPage;
use crate::state::{AppContext, AppState};
use leptos::prelude::*;

#[component]
pub fn App(state: AppState) -> impl IntoView {
    provide_context(AppContext(state));

    view! { <ItemListPage /> }
}
