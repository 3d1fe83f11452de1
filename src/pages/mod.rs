use crate::components::add_item::AddItemForm;
use crate::components::delete_confirm::DeleteConfirm;
use crate::components::editable_field::{EditableText, FieldError};
use crate::components::editable_tags::EditableTags;
use crate::components::ui::{Alert, AlertActions, AlertDescription, Button, ButtonSize, ButtonVariant};
use crate::confirm::ConfirmState;
use crate::editable::FieldKey;
use crate::models::{FieldKind, Item};
use crate::state::AppContext;
use leptos::ev;
use leptos::prelude::*;
use leptos_dom::helpers::window_event_listener;

#[component]
fn ItemRow(item: Item) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let active_items = app_state.0.active_items;
    let deletions = app_state.0.deletions;
    let id = StoredValue::new(item.id.clone());

    let is_active = move || active_items.with(|a| id.with_value(|id| a.contains(id)));
    // Outside the toolbox so a failure stays visible after it closes.
    let delete_error = Signal::derive(move || deletions.with(|d| id.with_value(|id| d.error(id))));
    let is_removed = move || deletions.with(|d| id.with_value(|id| d.state(id)) == ConfirmState::Removed);

    let row_class = move || {
        let mut class = String::from("item flex flex-col gap-1 rounded-md border px-3 py-2 transition-opacity duration-300");
        if is_active() {
            class.push_str(" active_item bg-accent/40");
        }
        if is_removed() {
            class.push_str(" opacity-0");
        }
        class
    };

    let on_toolbox = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        id.with_value(|id| app_state.0.toggle_toolbox(id));
    };

    let fields = item
        .fields
        .iter()
        .map(|f| {
            let key = FieldKey::new(f.resource_id.clone(), f.name.clone());
            let editor = match f.kind {
                FieldKind::Tags => view! { <EditableTags key=key /> }.into_any(),
                FieldKind::Text | FieldKind::Url => view! { <EditableText key=key /> }.into_any(),
            };
            view! {
                <div class="flex items-baseline gap-2 text-sm">
                    <span class="w-12 shrink-0 text-xs text-muted-foreground">{f.name.clone()}</span>
                    {editor}
                </div>
            }
        })
        .collect_view();

    view! {
        <li class=row_class data-item-id=item.id.to_string() data-item-api-url=item.api_url.clone()>
            {fields}
            <div class="flex items-center gap-2">
                <span class=move || if is_active() { "link_toolbox active rounded bg-accent" } else { "link_toolbox" }>
                    <Button variant=ButtonVariant::Ghost size=ButtonSize::Xs on:click=on_toolbox>
                        "Tools"
                    </Button>
                </span>
                <Show when=is_active fallback=|| ().into_view()>
                    <DeleteConfirm item_id=id.get_value() />
                </Show>
            </div>
            <FieldError message=delete_error />
        </li>
    }
}

/// The link list: editing toggle, add form and the items.
#[component]
pub fn ItemListPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let items = app_state.0.items;
    let fields = app_state.0.fields;
    let notice = app_state.0.notice;
    let deletions = app_state.0.deletions;
    let add_open: RwSignal<bool> = RwSignal::new(false);

    let editing_enabled = move || fields.with(|b| b.config().enabled);

    let state_for_toggle = app_state.clone();
    let on_toggle_editing = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        state_for_toggle.0.toggle_editing();
    };

    // Escape dismisses any open delete prompt.
    let _escape = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Escape" {
            deletions.update(|d| d.decline_all());
        }
    });

    view! {
        <div class="flex flex-col gap-3">
            <div class="flex items-center gap-2">
                // The wrapper carries the toggle's active state.
                <span class=move || if editing_enabled() { "active rounded-md bg-accent ring-1 ring-ring/40" } else { "rounded-md" }>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:id="id_enable_editable"
                        attr:aria-pressed=move || editing_enabled().to_string()
                        on:click=on_toggle_editing
                    >
                        {move || if editing_enabled() { "Editing enabled" } else { "Enable editing" }}
                    </Button>
                </span>
                <span class=move || if add_open.get() { "active rounded-md bg-accent" } else { "rounded-md" }>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:id="id_add_form"
                        on:click=move |_| add_open.update(|open| *open = !*open)
                    >
                        "Add a new link"
                    </Button>
                </span>
            </div>

            <Show when=move || notice.get().is_some() fallback=|| ().into_view()>
                {move || {
                    notice.get().map(|n| {
                        view! {
                            <Alert class="border-amber-500/40">
                                <AlertDescription class="text-xs">{n}</AlertDescription>
                                <AlertActions>
                                    <Button
                                        variant=ButtonVariant::Ghost
                                        size=ButtonSize::Xs
                                        on:click=move |_| notice.set(None)
                                    >
                                        "Dismiss"
                                    </Button>
                                </AlertActions>
                            </Alert>
                        }
                    })
                }}
            </Show>

            <Show when=move || add_open.get() fallback=|| ().into_view()>
                <AddItemForm />
            </Show>

            <ul class="flex flex-col gap-2">
                <For
                    each=move || items.get()
                    key=|item| item.id.clone()
                    children=|item| view! { <ItemRow item=item /> }
                />
            </ul>

            <Show when=move || items.with(Vec::is_empty) fallback=|| ().into_view()>
                <div class="px-1 py-4 text-xs text-muted-foreground">"No links yet."</div>
            </Show>
        </div>
    }
}
