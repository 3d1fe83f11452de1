use crate::components::hooks::use_random::use_random_id_for;
use crate::components::ui::{Button, ButtonSize, ButtonVariant, Spinner};
use crate::confirm::ConfirmState;
use crate::models::ResourceId;
use crate::state::AppContext;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::set_timeout;
use std::time::Duration;

/// Matches the `duration-300` fade on the item row.
pub(crate) const FADE_OUT: Duration = Duration::from_millis(300);

/// Delete link plus its inline Yes/No prompt.
#[component]
pub fn DeleteConfirm(item_id: ResourceId) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let deletions = ctx.0.deletions;
    let item_id = StoredValue::new(item_id);
    let ctx = StoredValue::new(ctx);
    let prompt_id = use_random_id_for("delete_prompt");

    let state = move || deletions.with(|d| item_id.with_value(|id| d.state(id)));

    let on_delete = move |_: web_sys::MouseEvent| {
        deletions.update(|d| {
            item_id.with_value(|id| d.request_confirmation(id));
        });
    };

    let on_no = move |_: web_sys::MouseEvent| {
        deletions.update(|d| item_id.with_value(|id| d.decline(id)));
    };

    let on_yes = move |_: web_sys::MouseEvent| {
        let id = item_id.get_value();
        let Some(url) = deletions.try_update(|d| d.confirm(&id)).flatten() else {
            return;
        };
        let app = ctx.with_value(|c| c.0.clone());

        spawn_local(async move {
            let result = app.api.delete_item(&url).await;
            let mut outcome = ConfirmState::Idle;
            app.deletions.update(|d| outcome = d.finish_delete(&id, result));
            if outcome == ConfirmState::Removed {
                set_timeout(move || app.remove_item(&id), FADE_OUT);
            }
        });
    };

    view! {
        <span class="delete-confirm inline-flex">
            {move || match state() {
                ConfirmState::Idle => view! {
                    <Button
                        variant=ButtonVariant::Link
                        size=ButtonSize::Xs
                        class="text-destructive"
                        on:click=on_delete
                    >
                        "Delete"
                    </Button>
                }
                .into_any(),
                ConfirmState::Prompting => view! {
                    <span class="inline-flex items-center gap-2 text-xs" role="alertdialog" aria-labelledby=prompt_id.clone()>
                        <span id=prompt_id.clone()>"Do you want to delete this item?"</span>
                        <Button variant=ButtonVariant::Destructive size=ButtonSize::Xs on:click=on_yes>
                            "Yes"
                        </Button>
                        <Button variant=ButtonVariant::Outline size=ButtonSize::Xs on:click=on_no>
                            "No"
                        </Button>
                    </span>
                }
                .into_any(),
                ConfirmState::Deleting => view! {
                    <span class="inline-flex items-center gap-2 text-xs text-muted-foreground">
                        <Spinner />
                        "Deleting..."
                    </span>
                }
                .into_any(),
                ConfirmState::Removed => ().into_any(),
            }}
        </span>
    }
}
