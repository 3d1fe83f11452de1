use crate::components::ui::{Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Input, Spinner};
use crate::editable::{EditableField, FieldBoard, FieldKey, FieldMode};
use crate::models::FieldKind;
use crate::state::AppContext;
use leptos::prelude::*;
use leptos::task::spawn_local;

fn field_mode(board: &FieldBoard, key: &FieldKey) -> FieldMode {
    board.get(key).map(EditableField::mode).unwrap_or(FieldMode::Display)
}

/// Sends the field's current draft and routes the answer back by key.
pub(crate) fn commit_field(ctx: &AppContext, key: FieldKey) {
    let fields = ctx.0.fields;
    let Some((endpoint, patch)) = fields.try_update(|b| b.begin_commit(&key)).flatten() else {
        return;
    };

    let api = ctx.0.api.clone();
    spawn_local(async move {
        let result = api.patch_field(&endpoint, &patch).await;
        fields.update(|b| {
            b.finish_commit(&key, &patch, result);
        });
    });
}

/// Shared error line under an inline widget.
#[component]
pub fn FieldError(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.get().is_some() fallback=|| ().into_view()>
            {move || {
                message.get().map(|e| {
                    view! {
                        <Alert class="mt-1 border-destructive/30 py-2">
                            <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                        </Alert>
                    }
                })
            }}
        </Show>
    }
}

/// Inline editor for a plain text or URL attribute.
#[component]
pub fn EditableText(key: FieldKey) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let fields = ctx.0.fields;
    let key = StoredValue::new(key);
    let ctx = StoredValue::new(ctx);
    let draft: RwSignal<String> = RwSignal::new(String::new());

    let kind = fields.with_untracked(|b| {
        key.with_value(|k| b.get(k).map(EditableField::kind).unwrap_or(FieldKind::Text))
    });
    let is_editing = move || fields.with(|b| key.with_value(|k| field_mode(b, k)) == FieldMode::Editing);
    let in_flight = move || fields.with(|b| key.with_value(|k| b.get(k).is_some_and(EditableField::in_flight)));
    let can_edit = move || fields.with(|b| key.with_value(|k| b.get(k).is_some_and(EditableField::is_editable)));
    let has_stash = move || fields.with(|b| key.with_value(|k| b.get(k).is_some_and(EditableField::has_stashed_draft)));
    let display = move || {
        fields.with(|b| key.with_value(|k| b.get(k).map(|f| f.value().display_text()).unwrap_or_default()))
    };
    let error = Signal::derive(move || {
        fields.with(|b| key.with_value(|k| b.get(k).and_then(|f| f.error().map(str::to_string))))
    });

    let sync_draft_from_board = move || {
        let text = fields.with_untracked(|b| {
            key.with_value(|k| b.get(k).and_then(|f| f.draft_text().map(str::to_string)))
        });
        draft.set(text.unwrap_or_default());
    };

    let push_draft_to_board = move || {
        let (k, text) = (key.get_value(), draft.get_untracked());
        fields.update(|b| {
            if let Some(f) = b.get_mut(&k) {
                f.set_text(&text);
            }
        });
    };

    let on_begin = move |_: web_sys::MouseEvent| {
        let started = fields.try_update(|b| key.with_value(|k| b.begin_edit(k))).unwrap_or(false);
        if started {
            sync_draft_from_board();
        }
    };

    let on_blur = Callback::new(move |_| {
        push_draft_to_board();
        let k = key.get_value();
        fields.update(|b| {
            if let Some(f) = b.get_mut(&k) {
                f.blur_text();
            }
        });
        sync_draft_from_board();
    });

    let save = move || {
        push_draft_to_board();
        ctx.with_value(|c| commit_field(c, key.get_value()));
    };

    let cancel = move || {
        let k = key.get_value();
        fields.update(|b| {
            if let Some(f) = b.get_mut(&k) {
                f.cancel_edit();
            }
        });
    };

    let on_keydown = Callback::new(move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
        "Enter" => {
            ev.prevent_default();
            save();
        }
        "Escape" => {
            ev.prevent_default();
            cancel();
        }
        _ => {}
    });

    let r#type = if kind == FieldKind::Url { "url" } else { "text" };

    view! {
        <span class="editable-field inline-flex flex-col">
            <Show
                when=is_editing
                fallback=move || {
                    view! {
                        <span
                            class=move || {
                                if can_edit() {
                                    "cursor-text rounded px-1 hover:bg-accent"
                                } else {
                                    "px-1"
                                }
                            }
                            on:click=on_begin
                        >
                            {move || {
                                let text = display();
                                if text.is_empty() {
                                    view! { <span class="text-muted-foreground italic">"Empty"</span> }.into_any()
                                } else if kind == FieldKind::Url {
                                    { let href = text.clone(); view! { <a href=href class="underline-offset-4 hover:underline">{text}</a> }.into_any() }
                                } else {
                                    view! { <span>{text}</span> }.into_any()
                                }
                            }}
                            <Show when=has_stash fallback=|| ().into_view()>
                                <span class="ml-1 text-xs text-muted-foreground">"(unsaved edit)"</span>
                            </Show>
                        </span>
                    }
                }
            >
                <span class="inline-flex items-center gap-1.5">
                    <Input
                        r#type=r#type
                        bind_value=draft
                        disabled=Signal::derive(in_flight)
                        autofocus=true
                        on_blur=on_blur
                        on_keydown=on_keydown
                        class="h-7 text-sm"
                    />
                    <Button
                        size=ButtonSize::Xs
                        attr:disabled=in_flight
                        on:click=move |_| save()
                    >
                        "Save"
                    </Button>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Xs
                        attr:disabled=in_flight
                        on:click=move |_| cancel()
                    >
                        "Cancel"
                    </Button>
                    <Show when=in_flight fallback=|| ().into_view()>
                        <Spinner />
                    </Show>
                </span>
            </Show>
            <FieldError message=error />
        </span>
    }
}
