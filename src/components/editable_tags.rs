use crate::components::editable_field::{commit_field, FieldError};
use crate::components::tag_input::TagInput;
use crate::components::ui::{Button, ButtonSize, ButtonVariant, Spinner};
use crate::editable::{EditableField, FieldKey, FieldMode};
use crate::state::AppContext;
use leptos::prelude::*;

#[component]
pub fn EditableTags(key: FieldKey) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let fields = ctx.0.fields;
    let opts = StoredValue::new(ctx.0.tag_options.clone());
    let key = StoredValue::new(key);
    let ctx = StoredValue::new(ctx);
    let pending: RwSignal<String> = RwSignal::new(String::new());

    let is_editing = move || {
        fields.with(|b| key.with_value(|k| b.get(k).map(EditableField::mode)) == Some(FieldMode::Editing))
    };
    let in_flight = move || fields.with(|b| key.with_value(|k| b.get(k).is_some_and(EditableField::in_flight)));
    let can_edit = move || fields.with(|b| key.with_value(|k| b.get(k).is_some_and(EditableField::is_editable)));
    let confirmed = move || fields.with(|b| key.with_value(|k| b.get(k).map(|f| f.value().as_list()).unwrap_or_default()));
    let draft_tokens = Signal::derive(move || {
        fields.with(|b| {
            key.with_value(|k| b.get(k).and_then(EditableField::tag_draft).map(|t| t.tokens.clone()))
                .unwrap_or_default()
        })
    });
    let error = Signal::derive(move || {
        fields.with(|b| key.with_value(|k| b.get(k).and_then(|f| f.error().map(str::to_string))))
    });

    // Applies `f` to the field, then mirrors the draft's pending text.
    let edit = move |f: &dyn Fn(&mut EditableField)| {
        let k = key.get_value();
        let mut next_pending = None;
        fields.update(|b| {
            if let Some(field) = b.get_mut(&k) {
                f(field);
                next_pending = field.tag_draft().map(|t| t.pending.clone());
            }
        });
        pending.set(next_pending.unwrap_or_default());
    };

    let on_begin = move |_: web_sys::MouseEvent| {
        let started = fields.try_update(|b| key.with_value(|k| b.begin_edit(k))).unwrap_or(false);
        if started {
            edit(&|_| {});
        }
    };

    let on_type = Callback::new(move |input: String| {
        opts.with_value(|o| edit(&|f| f.type_tags(&input, o)));
    });
    let on_pick = Callback::new(move |tag: String| edit(&|f| f.pick_tag(&tag)));
    let on_remove = Callback::new(move |idx: usize| edit(&|f| f.remove_tag(idx)));
    let on_blur = Callback::new(move |_| opts.with_value(|o| edit(&|f| f.blur_tags(o))));

    let save = move || ctx.with_value(|c| commit_field(c, key.get_value()));
    let cancel = move || edit(&|f| {
        f.cancel_edit();
    });

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

    view! {
        <span class="editable-tags-field inline-flex flex-col">
            <Show
                when=is_editing
                fallback=move || {
                    view! {
                        <span
                            class=move || {
                                if can_edit() {
                                    "inline-flex flex-wrap gap-1 cursor-text rounded px-1 hover:bg-accent"
                                } else {
                                    "inline-flex flex-wrap gap-1 px-1"
                                }
                            }
                            on:click=on_begin
                        >
                            {move || {
                                let tags = confirmed();
                                if tags.is_empty() {
                                    view! { <span class="text-muted-foreground italic text-xs">"No tags"</span> }.into_any()
                                } else {
                                    tags.into_iter()
                                        .map(|t| view! { <span class="rounded bg-accent px-1.5 py-0.5 text-xs">{t}</span> })
                                        .collect_view()
                                        .into_any()
                                }
                            }}
                        </span>
                    }
                }
            >
                <span class="inline-flex items-start gap-1.5">
                    <TagInput
                        tokens=draft_tokens
                        pending=pending
                        on_type=on_type
                        on_pick=on_pick
                        on_remove=on_remove
                        on_blur=on_blur
                        on_keydown=on_keydown
                        disabled=Signal::derive(in_flight)
                    />
                    <Button size=ButtonSize::Xs attr:disabled=in_flight on:click=move |_| save()>
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
