use crate::components::ui::Input;
use crate::normalize::TagSuggestions;
use crate::state::AppContext;
use icons::X;
use leptos::prelude::*;

const SUGGESTION_LIMIT: usize = 8;

/// Comma-separated tag entry: chosen tokens as chips, a free-text input for
/// the pending token, and vocabulary suggestions for it.
///
/// State lives with the caller; every gesture is reported through callbacks.
#[component]
pub fn TagInput(
    #[prop(into)] tokens: Signal<Vec<String>>,
    pending: RwSignal<String>,
    /// Raw input text after each keystroke; the caller splits it.
    on_type: Callback<String>,
    on_pick: Callback<String>,
    on_remove: Callback<usize>,
    #[prop(optional)] on_blur: Option<Callback<()>>,
    /// Keys the widget does not consume itself.
    #[prop(optional)] on_keydown: Option<Callback<web_sys::KeyboardEvent>>,
    #[prop(default = false.into(), into)] disabled: Signal<bool>,
    #[prop(into, optional)] id: String,
    #[prop(into, optional)] placeholder: String,
) -> impl IntoView {
    // Seeded once per widget.
    let suggestions: StoredValue<TagSuggestions> =
        StoredValue::new(expect_context::<AppContext>().0.tag_suggestions());

    let matches = move || {
        let query = pending.get();
        if query.is_empty() {
            return Vec::new();
        }
        let chosen = tokens.get();
        suggestions.with_value(|s| s.matching(&query, &chosen, SUGGESTION_LIMIT))
    };

    let handle_keydown = Callback::new(move |ev: web_sys::KeyboardEvent| {
        let current = pending.get_untracked();
        if ev.key() == "Enter" && !current.is_empty() {
            ev.prevent_default();
            // Same as typing the separator.
            on_type.run(format!("{current},"));
            return;
        }
        if let Some(cb) = on_keydown {
            cb.run(ev);
        }
    });

    view! {
        <div class="tag-input flex flex-col gap-1">
            <div class="flex flex-wrap items-center gap-1">
                {move || {
                    tokens
                        .get()
                        .into_iter()
                        .enumerate()
                        .map(|(idx, tag)| {
                            view! {
                                <span class="inline-flex items-center gap-1 rounded bg-accent px-1.5 py-0.5 text-xs">
                                    {tag}
                                    <button
                                        type="button"
                                        class="text-muted-foreground hover:text-foreground disabled:opacity-50"
                                        aria-label="Remove tag"
                                        disabled=move || disabled.get()
                                        on:click=move |_| on_remove.run(idx)
                                    >
                                        <X class="size-3" />
                                    </button>
                                </span>
                            }
                        })
                        .collect_view()
                }}
                <Input
                    id=id
                    placeholder=placeholder
                    bind_value=pending
                    disabled=disabled
                    on_input=on_type
                    on_keydown=handle_keydown
                    on_blur=Callback::new(move |_| {
                        if let Some(cb) = on_blur {
                            cb.run(());
                        }
                    })
                    class="h-7 w-40 text-sm"
                />
            </div>
            <Show when=move || !matches().is_empty() fallback=|| ().into_view()>
                <ul class="flex flex-wrap gap-1" role="listbox">
                    {move || {
                        matches()
                            .into_iter()
                            .map(|tag| {
                                let picked = tag.clone();
                                view! {
                                    <li
                                        role="option"
                                        class="cursor-pointer rounded border px-1.5 py-0.5 text-xs hover:bg-accent"
                                        // mousedown keeps focus in the input
                                        on:mousedown=move |ev: web_sys::MouseEvent| {
                                            ev.prevent_default();
                                            on_pick.run(picked.clone());
                                        }
                                    >
                                        {tag}
                                    </li>
                                }
                            })
                            .collect_view()
                    }}
                </ul>
            </Show>
        </div>
    }
}
