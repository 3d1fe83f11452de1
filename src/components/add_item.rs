use crate::components::tag_input::TagInput;
use crate::components::ui::{Alert, AlertDescription, Button, ButtonSize, Input, Label, Spinner};
use crate::models::{Item, NewItem};
use crate::normalize::{url_after_blur, TagDraft, TagInputOptions};
use crate::state::AppContext;
use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn AddItemForm() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let opts: StoredValue<TagInputOptions> = StoredValue::new(ctx.0.tag_options.clone());
    let ctx = StoredValue::new(ctx);

    let url: RwSignal<String> = RwSignal::new(String::new());
    let tags: RwSignal<TagDraft> = RwSignal::new(TagDraft::default());
    let pending: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let tokens = Signal::derive(move || tags.with(|t| t.tokens.clone()));

    let update_tags = move |f: &dyn Fn(&mut TagDraft)| {
        let mut next = String::new();
        tags.update(|t| {
            f(t);
            next = t.pending.clone();
        });
        pending.set(next);
    };

    let on_type = Callback::new(move |input: String| {
        opts.with_value(|o| update_tags(&|t| t.set_pending(&input, o)));
    });
    let on_pick = Callback::new(move |tag: String| update_tags(&|t| t.add(&tag)));
    let on_remove = Callback::new(move |idx: usize| update_tags(&|t| t.remove(idx)));
    let on_tags_blur = Callback::new(move |_| opts.with_value(|o| update_tags(&|t| t.on_blur(o))));

    let on_url_blur = Callback::new(move |_| {
        url.update(|u| *u = url_after_blur(u));
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }

        let new_item = NewItem {
            url: url_after_blur(&url.get_untracked()),
            tags: tags.with_untracked(TagDraft::to_value),
        };
        let app = ctx.with_value(|c| c.0.clone());

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match app.api.create_item(&new_item).await {
                Ok(created) => {
                    let item = Item::from_api(created, app.api.items_endpoint());
                    log!("added item {}", item.id);
                    app.add_item(item);
                    url.set(String::new());
                    tags.set(TagDraft::default());
                    pending.set(String::new());
                }
                Err(e) => {
                    // Form keeps what the user typed.
                    error.set(Some(e.to_string()));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <form class="add-item flex flex-col gap-2 rounded-lg border p-3" on:submit=on_submit>
            <div class="flex flex-col gap-1.5">
                <Label html_for="add_item_url" class="text-xs">"URL"</Label>
                <Input
                    id="add_item_url"
                    name="url"
                    placeholder="example.com"
                    bind_value=url
                    required=true
                    on_blur=on_url_blur
                    class="h-8 text-sm"
                />
            </div>

            <div class="flex flex-col gap-1.5">
                <Label html_for="add_item_tags" class="text-xs">"Tags"</Label>
                <TagInput
                    id="add_item_tags"
                    placeholder="rust, wasm"
                    tokens=tokens
                    pending=pending
                    on_type=on_type
                    on_pick=on_pick
                    on_remove=on_remove
                    on_blur=on_tags_blur
                />
            </div>

            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                {move || {
                    error.get().map(|e| {
                        view! {
                            <Alert class="border-destructive/30">
                                <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                            </Alert>
                        }
                    })
                }}
            </Show>

            <Button size=ButtonSize::Sm attr:disabled=move || loading.get()>
                <span class="inline-flex items-center gap-2">
                    <Show when=move || loading.get() fallback=|| ().into_view()>
                        <Spinner />
                    </Show>
                    {move || if loading.get() { "Adding..." } else { "Add" }}
                </span>
            </Button>
        </form>
    }
}
