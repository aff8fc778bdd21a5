pub mod nav {
    use campus_shared::path::{
        PATH_HOME, PATH_INSTALL, link_community, link_notes, link_opportunities, link_pyq,
        link_seniors,
    };
    use leptos::prelude::*;

    use crate::app::GlobalState;
    use crate::app::hook::use_college::CollegeScope;

    #[component]
    pub fn Nav(#[prop(optional)] scope: Option<CollegeScope>) -> impl IntoView {
        let global_state = expect_context::<GlobalState>();
        let username = move || {
            global_state
                .get_username_tracked()
                .unwrap_or_else(|| String::from("Guest"))
        };
        let sections = move || {
            let scope = scope?;
            let slug = scope.slug.get();
            Some(view! {
                <div class="flex gap-3 text-[0.95rem]">
                    <a href=link_seniors(&slug)>"Seniors"</a>
                    <a href=link_pyq(&slug)>"PYQ"</a>
                    <a href=link_notes(&slug)>"Notes"</a>
                    <a href=link_community(&slug)>"Community"</a>
                    <a href=link_opportunities(&slug)>"Opportunities"</a>
                </div>
            })
        };

        view! {
            <nav class="flex flex-wrap gap-2 px-2 min-h-[3rem] items-center justify-between text-base05">
                <a href=PATH_HOME class="font-black text-[1.3rem]">
                    "Student Senior"
                </a>
                { sections }
                <div class="flex gap-3">
                    <a href=PATH_INSTALL>"Install"</a>
                    <p>{ username }</p>
                </div>
            </nav>
        }
    }
}

pub mod toasts {
    use leptos::prelude::*;

    use crate::app::{GlobalState, ToastKind};

    #[component]
    pub fn Toasts() -> impl IntoView {
        let global_state = expect_context::<GlobalState>();
        let toasts = move || {
            global_state
                .toasts
                .get()
                .into_iter()
                .map(|toast| {
                    let id = toast.id;
                    let style = match toast.kind {
                        ToastKind::Success => "border-base0B text-base0B",
                        ToastKind::Error => "border-base08 text-base08",
                    };
                    view! {
                        <div
                            class=format!("border-2 bg-base01 px-4 py-2 cursor-pointer {style}")
                            on:click=move |_| global_state.dismiss_toast(id)
                        >
                            { toast.message }
                        </div>
                    }
                })
                .collect_view()
        };

        view! {
            <div class="fixed bottom-4 right-4 z-50 flex flex-col gap-2">
                { toasts }
            </div>
        }
    }
}

pub mod status {
    use campus_shared::collection::LoadStatus;
    use leptos::prelude::*;

    #[component]
    pub fn Status(#[prop(into)] status: Signal<LoadStatus>, #[prop(into)] empty: Signal<bool>) -> impl IntoView {
        move || match status.get() {
            LoadStatus::Idle | LoadStatus::Loading => {
                view! { <p class="text-base03">"loading..."</p> }.into_any()
            }
            LoadStatus::Failed(reason) => {
                view! { <p class="text-base08">{ reason }</p> }.into_any()
            }
            LoadStatus::Loaded if empty.get() => {
                view! { <p class="text-base03">"Nothing here yet."</p> }.into_any()
            }
            LoadStatus::Loaded => ().into_any(),
        }
    }
}

pub mod pager {
    use leptos::prelude::*;

    #[component]
    pub fn Pager(
        #[prop(into)] page: Signal<usize>,
        #[prop(into)] total_pages: Signal<usize>,
        on_page: Callback<usize>,
    ) -> impl IntoView {
        view! {
            <div class=move || format!("flex gap-4 items-center justify-center {}", if total_pages.get() > 1 { "" } else { "hidden" })>
                <button
                    class="border-2 border-base05 px-3 disabled:text-base03"
                    disabled=move || page.get() <= 1
                    on:click=move |_| on_page.run(page.get_untracked().saturating_sub(1))
                >
                    "Prev"
                </button>
                <p>{ move || format!("{} / {}", page.get(), total_pages.get()) }</p>
                <button
                    class="border-2 border-base05 px-3 disabled:text-base03"
                    disabled=move || page.get() >= total_pages.get()
                    on:click=move |_| on_page.run(page.get_untracked() + 1)
                >
                    "Next"
                </button>
            </div>
        }
    }
}

pub mod post_card {
    use campus_shared::interaction::{Action, BoardEvent, PendingKey};
    use campus_shared::model::{Comment, Post};
    use campus_shared::path::link_post;
    use leptos::prelude::*;

    use web_sys::{Event, MouseEvent};

    use crate::app::hook::use_board::BoardHook;
    use crate::toolbox::prelude::*;

    fn format_time(post: &Post) -> String {
        post.created_at
            .map(|time| time.strftime("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default()
    }

    #[component]
    pub fn PostCard(hook: BoardHook, post_id: String, #[prop(into)] slug: Signal<String>) -> impl IntoView {
        let post_id = StoredValue::new(post_id);
        let editing = RwSignal::new(None::<String>);
        let show_all = RwSignal::new(false);
        let post = Memo::new(move |_| {
            hook.board
                .with(|board| post_id.with_value(|id| board.post(id).cloned()))
        });

        let id = move || post_id.get_value();
        let liked = move || hook.board.with(|board| board.is_post_liked(&id()));
        let like_pending =
            move || hook.is_pending_tracked(&PendingKey::post(Action::LikePost, id()));
        let can_edit = move || hook.board.with(|board| board.can_edit_post(&id()));
        let edit_pending =
            move || hook.is_pending_tracked(&PendingKey::post(Action::EditPost, id()));
        let delete_pending =
            move || hook.is_pending_tracked(&PendingKey::post(Action::DeletePost, id()));
        let draft = move || hook.board.with(|board| board.draft(&id()).to_string());
        let comment_pending =
            move || hook.is_pending_tracked(&PendingKey::post(Action::AddComment, id()));

        let on_like =
            move |_: MouseEvent| hook.emit.call(BoardEvent::LikeRequested { post_id: id() });
        let on_delete = move |_: MouseEvent| {
            hook.emit
                .call(BoardEvent::PostDeleteRequested { post_id: id() })
        };
        let on_edit_save = move |_: MouseEvent| {
            let Some(content) = editing.get_untracked() else {
                return;
            };
            hook.emit.call(BoardEvent::PostEditRequested {
                post_id: id(),
                content,
            });
            editing.set(None);
        };
        let on_draft = move |ev: Event| {
            hook.emit.call(BoardEvent::DraftChanged {
                post_id: id(),
                text: event_target_value(&ev),
            })
        };
        let on_comment = move |_: MouseEvent| {
            hook.emit
                .call(BoardEvent::CommentAddRequested { post_id: id() })
        };

        let comment_view = move |comment: Comment| {
            let comment_id = StoredValue::new(comment.id.clone());
            let cid = move || comment_id.get_value();
            let comment_liked =
                move || hook.board.with(|board| board.is_comment_liked(&id(), &cid()));
            let can_delete =
                move || hook.board.with(|board| board.can_delete_comment(&id(), &cid()));
            let like_pending = move || {
                hook.is_pending_tracked(&PendingKey::comment(Action::LikeComment, id(), cid()))
            };
            let delete_pending = move || {
                hook.is_pending_tracked(&PendingKey::comment(Action::DeleteComment, id(), cid()))
            };
            view! {
                <div class="flex flex-col gap-1 border-l-2 border-base03 pl-2">
                    <div class="flex justify-between">
                        <p class="font-bold text-base0B">{ comment.author_name().to_string() }</p>
                        <div class="flex gap-2">
                            <button
                                class=move || if comment_liked() { "text-base08" } else { "text-base05" }
                                disabled=move || comment_liked() || like_pending()
                                on:click=move |_| hook.emit.call(BoardEvent::CommentLikeRequested { post_id: id(), comment_id: cid() })
                            >
                                { format!("♥ {}", comment.likes.count()) }
                            </button>
                            <button
                                class=move || if can_delete() { "text-base08" } else { "hidden" }
                                disabled=delete_pending
                                on:click=move |_| hook.emit.call(BoardEvent::CommentDeleteRequested { post_id: id(), comment_id: cid() })
                            >
                                "Delete"
                            </button>
                        </div>
                    </div>
                    <p>{ comment.content.clone() }</p>
                </div>
            }
        };

        let comments = move || {
            let current = post.get()?;
            let comments = if show_all.get() {
                current.comments.clone()
            } else {
                current.latest_comment().cloned().into_iter().collect()
            };
            Some(comments.into_iter().map(comment_view).collect_view())
        };

        let body = move || {
            let current = post.get()?;
            let comment_count = current.comments.len();
            let like_count = current.likes.len();
            let time = format_time(&current);
            let author = current.author_name().to_string();
            let content = current.content;
            Some(view! {
                <div class="flex flex-col gap-2 border-2 border-base02 p-3">
                    <div class="flex justify-between">
                        <div class="flex gap-2 items-baseline">
                            <p class="font-bold text-base0B">{ author }</p>
                            <p class="text-[0.8rem] text-base03">{ time }</p>
                        </div>
                        <a href=move || link_post(slug.get(), id()) class="text-base0D">"Open"</a>
                    </div>
                    { move || match editing.get() {
                        Some(text) => view! {
                            <div class="flex flex-col gap-2">
                                <textarea
                                    class="border-2 border-base0E bg-base01"
                                    prop:value=text
                                    on:input=move |ev| editing.set(Some(event_target_value(&ev)))
                                ></textarea>
                                <div class="flex gap-2">
                                    <button class="text-base0E" disabled=edit_pending on:click=on_edit_save>"Save"</button>
                                    <button on:click=move |_| editing.set(None)>"Cancel"</button>
                                </div>
                            </div>
                        }.into_any(),
                        None => view! { <p class="whitespace-pre-wrap">{ content.clone() }</p> }.into_any(),
                    } }
                    <div class="flex gap-3 items-center">
                        <button
                            class=move || format!("border-2 px-3 {}", if liked() { "border-base08 text-base08" } else { "border-base05" })
                            disabled=like_pending
                            on:click=on_like
                        >
                            { format!("♥ {like_count}") }
                        </button>
                        <p class="text-base03">{ format!("{comment_count} comments") }</p>
                        <button
                            class=move || if can_edit() { "text-base0E" } else { "hidden" }
                            disabled=move || edit_pending() || delete_pending()
                            on:click=move |_| editing.set(post.with_untracked(|post| post.as_ref().map(|post| post.content.clone())))
                        >
                            "Edit"
                        </button>
                        <button
                            class=move || if can_edit() { "text-base08" } else { "hidden" }
                            disabled=delete_pending
                            on:click=on_delete
                        >
                            "Delete"
                        </button>
                    </div>
                    <div class="flex flex-col gap-2">
                        { comments }
                        <button
                            class={move || if comment_count > 1 { "text-base0D text-left" } else { "hidden" }}
                            on:click=move |_| show_all.update(|v| *v = !*v)
                        >
                            { move || if show_all.get() { "Hide comments" } else { "Show all comments" } }
                        </button>
                    </div>
                    <div class="flex gap-2">
                        <input
                            class="grow border-2 border-base02 bg-base01 px-2"
                            placeholder="Write a comment"
                            prop:value=draft
                            on:input=on_draft
                        />
                        <button class="border-2 border-base0E px-3 text-base0E" disabled=comment_pending on:click=on_comment>
                            "Send"
                        </button>
                    </div>
                </div>
            })
        };

        body
    }
}
