use campus_shared::interaction::{BoardEvent, PendingKey};
use leptos::html;
use leptos::prelude::*;
use tracing::trace;
use web_sys::SubmitEvent;

use crate::app::components::nav::Nav;
use crate::app::components::post_card::PostCard;
use crate::app::components::status::Status;
use crate::app::hook::use_board::use_board;
use crate::app::hook::use_college::use_college;
use crate::toolbox::prelude::*;

#[component]
pub fn Page() -> impl IntoView {
    let scope = use_college();
    let hook = use_board(scope);
    let content_ref = NodeRef::<html::Textarea>::new();
    let anonymous_ref = NodeRef::<html::Input>::new();

    let post_ids = move || {
        hook.board.with(|board| {
            board
                .posts()
                .iter()
                .map(|post| post.id.clone())
                .collect::<Vec<_>>()
        })
    };
    let is_empty = Signal::derive(move || hook.board.with(|board| board.posts().is_empty()));
    let add_pending = move || hook.is_pending_tracked(&PendingKey::new_post());

    let on_post = move |e: SubmitEvent| {
        e.prevent_default();
        let (Some(content_elm), Some(anonymous_elm)) =
            (content_ref.get_untracked(), anonymous_ref.get_untracked())
        else {
            return;
        };
        let content = content_elm.value();
        let is_anonymous = anonymous_elm.checked();
        trace!("posting anonymous={is_anonymous}");
        hook.emit.call(BoardEvent::PostAddRequested {
            content,
            is_anonymous,
        });
        let accepted = hook
            .board
            .with_untracked(|board| board.is_pending(&PendingKey::new_post()));
        if accepted {
            content_elm.set_value("");
        }
    };

    view! {
        <main class="grid grid-rows-[auto_1fr] min-h-screen text-base05">
            <Nav scope=scope />
            <div class="flex flex-col gap-4 px-4 py-6 max-w-[50rem] w-full mx-auto">
                <h1 class="text-[1.8rem] font-black text-base0F">{ move || format!("{} Community", scope.name_tracked()) }</h1>
                <form class="flex flex-col gap-2" on:submit=on_post>
                    <textarea node_ref=content_ref class="border-2 border-base0E bg-base01 p-2" rows="4" placeholder="What is on your mind?"></textarea>
                    <div class="flex justify-between items-center">
                        <label class="flex gap-2 items-center">
                            <input node_ref=anonymous_ref type="checkbox" />
                            "Post anonymously"
                        </label>
                        <input
                            type="submit"
                            value=move || if add_pending() { "Posting..." } else { "Post" }
                            disabled=add_pending
                            class="border-2 border-base0E px-4 py-1 font-bold text-base0E hover:bg-base02"
                        />
                    </div>
                </form>
                <Status status=hook.status empty=is_empty />
                <div class="flex flex-col gap-4">
                    <For
                        each=post_ids
                        key=|post_id| post_id.clone()
                        children=move |post_id| view! { <PostCard hook=hook post_id=post_id slug=scope.slug /> }
                    />
                </div>
            </div>
        </main>
    }
}
