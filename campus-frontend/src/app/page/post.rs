use campus_shared::interaction::Board;
use campus_shared::path::{link_community, link_post};
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::error;
use web_sys::MouseEvent;

use crate::app::GlobalState;
use crate::app::components::nav::Nav;
use crate::app::components::post_card::PostCard;
use crate::app::components::status::Status;
use crate::app::hook::use_board::use_board;
use crate::app::hook::use_college::{use_college, use_param};
use crate::toolbox::prelude::*;

/// Changes only when the post appears or disappears, so the card keeps its local state.
pub fn post_exists(board: RwSignal<Board>, post_id: Memo<String>) -> Memo<bool> {
    Memo::new(move |_| {
        let post_id = post_id.get();
        board.with(|board| board.post(&post_id).is_some())
    })
}

#[component]
pub fn Page() -> impl IntoView {
    let global_state = expect_context::<GlobalState>();
    let scope = use_college();
    let post_id = use_param("post");
    let hook = use_board(scope);

    let exists = post_exists(hook.board, post_id);
    let not_found = Signal::derive(move || hook.status.with(|v| v.is_loaded()) && !exists.get());

    let on_share = move |_: MouseEvent| {
        let path = link_post(scope.slug.get_untracked(), post_id.get_untracked());
        let url = match origin() {
            Ok(origin) => format!("{origin}{path}"),
            Err(err) => {
                error!("share: {err}");
                path
            }
        };
        spawn_local(async move {
            match copy_to_clipboard(&url).await {
                Ok(()) => global_state.toast_ok("Link copied to clipboard"),
                Err(err) => {
                    error!("share: {err}");
                    global_state.toast_err(err.to_string());
                }
            }
        });
    };

    let card = move || {
        exists
            .get()
            .then(|| view! { <PostCard hook=hook post_id=post_id.get() slug=scope.slug /> })
    };

    view! {
        <main class="grid grid-rows-[auto_1fr] min-h-screen text-base05">
            <Nav scope=scope />
            <div class="flex flex-col gap-4 px-4 py-6 max-w-[50rem] w-full mx-auto">
                <div class="flex justify-between">
                    <a href=move || link_community(scope.slug.get()) class="text-base0D">"Back to community"</a>
                    <button class="border-2 border-base0E px-3 text-base0E" on:click=on_share>"Share"</button>
                </div>
                <Status status=Signal::derive(move || hook.status.get()) empty=Signal::derive(|| false) />
                <div class=move || if not_found.get() { "grid place-items-center text-[1.5rem]" } else { "hidden" }>
                    "Post not found"
                </div>
                { card }
            </div>
        </main>
    }
}

#[cfg(test)]
mod post_page_tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::post_exists;
    use campus_shared::interaction::{Board, BoardEvent, LikedComments};
    use campus_shared::model::{Post, Ref};
    use leptos::prelude::*;
    use pretty_assertions::assert_eq;
    use test_log::test;

    fn post(id: &str) -> Post {
        Post {
            id: id.to_string(),
            author: Ref::Id(String::from("u1")),
            content: String::from("<p>hello</p>"),
            is_anonymous: false,
            college: Ref::Id(String::from("c1")),
            comments: Vec::new(),
            likes: Default::default(),
            created_at: None,
        }
    }

    #[test]
    fn test_card_not_rebuilt_by_board_updates() {
        let owner = Owner::new();
        owner.set();

        let mut initial = Board::new(
            Some(String::from("u1")),
            Some(String::from("c1")),
            LikedComments::default(),
        );
        initial.reduce(BoardEvent::Loaded(vec![post("p1")])).unwrap();
        let board = RwSignal::new(initial);
        let post_id = Memo::new(|_| String::from("p1"));
        let exists = post_exists(board, post_id);

        let runs = Arc::new(AtomicUsize::new(0));
        let card = Memo::new({
            let runs = runs.clone();
            move |_| {
                runs.fetch_add(1, Ordering::SeqCst);
                exists.get()
            }
        });
        assert!(card.get());
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        board.update(|board| {
            board
                .reduce(BoardEvent::DraftChanged {
                    post_id: String::from("p1"),
                    text: String::from("typing"),
                })
                .unwrap();
        });
        assert!(card.get());
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        board.update(|board| {
            board.reduce(BoardEvent::Loaded(vec![post("p2")])).unwrap();
        });
        assert!(!card.get());
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }
}
