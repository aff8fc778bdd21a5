use campus_api::{Api, ApiWebPlain, ServerRes};
use campus_shared::collection::LoadStatus;
use campus_shared::interaction::{Board, BoardEvent, Command, Effect, PendingKey};
use leptos::prelude::*;
use tracing::{error, trace, warn};

use crate::app::GlobalState;
use crate::app::hook::use_college::CollegeScope;
use crate::toolbox::prelude::*;

#[derive(Clone, Copy)]
pub struct BoardHook {
    pub board: RwSignal<Board>,
    pub status: RwSignal<LoadStatus>,
    pub emit: StoredFn<BoardEvent>,
}

impl BoardHook {
    pub fn is_pending_tracked(&self, key: &PendingKey) -> bool {
        self.board.with(|board| board.is_pending(key))
    }
}

pub fn use_board(scope: CollegeScope) -> BoardHook {
    let global_state = expect_context::<GlobalState>();
    let board = RwSignal::new(Board::default());
    let status = RwSignal::new(LoadStatus::Idle);

    leptos::prelude::Effect::new(move || {
        let Some(college_id) = scope.id_tracked() else {
            return;
        };
        let viewer = global_state.get_user_id_untracked();
        trace!("board for college {college_id} viewer {viewer:?}");
        board.set(Board::new(viewer, Some(college_id), load_liked_comments()));
        status.set(LoadStatus::Loading);
        refetch(board, status, global_state);
    });

    leptos::prelude::Effect::new(move || {
        let viewer = global_state.get_user_id_tracked();
        board.update(|board| board.set_viewer(viewer));
    });

    let emit = move |event: BoardEvent| {
        dispatch(board, status, global_state, event);
    };

    BoardHook {
        board,
        status,
        emit: StoredValue::new(Box::new(emit)),
    }
}

fn success_message(command: &Command) -> Option<&'static str> {
    match command {
        Command::TogglePostLike { .. } | Command::LikeComment { .. } => None,
        Command::AddComment { .. } => Some("Comment added"),
        Command::DeleteComment { .. } => Some("Comment deleted"),
        Command::AddPost(_) => Some("Post created"),
        Command::EditPost { .. } => Some("Post updated"),
        Command::DeletePost { .. } => Some("Post deleted"),
    }
}

fn dispatch(
    board: RwSignal<Board>,
    status: RwSignal<LoadStatus>,
    global_state: GlobalState,
    event: BoardEvent,
) {
    let Some(result) = board.try_update(|board| board.reduce(event)) else {
        error!("board was disposed somehow");
        return;
    };
    let effect = match result {
        Ok(effect) => effect,
        Err(err) => {
            warn!("board refused: {err}");
            global_state.toast_err(err.to_string());
            return;
        }
    };

    match effect {
        Effect::None => {}
        Effect::Send(command) => {
            ApiWebPlain::new()
                .command(&command)
                .send_web(move |result| async move {
                    let event = match result {
                        Ok(_) => {
                            if let Some(message) = success_message(&command) {
                                global_state.toast_ok(message);
                            }
                            command.confirmed()
                        }
                        Err(err) => {
                            error!("use_board: {err}");
                            global_state.toast_err(err.to_string());
                            command.failed(err.to_string())
                        }
                    };
                    dispatch(board, status, global_state, event);
                });
        }
        Effect::PersistLikedComments => {
            board.with_untracked(|board| save_liked_comments(board.liked_comments()));
            refetch(board, status, global_state);
        }
        Effect::Refetch => {
            refetch(board, status, global_state);
        }
    }
}

fn refetch(board: RwSignal<Board>, status: RwSignal<LoadStatus>, global_state: GlobalState) {
    ApiWebPlain::new()
        .get_posts()
        .send_web(move |result| async move {
            match result {
                Ok(ServerRes::Posts(posts)) => {
                    dispatch(board, status, global_state, BoardEvent::Loaded(posts));
                    status.set(LoadStatus::Loaded);
                }
                Ok(res) => {
                    error!("use_board: expected ServerRes::Posts, received: {res:?}");
                    status.set(LoadStatus::Failed(String::from("unexpected response")));
                }
                Err(err) => {
                    error!("use_board: {err}");
                    global_state.toast_err(format!("failed to load posts: {err}"));
                    status.set(LoadStatus::Failed(err.to_string()));
                }
            }
        });
}

#[cfg(test)]
mod use_board_tests {
    use super::{BoardHook, success_message};
    use campus_shared::collection::LoadStatus;
    use campus_shared::interaction::{
        Action, Board, BoardEvent, Command, Effect, LikedComments, PendingKey,
    };
    use campus_shared::model::{Post, Ref};
    use leptos::prelude::*;
    use pretty_assertions::assert_eq;
    use test_log::test;

    fn owned_post() -> Post {
        Post {
            id: String::from("p1"),
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
    fn test_owner_buttons_follow_pending_flags() {
        let owner = Owner::new();
        owner.set();

        let mut board = Board::new(
            Some(String::from("u1")),
            Some(String::from("c1")),
            LikedComments::default(),
        );
        board.reduce(BoardEvent::Loaded(vec![owned_post()])).unwrap();
        let hook = BoardHook {
            board: RwSignal::new(board),
            status: RwSignal::new(LoadStatus::Loaded),
            emit: StoredValue::new(Box::new(|_: BoardEvent| {})),
        };
        let delete_key = PendingKey::post(Action::DeletePost, "p1");
        let edit_key = PendingKey::post(Action::EditPost, "p1");
        assert!(!hook.is_pending_tracked(&delete_key));

        let effect = hook
            .board
            .try_update(|board| {
                board.reduce(BoardEvent::PostDeleteRequested {
                    post_id: String::from("p1"),
                })
            })
            .unwrap()
            .unwrap();
        let Effect::Send(command) = effect else {
            panic!("expected a command, received {effect:?}");
        };
        assert!(hook.is_pending_tracked(&delete_key));
        assert!(!hook.is_pending_tracked(&edit_key));

        hook.board.update(|board| {
            board.reduce(command.failed("offline")).unwrap();
        });
        assert!(!hook.is_pending_tracked(&delete_key));
    }

    #[test]
    fn test_likes_are_not_toasted() {
        let like = Command::TogglePostLike {
            post_id: String::from("p1"),
        };
        assert_eq!(success_message(&like), None);

        let delete = Command::DeleteComment {
            post_id: String::from("p1"),
            comment_id: String::from("k1"),
        };
        assert_eq!(success_message(&delete), Some("Comment deleted"));
    }
}
