use std::collections::HashMap;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::model::{Comment, Likeable, NewPost, Post};
use crate::valid::post::{proccess_comment, proccess_post_content};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
    strum::EnumIs,
)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    LikePost,
    LikeComment,
    AddComment,
    DeleteComment,
    AddPost,
    EditPost,
    DeletePost,
}

/// Identifies one in-flight request. A second request with the same key is refused.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingKey {
    pub action: Action,
    pub post_id: Option<String>,
    pub comment_id: Option<String>,
}

impl PendingKey {
    pub fn post(action: Action, post_id: impl Into<String>) -> Self {
        Self {
            action,
            post_id: Some(post_id.into()),
            comment_id: None,
        }
    }

    pub fn comment(
        action: Action,
        post_id: impl Into<String>,
        comment_id: impl Into<String>,
    ) -> Self {
        Self {
            action,
            post_id: Some(post_id.into()),
            comment_id: Some(comment_id.into()),
        }
    }

    pub fn new_post() -> Self {
        Self {
            action: Action::AddPost,
            post_id: None,
            comment_id: None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoardErr {
    #[error("please log in first")]
    NotLoggedIn,

    #[error("post not found: {0}")]
    UnknownPost(String),

    #[error("comment not found: {0}")]
    UnknownComment(String),

    #[error("only the owner can do that")]
    NotOwner,

    #[error("{0} is already in progress")]
    InFlight(Action),

    #[error("comment already liked")]
    AlreadyLiked,

    #[error("{0}")]
    InvalidComment(String),

    #[error("{0}")]
    InvalidPost(String),

    #[error("no college selected")]
    UnknownCollege,
}

/// Records the optimistic change to a liker set so it can be compensated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub liked: bool,
}

impl LikeToggle {
    pub fn apply<T: Likeable>(item: &mut T, user_id: &str) -> Self {
        let likers = item.likers_mut();
        let liked = if likers.shift_remove(user_id) {
            false
        } else {
            likers.insert(user_id.to_string());
            true
        };
        trace!("like toggled on {} to {liked}", item.id());
        Self { liked }
    }

    /// Undoes the toggle. Safe to call after the item was replaced by a reload.
    pub fn revert<T: Likeable>(self, item: &mut T, user_id: &str) {
        let likers = item.likers_mut();
        if self.liked {
            likers.shift_remove(user_id);
        } else {
            likers.insert(user_id.to_string());
        }
    }
}

/// Comment ids this device already liked. Only a UI hint, the server stays authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LikedComments(IndexSet<String>);

impl LikedComments {
    pub fn from_json(raw: &str) -> Self {
        serde_json::from_str(raw)
            .inspect_err(|err| warn!("ignoring corrupt liked comments: {err}"))
            .unwrap_or_default()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| String::from("[]"))
    }

    pub fn contains(&self, comment_id: &str) -> bool {
        self.0.contains(comment_id)
    }

    pub fn insert(&mut self, comment_id: impl Into<String>) -> bool {
        self.0.insert(comment_id.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    TogglePostLike { post_id: String },
    LikeComment { post_id: String, comment_id: String },
    AddComment { post_id: String, content: String },
    DeleteComment { post_id: String, comment_id: String },
    AddPost(NewPost),
    EditPost { post_id: String, content: String },
    DeletePost { post_id: String },
}

impl Command {
    pub fn key(&self) -> PendingKey {
        match self {
            Command::TogglePostLike { post_id } => PendingKey::post(Action::LikePost, post_id),
            Command::LikeComment {
                post_id,
                comment_id,
            } => PendingKey::comment(Action::LikeComment, post_id, comment_id),
            Command::AddComment { post_id, .. } => PendingKey::post(Action::AddComment, post_id),
            Command::DeleteComment {
                post_id,
                comment_id,
            } => PendingKey::comment(Action::DeleteComment, post_id, comment_id),
            Command::AddPost(_) => PendingKey::new_post(),
            Command::EditPost { post_id, .. } => PendingKey::post(Action::EditPost, post_id),
            Command::DeletePost { post_id } => PendingKey::post(Action::DeletePost, post_id),
        }
    }

    pub fn confirmed(self) -> BoardEvent {
        match self {
            Command::TogglePostLike { post_id } => BoardEvent::LikeConfirmed { post_id },
            Command::LikeComment {
                post_id,
                comment_id,
            } => BoardEvent::CommentLikeConfirmed {
                post_id,
                comment_id,
            },
            Command::AddComment { post_id, .. } => BoardEvent::CommentAddConfirmed { post_id },
            Command::DeleteComment {
                post_id,
                comment_id,
            } => BoardEvent::CommentDeleteConfirmed {
                post_id,
                comment_id,
            },
            Command::AddPost(_) => BoardEvent::PostAddConfirmed,
            Command::EditPost { post_id, .. } => BoardEvent::PostEditConfirmed { post_id },
            Command::DeletePost { post_id } => BoardEvent::PostDeleteConfirmed { post_id },
        }
    }

    pub fn failed(self, reason: impl Into<String>) -> BoardEvent {
        let reason = reason.into();
        match self {
            Command::TogglePostLike { post_id } => BoardEvent::LikeFailed { post_id, reason },
            Command::LikeComment {
                post_id,
                comment_id,
            } => BoardEvent::CommentLikeFailed {
                post_id,
                comment_id,
                reason,
            },
            Command::AddComment { post_id, .. } => {
                BoardEvent::CommentAddFailed { post_id, reason }
            }
            Command::DeleteComment {
                post_id,
                comment_id,
            } => BoardEvent::CommentDeleteFailed {
                post_id,
                comment_id,
                reason,
            },
            Command::AddPost(_) => BoardEvent::PostAddFailed { reason },
            Command::EditPost { post_id, .. } => BoardEvent::PostEditFailed { post_id, reason },
            Command::DeletePost { post_id } => BoardEvent::PostDeleteFailed { post_id, reason },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    Loaded(Vec<Post>),
    DraftChanged { post_id: String, text: String },

    LikeRequested { post_id: String },
    LikeConfirmed { post_id: String },
    LikeFailed { post_id: String, reason: String },

    CommentLikeRequested { post_id: String, comment_id: String },
    CommentLikeConfirmed { post_id: String, comment_id: String },
    CommentLikeFailed { post_id: String, comment_id: String, reason: String },

    CommentAddRequested { post_id: String },
    CommentAddConfirmed { post_id: String },
    CommentAddFailed { post_id: String, reason: String },

    CommentDeleteRequested { post_id: String, comment_id: String },
    CommentDeleteConfirmed { post_id: String, comment_id: String },
    CommentDeleteFailed { post_id: String, comment_id: String, reason: String },

    PostAddRequested { content: String, is_anonymous: bool },
    PostAddConfirmed,
    PostAddFailed { reason: String },

    PostEditRequested { post_id: String, content: String },
    PostEditConfirmed { post_id: String },
    PostEditFailed { post_id: String, reason: String },

    PostDeleteRequested { post_id: String },
    PostDeleteConfirmed { post_id: String },
    PostDeleteFailed { post_id: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Send(Command),
    Refetch,
    /// Write the liked comment ids to device storage, then refetch.
    PersistLikedComments,
}

#[derive(Debug, Clone, PartialEq)]
enum Undo {
    Nothing,
    PostLike(LikeToggle),
    CommentLike,
}

/// Community feed state driven by [`BoardEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct Board {
    posts: Vec<Post>,
    viewer: Option<String>,
    college_id: Option<String>,
    pending: HashMap<PendingKey, Undo>,
    liked_comments: LikedComments,
    drafts: HashMap<String, String>,
}

pub fn latest_first(posts: Vec<Post>, college_id: &str) -> Vec<Post> {
    posts
        .into_iter()
        .rev()
        .filter(|post| post.college.id() == college_id)
        .collect()
}

impl Board {
    pub fn new(
        viewer: Option<String>,
        college_id: Option<String>,
        liked_comments: LikedComments,
    ) -> Self {
        Self {
            viewer,
            college_id,
            liked_comments,
            ..Default::default()
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn post(&self, post_id: &str) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == post_id)
    }

    pub fn viewer(&self) -> Option<&str> {
        self.viewer.as_deref()
    }

    pub fn set_viewer(&mut self, viewer: Option<String>) {
        self.viewer = viewer;
    }

    pub fn college_id(&self) -> Option<&str> {
        self.college_id.as_deref()
    }

    pub fn liked_comments(&self) -> &LikedComments {
        &self.liked_comments
    }

    pub fn draft(&self, post_id: &str) -> &str {
        self.drafts.get(post_id).map(String::as_str).unwrap_or_default()
    }

    pub fn is_pending(&self, key: &PendingKey) -> bool {
        self.pending.contains_key(key)
    }

    pub fn is_post_liked(&self, post_id: &str) -> bool {
        match (self.viewer(), self.post(post_id)) {
            (Some(viewer), Some(post)) => post.is_liked_by(viewer),
            _ => false,
        }
    }

    pub fn is_comment_liked(&self, post_id: &str, comment_id: &str) -> bool {
        if self.liked_comments.contains(comment_id) {
            return true;
        }
        match (self.viewer(), self.comment(post_id, comment_id)) {
            (Some(viewer), Some(comment)) => comment.likes.contains(viewer),
            _ => false,
        }
    }

    pub fn can_edit_post(&self, post_id: &str) -> bool {
        self.can_delete_post(post_id)
    }

    pub fn can_delete_post(&self, post_id: &str) -> bool {
        match (self.viewer(), self.post(post_id)) {
            (Some(viewer), Some(post)) => post.author.id() == viewer,
            _ => false,
        }
    }

    pub fn can_delete_comment(&self, post_id: &str, comment_id: &str) -> bool {
        match (self.viewer(), self.comment(post_id, comment_id)) {
            (Some(viewer), Some(comment)) => comment.author.id() == viewer,
            _ => false,
        }
    }

    fn comment(&self, post_id: &str, comment_id: &str) -> Option<&Comment> {
        self.post(post_id).and_then(|post| post.comment(comment_id))
    }

    fn post_mut(&mut self, post_id: &str) -> Result<&mut Post, BoardErr> {
        self.posts
            .iter_mut()
            .find(|post| post.id == post_id)
            .ok_or_else(|| BoardErr::UnknownPost(post_id.to_string()))
    }

    fn require_viewer(&self) -> Result<String, BoardErr> {
        self.viewer.clone().ok_or(BoardErr::NotLoggedIn)
    }

    fn guard(&self, key: &PendingKey) -> Result<(), BoardErr> {
        if self.pending.contains_key(key) {
            warn!("refusing {key:?}, still pending");
            return Err(BoardErr::InFlight(key.action));
        }
        Ok(())
    }

    fn settle(&mut self, key: &PendingKey) -> Option<Undo> {
        let undo = self.pending.remove(key);
        if undo.is_none() {
            debug!("settled {key:?} that was not pending");
        }
        undo
    }

    pub fn reduce(&mut self, event: BoardEvent) -> Result<Effect, BoardErr> {
        trace!("board event {event:?}");
        match event {
            BoardEvent::Loaded(posts) => {
                self.posts = match &self.college_id {
                    Some(college_id) => latest_first(posts, college_id),
                    None => posts,
                };
                // optimistic changes were replaced by server state, nothing left to undo
                for undo in self.pending.values_mut() {
                    *undo = Undo::Nothing;
                }
                Ok(Effect::None)
            }
            BoardEvent::DraftChanged { post_id, text } => {
                self.drafts.insert(post_id, text);
                Ok(Effect::None)
            }

            BoardEvent::LikeRequested { post_id } => {
                let viewer = self.require_viewer()?;
                let key = PendingKey::post(Action::LikePost, &post_id);
                self.guard(&key)?;
                let toggle = LikeToggle::apply(self.post_mut(&post_id)?, &viewer);
                self.pending.insert(key, Undo::PostLike(toggle));
                Ok(Effect::Send(Command::TogglePostLike { post_id }))
            }
            BoardEvent::LikeConfirmed { post_id } => {
                self.settle(&PendingKey::post(Action::LikePost, post_id));
                Ok(Effect::Refetch)
            }
            BoardEvent::LikeFailed { post_id, reason } => {
                warn!("like on {post_id} failed: {reason}");
                let undo = self.settle(&PendingKey::post(Action::LikePost, &post_id));
                if let (Some(Undo::PostLike(toggle)), Some(viewer)) = (undo, self.viewer.clone()) {
                    if let Ok(post) = self.post_mut(&post_id) {
                        toggle.revert(post, &viewer);
                    }
                }
                Ok(Effect::None)
            }

            BoardEvent::CommentLikeRequested {
                post_id,
                comment_id,
            } => {
                let key = PendingKey::comment(Action::LikeComment, &post_id, &comment_id);
                self.guard(&key)?;
                if self.liked_comments.contains(&comment_id) {
                    return Err(BoardErr::AlreadyLiked);
                }
                let viewer = self.viewer.clone();
                let comment = self
                    .post_mut(&post_id)?
                    .comment_mut(&comment_id)
                    .ok_or_else(|| BoardErr::UnknownComment(comment_id.clone()))?;
                if let Some(viewer) = &viewer {
                    if comment.likes.contains(viewer) {
                        return Err(BoardErr::AlreadyLiked);
                    }
                }
                if !comment.likes.add(viewer.as_deref()) {
                    return Err(BoardErr::NotLoggedIn);
                }
                self.pending.insert(key, Undo::CommentLike);
                Ok(Effect::Send(Command::LikeComment {
                    post_id,
                    comment_id,
                }))
            }
            BoardEvent::CommentLikeConfirmed {
                post_id,
                comment_id,
            } => {
                self.settle(&PendingKey::comment(
                    Action::LikeComment,
                    post_id,
                    &comment_id,
                ));
                self.liked_comments.insert(comment_id);
                Ok(Effect::PersistLikedComments)
            }
            BoardEvent::CommentLikeFailed {
                post_id,
                comment_id,
                reason,
            } => {
                warn!("like on comment {comment_id} failed: {reason}");
                let undo = self.settle(&PendingKey::comment(
                    Action::LikeComment,
                    &post_id,
                    &comment_id,
                ));
                if undo == Some(Undo::CommentLike) {
                    let viewer = self.viewer.clone();
                    if let Some(comment) = self
                        .post_mut(&post_id)
                        .ok()
                        .and_then(|post| post.comment_mut(&comment_id))
                    {
                        comment.likes.remove(viewer.as_deref());
                    }
                }
                Ok(Effect::None)
            }

            BoardEvent::CommentAddRequested { post_id } => {
                self.require_viewer()?;
                let key = PendingKey::post(Action::AddComment, &post_id);
                self.guard(&key)?;
                self.post_mut(&post_id)?;
                let content =
                    proccess_comment(self.draft(&post_id)).map_err(BoardErr::InvalidComment)?;
                self.pending.insert(key, Undo::Nothing);
                Ok(Effect::Send(Command::AddComment { post_id, content }))
            }
            BoardEvent::CommentAddConfirmed { post_id } => {
                self.settle(&PendingKey::post(Action::AddComment, &post_id));
                self.drafts.remove(&post_id);
                Ok(Effect::Refetch)
            }
            BoardEvent::CommentAddFailed { post_id, reason } => {
                warn!("comment on {post_id} failed: {reason}");
                self.settle(&PendingKey::post(Action::AddComment, post_id));
                Ok(Effect::None)
            }

            BoardEvent::CommentDeleteRequested {
                post_id,
                comment_id,
            } => {
                self.require_viewer()?;
                let key = PendingKey::comment(Action::DeleteComment, &post_id, &comment_id);
                self.guard(&key)?;
                if self.comment(&post_id, &comment_id).is_none() {
                    self.post_mut(&post_id)?;
                    return Err(BoardErr::UnknownComment(comment_id));
                }
                if !self.can_delete_comment(&post_id, &comment_id) {
                    return Err(BoardErr::NotOwner);
                }
                self.pending.insert(key, Undo::Nothing);
                Ok(Effect::Send(Command::DeleteComment {
                    post_id,
                    comment_id,
                }))
            }
            BoardEvent::CommentDeleteConfirmed {
                post_id,
                comment_id,
            } => {
                self.settle(&PendingKey::comment(
                    Action::DeleteComment,
                    &post_id,
                    &comment_id,
                ));
                if let Ok(post) = self.post_mut(&post_id) {
                    post.comments.retain(|comment| comment.id != comment_id);
                }
                Ok(Effect::Refetch)
            }
            BoardEvent::CommentDeleteFailed {
                post_id,
                comment_id,
                reason,
            } => {
                warn!("deleting comment {comment_id} failed: {reason}");
                self.settle(&PendingKey::comment(
                    Action::DeleteComment,
                    post_id,
                    comment_id,
                ));
                Ok(Effect::None)
            }

            BoardEvent::PostAddRequested {
                content,
                is_anonymous,
            } => {
                self.require_viewer()?;
                let college = self.college_id.clone().ok_or(BoardErr::UnknownCollege)?;
                let key = PendingKey::new_post();
                self.guard(&key)?;
                let content = proccess_post_content(content).map_err(BoardErr::InvalidPost)?;
                self.pending.insert(key, Undo::Nothing);
                Ok(Effect::Send(Command::AddPost(NewPost {
                    content,
                    is_anonymous,
                    college,
                })))
            }
            BoardEvent::PostAddConfirmed => {
                self.settle(&PendingKey::new_post());
                Ok(Effect::Refetch)
            }
            BoardEvent::PostAddFailed { reason } => {
                warn!("new post failed: {reason}");
                self.settle(&PendingKey::new_post());
                Ok(Effect::None)
            }

            BoardEvent::PostEditRequested { post_id, content } => {
                self.require_viewer()?;
                let key = PendingKey::post(Action::EditPost, &post_id);
                self.guard(&key)?;
                self.post_mut(&post_id)?;
                if !self.can_edit_post(&post_id) {
                    return Err(BoardErr::NotOwner);
                }
                let content = proccess_post_content(content).map_err(BoardErr::InvalidPost)?;
                self.pending.insert(key, Undo::Nothing);
                Ok(Effect::Send(Command::EditPost { post_id, content }))
            }
            BoardEvent::PostEditConfirmed { post_id } => {
                self.settle(&PendingKey::post(Action::EditPost, post_id));
                Ok(Effect::Refetch)
            }
            BoardEvent::PostEditFailed { post_id, reason } => {
                warn!("editing {post_id} failed: {reason}");
                self.settle(&PendingKey::post(Action::EditPost, post_id));
                Ok(Effect::None)
            }

            BoardEvent::PostDeleteRequested { post_id } => {
                self.require_viewer()?;
                let key = PendingKey::post(Action::DeletePost, &post_id);
                self.guard(&key)?;
                self.post_mut(&post_id)?;
                if !self.can_delete_post(&post_id) {
                    return Err(BoardErr::NotOwner);
                }
                self.pending.insert(key, Undo::Nothing);
                Ok(Effect::Send(Command::DeletePost { post_id }))
            }
            BoardEvent::PostDeleteConfirmed { post_id } => {
                self.settle(&PendingKey::post(Action::DeletePost, &post_id));
                self.posts.retain(|post| post.id != post_id);
                Ok(Effect::Refetch)
            }
            BoardEvent::PostDeleteFailed { post_id, reason } => {
                warn!("deleting {post_id} failed: {reason}");
                self.settle(&PendingKey::post(Action::DeletePost, post_id));
                Ok(Effect::None)
            }
        }
    }
}

#[cfg(test)]
mod board_tests {
    use super::*;
    use crate::model::CommentLikes;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_log::test;

    fn posts() -> Vec<Post> {
        serde_json::from_value(json!([
            {
                "_id": "p1",
                "author": { "_id": "u1", "username": "rafey" },
                "content": "<p>first</p>",
                "college": { "_id": "c1", "name": "Integral University" },
                "comments": [
                    {
                        "_id": "k1",
                        "author": { "_id": "u2", "username": "sahar" },
                        "content": "hi",
                        "likes": 0
                    },
                    {
                        "_id": "k2",
                        "author": { "_id": "u1", "username": "rafey" },
                        "content": "yo",
                        "likes": 2
                    }
                ],
                "likes": ["u3"]
            },
            {
                "_id": "p2",
                "author": "u2",
                "content": "<p>other college</p>",
                "college": "c2"
            },
            {
                "_id": "p3",
                "author": "u2",
                "content": "<p>second</p>",
                "isAnonymous": true,
                "college": "c1"
            }
        ]))
        .unwrap()
    }

    fn board(viewer: Option<&str>) -> Board {
        let mut board = Board::new(
            viewer.map(String::from),
            Some("c1".into()),
            LikedComments::default(),
        );
        board.reduce(BoardEvent::Loaded(posts())).unwrap();
        board
    }

    fn send(effect: Effect) -> Command {
        match effect {
            Effect::Send(command) => command,
            effect => panic!("expected a command, received {effect:?}"),
        }
    }

    fn like_post(post_id: &str) -> BoardEvent {
        BoardEvent::LikeRequested {
            post_id: post_id.into(),
        }
    }

    fn like_comment(post_id: &str, comment_id: &str) -> BoardEvent {
        BoardEvent::CommentLikeRequested {
            post_id: post_id.into(),
            comment_id: comment_id.into(),
        }
    }

    fn delete_comment(post_id: &str, comment_id: &str) -> BoardEvent {
        BoardEvent::CommentDeleteRequested {
            post_id: post_id.into(),
            comment_id: comment_id.into(),
        }
    }

    fn comment_likes(board: &Board, post_id: &str, comment_id: &str) -> u64 {
        board
            .post(post_id)
            .and_then(|post| post.comment(comment_id))
            .map(|comment| comment.likes.count())
            .unwrap_or_default()
    }

    #[test]
    fn test_loaded_is_scoped_and_latest_first() {
        let board = board(None);
        let ids = board
            .posts()
            .iter()
            .map(|p| p.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["p3", "p1"]);
        let comments = board
            .post("p1")
            .unwrap()
            .comments
            .iter()
            .map(|c| c.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(comments, vec!["k1", "k2"]);
    }

    #[test]
    fn test_unscoped_board_keeps_order() {
        let mut board = Board::new(Some("u1".into()), None, LikedComments::default());
        board.reduce(BoardEvent::Loaded(posts())).unwrap();
        assert_eq!(board.posts().len(), 3);
        assert_eq!(board.posts()[0].id, "p1");
    }

    #[test]
    fn test_like_twice_restores_likers() {
        let mut board = board(Some("u1"));
        let original = board.post("p1").unwrap().likes.clone();

        for _ in 0..2 {
            let command = send(board.reduce(like_post("p1")).unwrap());
            assert!(board.is_pending(&command.key()));
            assert_eq!(board.reduce(command.confirmed()).unwrap(), Effect::Refetch);
        }

        assert_eq!(board.post("p1").unwrap().likes, original);
        assert!(!board.is_pending(&PendingKey::post(Action::LikePost, "p1")));
    }

    #[test]
    fn test_like_is_optimistic_and_reverted_on_failure() {
        let mut board = board(Some("u1"));
        let command = send(board.reduce(like_post("p3")).unwrap());
        assert_eq!(
            command,
            Command::TogglePostLike {
                post_id: "p3".into()
            }
        );
        assert!(board.is_post_liked("p3"));
        assert_eq!(board.post("p3").unwrap().likes.len(), 1);

        assert_eq!(
            board.reduce(like_post("p3")),
            Err(BoardErr::InFlight(Action::LikePost))
        );

        assert_eq!(board.reduce(command.failed("offline")).unwrap(), Effect::None);
        assert!(!board.is_post_liked("p3"));
        assert!(board.post("p3").unwrap().likes.is_empty());
    }

    #[test]
    fn test_like_requires_viewer() {
        let mut board = board(None);
        assert_eq!(board.reduce(like_post("p1")), Err(BoardErr::NotLoggedIn));
        let mut board = self::board(Some("u1"));
        assert_eq!(
            board.reduce(like_post("nope")),
            Err(BoardErr::UnknownPost("nope".into()))
        );
    }

    #[test]
    fn test_post_like_failure_after_reload_keeps_server_likers() {
        let mut board = board(Some("u1"));
        let command = send(board.reduce(like_post("p1")).unwrap());
        assert!(board.is_post_liked("p1"));

        board.reduce(BoardEvent::Loaded(posts())).unwrap();
        board.reduce(command.failed("offline")).unwrap();
        assert_eq!(board.post("p1").unwrap().likes.len(), 1);
        assert!(!board.is_post_liked("p1"));
        assert!(!board.is_pending(&PendingKey::post(Action::LikePost, "p1")));
    }

    #[test]
    fn test_comment_like_guarded_by_hint_set() {
        let mut board = board(Some("u1"));
        let command = send(board.reduce(like_comment("p1", "k1")).unwrap());
        assert_eq!(comment_likes(&board, "p1", "k1"), 1);
        assert_eq!(
            board.reduce(command.confirmed()).unwrap(),
            Effect::PersistLikedComments
        );
        assert!(board.liked_comments().contains("k1"));
        assert!(board.is_comment_liked("p1", "k1"));

        assert_eq!(
            board.reduce(like_comment("p1", "k1")),
            Err(BoardErr::AlreadyLiked)
        );
        assert_eq!(comment_likes(&board, "p1", "k1"), 1);
    }

    #[test]
    fn test_comment_like_from_stored_hints() {
        let mut board = Board::new(
            None,
            Some("c1".into()),
            LikedComments::from_json(r#"["k2"]"#),
        );
        board.reduce(BoardEvent::Loaded(posts())).unwrap();
        assert!(board.is_comment_liked("p1", "k2"));
        assert_eq!(
            board.reduce(like_comment("p1", "k2")),
            Err(BoardErr::AlreadyLiked)
        );
    }

    #[test]
    fn test_comment_like_failure_decrements() {
        let mut board = board(None);
        let command = send(board.reduce(like_comment("p1", "k2")).unwrap());
        assert_eq!(comment_likes(&board, "p1", "k2"), 3);
        board.reduce(command.failed("500")).unwrap();
        assert_eq!(comment_likes(&board, "p1", "k2"), 2);
        assert!(!board.liked_comments().contains("k2"));
    }

    #[test]
    fn test_comment_like_failure_after_reload_keeps_server_count() {
        let mut board = board(None);
        let command = send(board.reduce(like_comment("p1", "k2")).unwrap());
        assert_eq!(comment_likes(&board, "p1", "k2"), 3);

        board.reduce(BoardEvent::Loaded(posts())).unwrap();
        assert_eq!(comment_likes(&board, "p1", "k2"), 2);
        assert!(board.is_pending(&command.key()));

        assert_eq!(board.reduce(command.failed("500")).unwrap(), Effect::None);
        assert_eq!(comment_likes(&board, "p1", "k2"), 2);
        assert!(!board.is_pending(&PendingKey::comment(Action::LikeComment, "p1", "k2")));
    }

    #[test]
    fn test_comment_like_with_liker_set() {
        let mut board = board(Some("u1"));
        board
            .post_mut("p1")
            .unwrap()
            .comment_mut("k1")
            .unwrap()
            .likes = CommentLikes::Likers(["u1".to_string()].into_iter().collect());
        assert!(board.is_comment_liked("p1", "k1"));
        assert_eq!(
            board.reduce(like_comment("p1", "k1")),
            Err(BoardErr::AlreadyLiked)
        );
    }

    #[test]
    fn test_whitespace_comment_sends_nothing() {
        let mut board = board(Some("u1"));
        board
            .reduce(BoardEvent::DraftChanged {
                post_id: "p1".into(),
                text: "   \n ".into(),
            })
            .unwrap();
        assert!(matches!(
            board.reduce(BoardEvent::CommentAddRequested {
                post_id: "p1".into()
            }),
            Err(BoardErr::InvalidComment(_))
        ));
        assert!(!board.is_pending(&PendingKey::post(Action::AddComment, "p1")));
    }

    #[test]
    fn test_comment_add_clears_draft_only_on_success() {
        let mut board = board(Some("u1"));
        let add = || BoardEvent::CommentAddRequested {
            post_id: "p1".into(),
        };
        board
            .reduce(BoardEvent::DraftChanged {
                post_id: "p1".into(),
                text: " great post ".into(),
            })
            .unwrap();
        let command = send(board.reduce(add()).unwrap());
        assert_eq!(
            command,
            Command::AddComment {
                post_id: "p1".into(),
                content: "great post".into()
            }
        );
        board.reduce(command.clone().failed("offline")).unwrap();
        assert_eq!(board.draft("p1"), " great post ");

        let command = send(board.reduce(add()).unwrap());
        assert_eq!(board.reduce(command.confirmed()).unwrap(), Effect::Refetch);
        assert_eq!(board.draft("p1"), "");
    }

    #[test]
    fn test_comment_delete_owner_only() {
        let mut board = board(Some("u1"));
        assert!(board.can_delete_comment("p1", "k2"));
        assert!(!board.can_delete_comment("p1", "k1"));
        assert_eq!(
            board.reduce(delete_comment("p1", "k1")),
            Err(BoardErr::NotOwner)
        );

        let command = send(board.reduce(delete_comment("p1", "k2")).unwrap());
        assert!(board.is_pending(&PendingKey::comment(Action::DeleteComment, "p1", "k2")));
        assert!(!board.is_pending(&PendingKey::comment(Action::DeleteComment, "p1", "k1")));
        assert_eq!(board.reduce(command.confirmed()).unwrap(), Effect::Refetch);
        assert!(board.post("p1").unwrap().comment("k2").is_none());
    }

    #[test]
    fn test_post_add_edit_delete() {
        let mut board = board(Some("u1"));
        assert!(matches!(
            board.reduce(BoardEvent::PostAddRequested {
                content: " ".into(),
                is_anonymous: false
            }),
            Err(BoardErr::InvalidPost(_))
        ));
        let command = send(
            board
                .reduce(BoardEvent::PostAddRequested {
                    content: "<p>hey</p>".into(),
                    is_anonymous: true,
                })
                .unwrap(),
        );
        assert_eq!(
            command,
            Command::AddPost(NewPost {
                content: "<p>hey</p>".into(),
                is_anonymous: true,
                college: "c1".into()
            })
        );
        board.reduce(command.confirmed()).unwrap();

        assert!(board.can_edit_post("p1"));
        assert!(!board.can_delete_post("p3"));
        assert_eq!(
            board.reduce(BoardEvent::PostEditRequested {
                post_id: "p3".into(),
                content: "x".into()
            }),
            Err(BoardErr::NotOwner)
        );
        let command = send(
            board
                .reduce(BoardEvent::PostEditRequested {
                    post_id: "p1".into(),
                    content: "edited".into(),
                })
                .unwrap(),
        );
        board.reduce(command.confirmed()).unwrap();

        let command = send(
            board
                .reduce(BoardEvent::PostDeleteRequested {
                    post_id: "p1".into(),
                })
                .unwrap(),
        );
        board.reduce(command.confirmed()).unwrap();
        assert!(board.post("p1").is_none());
    }

    #[test]
    fn test_post_add_needs_college() {
        let mut board = Board::new(Some("u1".into()), None, LikedComments::default());
        assert_eq!(
            board.reduce(BoardEvent::PostAddRequested {
                content: "x".into(),
                is_anonymous: false
            }),
            Err(BoardErr::UnknownCollege)
        );
    }

    #[test]
    fn test_liked_comments_storage() {
        let mut liked = LikedComments::from_json("not json");
        assert!(liked.is_empty());
        liked.insert("k1");
        liked.insert("k1");
        assert_eq!(liked.len(), 1);
        assert_eq!(liked.to_json(), r#"["k1"]"#);
    }

    #[test]
    fn test_like_toggle_on_notes() {
        let mut note: crate::model::SubjectNote = serde_json::from_value(json!({
            "_id": "n1",
            "title": "Unit 1",
            "fileUrl": "https://x/n1.pdf",
            "likes": []
        }))
        .unwrap();
        let toggle = LikeToggle::apply(&mut note, "u1");
        assert!(toggle.liked);
        assert!(note.is_liked_by("u1"));
        toggle.revert(&mut note, "u1");
        assert!(!note.is_liked_by("u1"));
    }
}
