use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Json, Path, Request, State};
use axum::http::header::{CONTENT_TYPE, COOKIE, HOST};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum_test::TestServer;
use campus_shared::interaction::{
    Action, Board, BoardErr, BoardEvent, Effect, LikedComments, PendingKey,
};
use campus_shared::model::{Comment, CommentLikes, Post, Ref};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use test_log::test;
use tracing::trace;

use crate::upload::{NoteUpload, UploadErr, upload_note_at, validate_upload};
use crate::{
    API_KEY_HEADER, Api, ApiConfig, ApiNative, ClientErr, DriveErr, ServerErr, ServerRes,
    drive_board,
};

const API_KEY: &str = "test-key";
const STORAGE_BASE: &str = "https://bucket.example";

#[derive(Debug, Clone, PartialEq)]
struct StoredUpload {
    key: String,
    content_type: String,
    had_api_key: bool,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct Mock {
    posts: Vec<Post>,
    notes: Vec<Value>,
    upload: Option<StoredUpload>,
    hits: usize,
    next_id: usize,
}

type MockState = Arc<Mutex<Mock>>;

impl Mock {
    fn seeded() -> Self {
        let posts = serde_json::from_value(json!([
            {
                "_id": "p1",
                "author": { "_id": "u1", "username": "rafey" },
                "content": "<p>first</p>",
                "college": { "_id": "c1", "name": "Integral University" },
                "comments": [
                    {
                        "_id": "k1",
                        "author": { "_id": "u1", "username": "rafey" },
                        "content": "mine",
                        "likes": 0
                    },
                    {
                        "_id": "k2",
                        "author": { "_id": "u2", "username": "sahar" },
                        "content": "theirs",
                        "likes": 4
                    }
                ],
                "likes": []
            },
            {
                "_id": "p2",
                "author": "u2",
                "content": "<p>elsewhere</p>",
                "college": "c2"
            }
        ]))
        .unwrap();

        Self {
            posts,
            ..Default::default()
        }
    }
}

fn viewer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(COOKIE)?
        .to_str()
        .ok()?
        .strip_prefix("session=")
        .map(String::from)
}

fn reply(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

async fn count_and_check_key(State(mock): State<MockState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let has_key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        == Some(API_KEY);
    mock.lock().unwrap().hits += 1;
    trace!("MOCK RECV {} {path}", req.method());
    if path.starts_with("/api") && !has_key {
        return reply(StatusCode::UNAUTHORIZED, "missing api key");
    }
    next.run(req).await
}

async fn list_posts(State(mock): State<MockState>) -> Json<Vec<Post>> {
    Json(mock.lock().unwrap().posts.clone())
}

async fn toggle_post_like(
    State(mock): State<MockState>,
    Path(post_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(viewer) = viewer(&headers) else {
        return reply(StatusCode::UNAUTHORIZED, "please log in");
    };
    let mut mock = mock.lock().unwrap();
    let Some(post) = mock.posts.iter_mut().find(|post| post.id == post_id) else {
        return reply(StatusCode::NOT_FOUND, "post not found");
    };
    if !post.likes.shift_remove(&viewer) {
        post.likes.insert(viewer);
    }
    reply(StatusCode::OK, "Post liked/unliked")
}

async fn add_comment(
    State(mock): State<MockState>,
    Path(post_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(viewer) = viewer(&headers) else {
        return reply(StatusCode::UNAUTHORIZED, "please log in");
    };
    let mut mock = mock.lock().unwrap();
    mock.next_id += 1;
    let id = format!("k-new-{}", mock.next_id);
    let Some(post) = mock.posts.iter_mut().find(|post| post.id == post_id) else {
        return reply(StatusCode::NOT_FOUND, "post not found");
    };
    post.comments.push(Comment {
        id,
        author: Ref::Id(viewer),
        content: body["content"].as_str().unwrap_or_default().to_string(),
        likes: CommentLikes::default(),
        created_at: None,
    });
    reply(StatusCode::CREATED, "Comment added")
}

async fn delete_comment(
    State(mock): State<MockState>,
    Path((post_id, comment_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let viewer = viewer(&headers);
    let mut mock = mock.lock().unwrap();
    let Some(post) = mock.posts.iter_mut().find(|post| post.id == post_id) else {
        return reply(StatusCode::NOT_FOUND, "post not found");
    };
    let Some(comment) = post.comment(&comment_id) else {
        return reply(StatusCode::NOT_FOUND, "comment not found");
    };
    if Some(comment.author.id()) != viewer.as_deref() {
        return reply(StatusCode::FORBIDDEN, "not your comment");
    }
    post.comments.retain(|comment| comment.id != comment_id);
    reply(StatusCode::OK, "Comment deleted")
}

async fn get_colleges() -> Json<Value> {
    Json(json!({ "success": false, "message": "under maintenance" }))
}

async fn get_pyqs() -> Response {
    reply(StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn get_note(Path(slug): Path<String>) -> Json<Value> {
    Json(json!({
        "note": {
            "_id": "n1",
            "title": "Unit 1",
            "slug": slug,
            "fileUrl": "https://bucket.example/ss-notes/unit-1.pdf",
            "likes": ["u2"]
        }
    }))
}

async fn presigned_url(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let key = body["fileName"].as_str().unwrap_or_default().to_string();
    Json(json!({
        "uploadUrl": format!("http://{host}/storage/{key}"),
        "key": key,
    }))
}

async fn storage_put(
    State(mock): State<MockState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    bytes: Bytes,
) -> StatusCode {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    mock.lock().unwrap().upload = Some(StoredUpload {
        key,
        content_type,
        had_api_key: headers.contains_key(API_KEY_HEADER),
        bytes: bytes.to_vec(),
    });
    StatusCode::OK
}

async fn add_note(State(mock): State<MockState>, Json(body): Json<Value>) -> Json<Value> {
    mock.lock().unwrap().notes.push(body);
    Json(json!({ "success": true, "message": "Note added" }))
}

fn mock_router(mock: MockState) -> Router {
    Router::new()
        .route("/api/community", get(list_posts))
        .route("/api/community/{id}/like", post(toggle_post_like))
        .route("/api/community/{id}/comments", post(add_comment))
        .route("/api/community/{id}/comments/{cid}", delete(delete_comment))
        .route("/api/colleges", get(get_colleges))
        .route("/api/pyqs", get(get_pyqs))
        .route("/api/subjectNotes", post(add_note))
        .route("/api/subjectNotes/{slug}", get(get_note))
        .route("/api/presignedUrl", post(presigned_url))
        .route("/storage/{*key}", put(storage_put))
        .layer(middleware::from_fn_with_state(
            mock.clone(),
            count_and_check_key,
        ))
        .with_state(mock)
}

struct MockApp {
    mock: MockState,
    api: ApiNative,
    _server: TestServer,
}

impl MockApp {
    fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .event_format(
                tracing_subscriber::fmt::format()
                    .with_file(true)
                    .with_line_number(true),
            )
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();

        let mock = Arc::new(Mutex::new(Mock::seeded()));
        let server = TestServer::builder()
            .http_transport()
            .build(mock_router(mock.clone()))
            .unwrap();
        let origin = server
            .server_address()
            .unwrap()
            .to_string()
            .trim_end_matches('/')
            .to_string();
        let api = ApiNative::new(ApiConfig {
            origin,
            api_key: API_KEY.to_string(),
            storage_base: STORAGE_BASE.to_string(),
        });

        Self {
            mock,
            api,
            _server: server,
        }
    }

    fn hits(&self) -> usize {
        self.mock.lock().unwrap().hits
    }

    async fn board(&self, viewer: Option<&str>) -> Board {
        let mut board = Board::new(
            viewer.map(String::from),
            Some("c1".to_string()),
            LikedComments::default(),
        );
        let Ok(ServerRes::Posts(posts)) = self.api.get_posts().send_native().await else {
            panic!("failed to load posts");
        };
        board.reduce(BoardEvent::Loaded(posts)).unwrap();
        board
    }
}

#[test(tokio::test)]
async fn test_like_post_end_to_end() {
    let app = MockApp::new();
    let mut board = app.board(Some("u1")).await;
    assert_eq!(board.post("p1").unwrap().likes.len(), 0);

    let Effect::Send(command) = board
        .reduce(BoardEvent::LikeRequested {
            post_id: "p1".into(),
        })
        .unwrap()
    else {
        panic!("expected a command");
    };
    assert_eq!(board.post("p1").unwrap().likes.len(), 1);
    assert!(board.is_pending(&PendingKey::post(Action::LikePost, "p1")));

    let result = app
        .api
        .command(&command)
        .send_native_with_session("session=u1")
        .await;
    assert_eq!(
        result,
        Ok(ServerRes::Done {
            message: Some("Post liked/unliked".into())
        })
    );
    assert_eq!(board.reduce(command.confirmed()).unwrap(), Effect::Refetch);

    let Ok(ServerRes::Posts(posts)) = app.api.get_posts().send_native().await else {
        panic!("failed to refetch");
    };
    board.reduce(BoardEvent::Loaded(posts)).unwrap();
    let post = board.post("p1").unwrap();
    assert_eq!(post.likes.len(), 1);
    assert!(post.likes.contains("u1"));
    assert!(!board.is_pending(&PendingKey::post(Action::LikePost, "p1")));
}

#[test(tokio::test)]
async fn test_failed_like_is_reverted() {
    let app = MockApp::new();
    let mut board = app.board(Some("u1")).await;

    let result = drive_board(
        &app.api,
        &mut board,
        BoardEvent::LikeRequested {
            post_id: "p1".into(),
        },
        None,
    )
    .await;

    assert!(matches!(
        result,
        Err(DriveErr::Server(ServerErr::Status { status: 401, .. }))
    ));
    assert_eq!(board.post("p1").unwrap().likes.len(), 0);
    assert!(app.mock.lock().unwrap().posts[0].likes.is_empty());
}

#[test(tokio::test)]
async fn test_delete_own_comment() {
    let app = MockApp::new();
    let mut board = app.board(Some("u1")).await;
    assert!(board.can_delete_comment("p1", "k1"));
    assert!(!board.can_delete_comment("p1", "k2"));

    drive_board(
        &app.api,
        &mut board,
        BoardEvent::CommentDeleteRequested {
            post_id: "p1".into(),
            comment_id: "k1".into(),
        },
        Some("session=u1"),
    )
    .await
    .unwrap();

    let post = board.post("p1").unwrap();
    assert!(post.comment("k1").is_none());
    assert_eq!(post.comments.len(), 1);

    let hits = app.hits();
    let result = drive_board(
        &app.api,
        &mut board,
        BoardEvent::CommentDeleteRequested {
            post_id: "p1".into(),
            comment_id: "k2".into(),
        },
        Some("session=u1"),
    )
    .await;
    assert_eq!(result, Err(DriveErr::Board(BoardErr::NotOwner)));
    assert_eq!(app.hits(), hits);
}

#[test(tokio::test)]
async fn test_comment_add_and_whitespace() {
    let app = MockApp::new();
    let mut board = app.board(Some("u2")).await;

    board
        .reduce(BoardEvent::DraftChanged {
            post_id: "p1".into(),
            text: "  \n ".into(),
        })
        .unwrap();
    let hits = app.hits();
    let result = drive_board(
        &app.api,
        &mut board,
        BoardEvent::CommentAddRequested {
            post_id: "p1".into(),
        },
        Some("session=u2"),
    )
    .await;
    assert!(matches!(
        result,
        Err(DriveErr::Board(BoardErr::InvalidComment(_)))
    ));
    assert_eq!(app.hits(), hits);

    board
        .reduce(BoardEvent::DraftChanged {
            post_id: "p1".into(),
            text: "nice notes".into(),
        })
        .unwrap();
    drive_board(
        &app.api,
        &mut board,
        BoardEvent::CommentAddRequested {
            post_id: "p1".into(),
        },
        Some("session=u2"),
    )
    .await
    .unwrap();

    let post = board.post("p1").unwrap();
    assert_eq!(post.latest_comment().map(|c| c.content.as_str()), Some("nice notes"));
    assert_eq!(board.draft("p1"), "");
}

#[test(tokio::test)]
async fn test_response_normalization() {
    let app = MockApp::new();

    assert_eq!(
        app.api.get_colleges().send_native().await,
        Err(ServerErr::Rejected("under maintenance".into()))
    );
    assert_eq!(
        app.api.get_pyqs().send_native().await,
        Err(ServerErr::Status {
            status: 500,
            message: "boom".into()
        })
    );

    let Ok(ServerRes::Note(note)) = app.api.get_note("unit-1").send_native().await else {
        panic!("expected a note");
    };
    assert_eq!(note.slug, "unit-1");
    assert_eq!(note.likes.len(), 1);

    let keyless = ApiNative::new(ApiConfig {
        api_key: "wrong".into(),
        ..app.api.config.clone()
    });
    assert!(matches!(
        keyless.get_posts().send_native().await,
        Err(ServerErr::Status { status: 401, .. })
    ));
}

#[test(tokio::test)]
async fn test_unreachable_backend() {
    let api = ApiNative::new(ApiConfig {
        origin: "http://127.0.0.1:9".into(),
        api_key: API_KEY.into(),
        storage_base: STORAGE_BASE.into(),
    });
    assert!(matches!(
        api.get_posts().send_native().await,
        Err(ServerErr::ClientErr(ClientErr::ClientSendErr(_)))
    ));
}

fn note_upload(mime: &str, bytes: Vec<u8>) -> NoteUpload {
    NoteUpload {
        title: "unit-1".into(),
        description: " first unit ".into(),
        subject_code: "CS601".into(),
        branch_code: "CSE".into(),
        college: "c1".into(),
        file_name: "unit1.pdf".into(),
        mime: mime.into(),
        bytes,
    }
}

#[test(tokio::test)]
async fn test_upload_rejected_before_network() {
    let app = MockApp::new();

    let result = upload_note_at(&app.api, note_upload("image/png", vec![1, 2, 3]), 1).await;
    assert!(matches!(
        result,
        Err(ServerErr::UploadErr(UploadErr::Invalid(_)))
    ));

    let result = upload_note_at(
        &app.api,
        NoteUpload {
            title: "   ".into(),
            ..note_upload("application/pdf", vec![1])
        },
        1,
    )
    .await;
    assert!(matches!(
        result,
        Err(ServerErr::UploadErr(UploadErr::Invalid(_)))
    ));

    assert!(validate_upload("big.pdf", "application/pdf", 50 * 1024 * 1024 + 1).is_err());
    assert_eq!(app.hits(), 0);
}

#[test(tokio::test)]
async fn test_upload_three_phases() {
    let app = MockApp::new();
    let bytes = b"%PDF-1.4 notes".to_vec();

    let result = upload_note_at(
        &app.api,
        note_upload("application/pdf", bytes.clone()),
        1_700_000_000_000,
    )
    .await;
    assert_eq!(
        result,
        Ok(ServerRes::Done {
            message: Some("Note added".into())
        })
    );

    let mock = app.mock.lock().unwrap();
    assert_eq!(mock.hits, 3);
    assert_eq!(
        mock.upload,
        Some(StoredUpload {
            key: "ss-notes/unit-1-1700000000000.pdf".into(),
            content_type: "application/pdf".into(),
            had_api_key: false,
            bytes,
        })
    );
    assert_eq!(
        mock.notes,
        vec![json!({
            "title": "unit-1",
            "description": "first unit",
            "subjectCode": "CS601",
            "branchCode": "CSE",
            "college": "c1",
            "fileUrl": "https://bucket.example/ss-notes/unit-1-1700000000000.pdf",
        })]
    );
}
