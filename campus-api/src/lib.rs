use campus_shared::interaction::{Board, BoardErr, BoardEvent, Command, Effect};
use campus_shared::model::{
    Branch, College, Course, NewComment, NewPost, EditPost, NoteMeta, Opportunity, OpportunityForm,
    OpportunityKind, Post, PresignRequest, PresignedUrl, Pyq, Senior, SeniorForm, Subject,
    SubjectNote,
};
use campus_shared::path::*;
use leptos::prelude::*;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, trace, warn};
use wasm_bindgen_futures::spawn_local;

pub mod upload;

#[cfg(test)]
mod tests;

pub use upload::UploadErr;

pub const API_KEY_HEADER: &str = "x-api-key";

const DEFAULT_ORIGIN: &str = "http://localhost:5000";
const DEFAULT_API_KEY: &str = "";
const DEFAULT_STORAGE_BASE: &str = "https://studentsenior.s3.ap-south-1.amazonaws.com";

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub origin: String,
    pub api_key: String,
    /// Public base url of the object storage, uploaded keys are appended to it.
    pub storage_base: String,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self {
            origin: option_env!("CAMPUS_API_ORIGIN")
                .unwrap_or(DEFAULT_ORIGIN)
                .trim_end_matches('/')
                .to_string(),
            api_key: option_env!("CAMPUS_API_KEY")
                .unwrap_or(DEFAULT_API_KEY)
                .to_string(),
            storage_base: option_env!("CAMPUS_STORAGE_BASE")
                .unwrap_or(DEFAULT_STORAGE_BASE)
                .trim_end_matches('/')
                .to_string(),
        }
    }

    pub fn file_url(&self, key: impl AsRef<str>) -> String {
        format!("{}/{}", self.storage_base, key.as_ref())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerRes {
    Colleges(Vec<College>),
    Posts(Vec<Post>),
    Post(Post),
    Seniors(Vec<Senior>),
    Notes(Vec<SubjectNote>),
    Note(SubjectNote),
    Opportunities(Vec<Opportunity>),
    Pyqs(Vec<Pyq>),
    Courses(Vec<Course>),
    Branches(Vec<Branch>),
    Subjects(Vec<Subject>),
    PresignedUrl(PresignedUrl),
    Done { message: Option<String> },
}

/// Shape the response body is decoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Expect {
    Colleges,
    Posts,
    Post,
    Seniors,
    Notes,
    Note,
    Opportunities,
    Pyqs,
    Courses,
    Branches,
    Subjects,
    PresignedUrl,
    Done,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServerErr {
    #[error("client err {0}")]
    ClientErr(#[from] ClientErr),

    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Invalid(String),

    #[error("upload err {0}")]
    UploadErr(#[from] UploadErr),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientErr {
    #[error("failed to deserialize res {0}")]
    ClientDesErr(String),

    #[error("failed to send req {0}")]
    ClientSendErr(String),
}

#[derive(serde::Deserialize)]
struct NoteBody {
    note: SubjectNote,
}

pub trait Api {
    fn provide_config(&self) -> ApiConfig;
    fn provide_builder(&self, method: Method, path: impl AsRef<str>) -> RequestBuilder;
    fn provide_signal_result(&self) -> Option<RwSignal<Option<Result<ServerRes, ServerErr>>>> {
        None
    }
    fn provide_signal_busy(&self) -> Option<RwSignal<bool>> {
        None
    }

    fn into_req(&self, method: Method, path: impl AsRef<str>, expect: Expect) -> ApiReq {
        ApiReq::from_api(self, method, path, expect)
    }

    fn into_req_json(
        &self,
        method: Method,
        path: impl AsRef<str>,
        body: &impl Serialize,
        expect: Expect,
    ) -> ApiReq {
        ApiReq::from_api(self, method, path, expect).with_json(body)
    }

    // catalog

    fn get_colleges(&self) -> ApiReq {
        self.into_req(Method::GET, PATH_API_COLLEGES, Expect::Colleges)
    }

    fn get_pyqs(&self) -> ApiReq {
        self.into_req(Method::GET, PATH_API_PYQS, Expect::Pyqs)
    }

    fn get_courses(&self) -> ApiReq {
        self.into_req(Method::GET, PATH_API_COURSES, Expect::Courses)
    }

    fn get_branches(&self, course_id: impl AsRef<str>) -> ApiReq {
        self.into_req(Method::GET, api_branches(course_id.as_ref()), Expect::Branches)
    }

    fn get_subjects(&self, branch_id: impl AsRef<str>) -> ApiReq {
        self.into_req(Method::GET, api_subjects(branch_id.as_ref()), Expect::Subjects)
    }

    // community

    fn get_posts(&self) -> ApiReq {
        self.into_req(Method::GET, PATH_API_COMMUNITY, Expect::Posts)
    }

    fn get_post(&self, post_id: impl AsRef<str>) -> ApiReq {
        self.into_req(Method::GET, api_post(post_id.as_ref()), Expect::Post)
    }

    fn add_post(&self, post: &NewPost) -> ApiReq {
        self.into_req_json(Method::POST, PATH_API_COMMUNITY, post, Expect::Done)
    }

    fn edit_post(&self, post_id: impl AsRef<str>, content: impl Into<String>) -> ApiReq {
        self.into_req_json(
            Method::PUT,
            api_post(post_id.as_ref()),
            &EditPost {
                content: content.into(),
            },
            Expect::Done,
        )
    }

    fn delete_post(&self, post_id: impl AsRef<str>) -> ApiReq {
        self.into_req(Method::DELETE, api_post(post_id.as_ref()), Expect::Done)
    }

    fn toggle_post_like(&self, post_id: impl AsRef<str>) -> ApiReq {
        self.into_req(Method::POST, api_post_like(post_id.as_ref()), Expect::Done)
    }

    fn add_comment(&self, post_id: impl AsRef<str>, content: impl Into<String>) -> ApiReq {
        self.into_req_json(
            Method::POST,
            api_post_comments(post_id.as_ref()),
            &NewComment {
                content: content.into(),
            },
            Expect::Done,
        )
    }

    fn delete_comment(&self, post_id: impl AsRef<str>, comment_id: impl AsRef<str>) -> ApiReq {
        self.into_req(
            Method::DELETE,
            api_post_comment(post_id.as_ref(), comment_id.as_ref()),
            Expect::Done,
        )
    }

    fn like_comment(&self, post_id: impl AsRef<str>, comment_id: impl AsRef<str>) -> ApiReq {
        self.into_req(
            Method::POST,
            api_post_comment_like(post_id.as_ref(), comment_id.as_ref()),
            Expect::Done,
        )
    }

    /// Request that carries out a board command.
    fn command(&self, command: &Command) -> ApiReq {
        match command {
            Command::TogglePostLike { post_id } => self.toggle_post_like(post_id),
            Command::LikeComment {
                post_id,
                comment_id,
            } => self.like_comment(post_id, comment_id),
            Command::AddComment { post_id, content } => self.add_comment(post_id, content),
            Command::DeleteComment {
                post_id,
                comment_id,
            } => self.delete_comment(post_id, comment_id),
            Command::AddPost(post) => self.add_post(post),
            Command::EditPost { post_id, content } => self.edit_post(post_id, content),
            Command::DeletePost { post_id } => self.delete_post(post_id),
        }
    }

    // seniors

    fn get_seniors(&self, college_id: impl AsRef<str>) -> ApiReq {
        self.into_req(Method::GET, api_seniors_of(college_id.as_ref()), Expect::Seniors)
    }

    fn add_senior(&self, senior: &SeniorForm) -> ApiReq {
        self.into_req_json(Method::POST, PATH_API_SENIORS, senior, Expect::Done)
    }

    fn edit_senior(&self, senior_id: impl AsRef<str>, senior: &SeniorForm) -> ApiReq {
        self.into_req_json(
            Method::PUT,
            api_senior(senior_id.as_ref()),
            senior,
            Expect::Done,
        )
    }

    fn delete_senior(&self, senior_id: impl AsRef<str>) -> ApiReq {
        self.into_req(Method::DELETE, api_senior(senior_id.as_ref()), Expect::Done)
    }

    // notes

    fn get_subject_notes(
        &self,
        subject_code: impl AsRef<str>,
        branch_code: impl AsRef<str>,
        college_id: impl AsRef<str>,
    ) -> ApiReq {
        self.into_req(
            Method::GET,
            api_subject_notes_of(
                subject_code.as_ref(),
                branch_code.as_ref(),
                college_id.as_ref(),
            ),
            Expect::Notes,
        )
    }

    fn get_note(&self, slug: impl AsRef<str>) -> ApiReq {
        self.into_req(Method::GET, api_subject_note(slug.as_ref()), Expect::Note)
    }

    fn add_note(&self, note: &NoteMeta) -> ApiReq {
        self.into_req_json(Method::POST, PATH_API_SUBJECT_NOTES, note, Expect::Done)
    }

    fn delete_note(&self, note_id: impl AsRef<str>) -> ApiReq {
        self.into_req(
            Method::DELETE,
            api_subject_note(note_id.as_ref()),
            Expect::Done,
        )
    }

    fn toggle_note_like(&self, note_id: impl AsRef<str>) -> ApiReq {
        self.into_req(
            Method::POST,
            api_subject_note_like(note_id.as_ref()),
            Expect::Done,
        )
    }

    fn get_presigned_url(&self, req: &PresignRequest) -> ApiReq {
        self.into_req_json(Method::POST, PATH_API_PRESIGNED_URL, req, Expect::PresignedUrl)
    }

    // opportunities

    fn get_opportunities(&self, kind: OpportunityKind, college_id: impl AsRef<str>) -> ApiReq {
        self.into_req(
            Method::GET,
            api_opportunities_of(kind, college_id.as_ref()),
            Expect::Opportunities,
        )
    }

    fn add_opportunity(&self, kind: OpportunityKind, form: &OpportunityForm) -> ApiReq {
        self.into_req_json(Method::POST, api_opportunities(kind), form, Expect::Done)
    }

    fn edit_opportunity(
        &self,
        kind: OpportunityKind,
        id: impl AsRef<str>,
        form: &OpportunityForm,
    ) -> ApiReq {
        self.into_req_json(
            Method::PUT,
            api_opportunity(kind, id.as_ref()),
            form,
            Expect::Done,
        )
    }

    fn delete_opportunity(&self, kind: OpportunityKind, id: impl AsRef<str>) -> ApiReq {
        self.into_req(
            Method::DELETE,
            api_opportunity(kind, id.as_ref()),
            Expect::Done,
        )
    }
}

pub struct ApiReq {
    pub builder: RequestBuilder,
    pub body: Option<Value>,
    pub expect: Expect,
    pub result: Option<RwSignal<Option<Result<ServerRes, ServerErr>>>>,
    pub busy: Option<RwSignal<bool>>,
}

impl ApiReq {
    pub fn from_api<A>(api: &A, method: Method, path: impl AsRef<str>, expect: Expect) -> Self
    where
        A: Api + ?Sized,
    {
        let builder = api.provide_builder(method, path.as_ref());
        let result_signal = api.provide_signal_result();
        let busy_signal = api.provide_signal_busy();
        ApiReq {
            builder,
            body: None,
            expect,
            result: result_signal,
            busy: busy_signal,
        }
    }

    pub fn with_json(mut self, body: &impl Serialize) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => self.body = Some(body),
            Err(err) => error!("failed to serialize request body: {err}"),
        }
        self
    }

    pub fn send_web<F, Fut>(self, fut: F)
    where
        F: FnOnce(Result<ServerRes, ServerErr>) -> Fut + 'static,
        Fut: Future<Output = ()>,
    {
        let ApiReq {
            builder,
            body,
            expect,
            result: signal_result,
            busy: signal_busy,
        } = self;
        if let Some(signal_busy) = signal_busy {
            if signal_busy.get_untracked() {
                warn!("trying to send while still pending");
                return;
            }
            signal_busy.set(true);
        }
        spawn_local(async move {
            let result = send(builder, body, expect, None::<&str>).await;
            fut(result.clone()).await;
            if let Some(signal_result) = signal_result {
                signal_result.set(Some(result));
            }
            if let Some(signal_busy) = signal_busy {
                signal_busy.set(false);
            }
        });
    }

    pub async fn send_native(self) -> Result<ServerRes, ServerErr> {
        send(self.builder, self.body, self.expect, None::<&str>).await
    }

    /// Sends with an explicit `Cookie` header, for callers outside the browser cookie jar.
    pub async fn send_native_with_session(
        self,
        session: impl AsRef<str>,
    ) -> Result<ServerRes, ServerErr> {
        send(self.builder, self.body, self.expect, Some(session)).await
    }
}

fn api_builder(config: &ApiConfig, method: Method, path: &str) -> RequestBuilder {
    let url = format!("{}{}{path}", config.origin, PATH_API);
    let builder = reqwest::Client::new()
        .request(method, url)
        .header(API_KEY_HEADER, &config.api_key);

    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            builder.fetch_credentials_include()
        } else {
            builder
        }
    }
}

/// Browser api without signals.
#[derive(Clone, Copy, Default)]
pub struct ApiWebPlain {}

impl Api for ApiWebPlain {
    fn provide_config(&self) -> ApiConfig {
        ApiConfig::from_env()
    }

    fn provide_builder(&self, method: Method, path: impl AsRef<str>) -> RequestBuilder {
        api_builder(&ApiConfig::from_env(), method, path.as_ref())
    }
}

impl ApiWebPlain {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Clone, Debug)]
pub struct ApiNative {
    pub config: ApiConfig,
}

impl Api for ApiNative {
    fn provide_config(&self) -> ApiConfig {
        self.config.clone()
    }

    fn provide_builder(&self, method: Method, path: impl AsRef<str>) -> RequestBuilder {
        api_builder(&self.config, method, path.as_ref())
    }
}

impl ApiNative {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }
}

#[derive(Clone, Copy, Default)]
pub struct ApiWeb {
    pub busy: RwSignal<bool>,
    pub result: RwSignal<Option<Result<ServerRes, ServerErr>>>,
}

impl ApiWeb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_succ_tracked(&self) -> bool {
        self.result
            .with(|v| v.as_ref().map(|v| v.is_ok()).unwrap_or_default())
    }

    pub fn is_pending_tracked(&self) -> bool {
        self.busy.get()
    }

    pub fn is_pending_untracked(&self) -> bool {
        self.busy.get_untracked()
    }
}

impl Api for ApiWeb {
    fn provide_config(&self) -> ApiConfig {
        ApiConfig::from_env()
    }

    fn provide_builder(&self, method: Method, path: impl AsRef<str>) -> RequestBuilder {
        api_builder(&ApiConfig::from_env(), method, path.as_ref())
    }

    fn provide_signal_result(&self) -> Option<RwSignal<Option<Result<ServerRes, ServerErr>>>> {
        Some(self.result)
    }

    fn provide_signal_busy(&self) -> Option<RwSignal<bool>> {
        Some(self.busy)
    }
}

fn parse<T: DeserializeOwned>(value: Value) -> Result<T, ServerErr> {
    serde_json::from_value(value)
        .map_err(|err| ServerErr::from(ClientErr::ClientDesErr(err.to_string())))
}

fn message_of(value: &Value) -> Option<String> {
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(Value::as_str)
        .map(String::from)
}

pub fn decode(expect: Expect, value: Value) -> Result<ServerRes, ServerErr> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = message_of(&value).unwrap_or_else(|| String::from("request was rejected"));
        return Err(ServerErr::Rejected(message));
    }

    let res = match expect {
        Expect::Colleges => ServerRes::Colleges(parse(value)?),
        Expect::Posts => ServerRes::Posts(parse(value)?),
        Expect::Post => ServerRes::Post(parse(value)?),
        Expect::Seniors => ServerRes::Seniors(parse(value)?),
        Expect::Notes => ServerRes::Notes(parse(value)?),
        Expect::Note => ServerRes::Note(parse::<NoteBody>(value)?.note),
        Expect::Opportunities => ServerRes::Opportunities(parse(value)?),
        Expect::Pyqs => ServerRes::Pyqs(parse(value)?),
        Expect::Courses => ServerRes::Courses(parse(value)?),
        Expect::Branches => ServerRes::Branches(parse(value)?),
        Expect::Subjects => ServerRes::Subjects(parse(value)?),
        Expect::PresignedUrl => ServerRes::PresignedUrl(parse(value)?),
        Expect::Done => ServerRes::Done {
            message: message_of(&value),
        },
    };

    Ok(res)
}

pub async fn send(
    mut req_builder: RequestBuilder,
    body: Option<Value>,
    expect: Expect,
    session: Option<impl AsRef<str>>,
) -> Result<ServerRes, ServerErr> {
    debug!("CLIENT SEND:\n{req_builder:?}\n{body:?}");
    if let Some(session) = session {
        req_builder = req_builder.header(http::header::COOKIE, session.as_ref());
    }
    if let Some(body) = &body {
        req_builder = req_builder.json(body);
    }
    let res = req_builder
        .send()
        .await
        .inspect_err(|err| error!("client failed to send {err}"))
        .map_err(|err| ServerErr::from(ClientErr::ClientSendErr(err.to_string())))?;

    let status = res.status();
    let bytes = res
        .bytes()
        .await
        .inspect_err(|err| error!("client byte stream status {status}\nerr: {err}"))
        .map_err(|err| ServerErr::from(ClientErr::ClientDesErr(err.to_string())))?;

    let value = if bytes.is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_slice::<Value>(&bytes)
    };

    if !status.is_success() {
        let message = value
            .as_ref()
            .ok()
            .and_then(message_of)
            .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());
        error!("CLIENT RECV:\nstatus: {status}\n{message}");
        return Err(ServerErr::Status {
            status: status.as_u16(),
            message,
        });
    }

    let value = value
        .map_err(|err| ServerErr::from(ClientErr::ClientDesErr(err.to_string())))
        .inspect_err(|err| error!("CLIENT RECV:\nstatus: {status}\n{err}"))?;
    let body = decode(expect, value);

    debug!("CLIENT RECV:\nstatus: {status}\n{body:?}");

    body
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriveErr {
    #[error("board err {0}")]
    Board(#[from] BoardErr),

    #[error("server err {0}")]
    Server(#[from] ServerErr),
}

/// Runs `event` through the board to completion, sending every command and feeding the
/// outcome back in. Returns the error of a failed command after its compensation ran.
pub async fn drive_board<A: Api>(
    api: &A,
    board: &mut Board,
    event: BoardEvent,
    session: Option<&str>,
) -> Result<(), DriveErr> {
    let mut event = event;
    let mut failure = None;
    loop {
        let effect = board.reduce(event)?;
        trace!("board effect {effect:?}");
        event = match effect {
            Effect::None => break,
            Effect::Send(command) => {
                let req = api.command(&command);
                let result = match session {
                    Some(session) => req.send_native_with_session(session).await,
                    None => req.send_native().await,
                };
                match result {
                    Ok(_) => command.confirmed(),
                    Err(err) => {
                        let event = command.failed(err.to_string());
                        failure = Some(err);
                        event
                    }
                }
            }
            Effect::Refetch | Effect::PersistLikedComments => {
                match api.get_posts().send_native().await? {
                    ServerRes::Posts(posts) => BoardEvent::Loaded(posts),
                    res => {
                        error!("drive_board: expected ServerRes::Posts, received: {res:?}");
                        break;
                    }
                }
            }
        };
    }

    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
