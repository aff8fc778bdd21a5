use campus_api::{Api, ApiWebPlain, ServerErr, ServerRes};
use campus_shared::collection::{Collection, LoadStatus};
use campus_shared::model::{College, CurrentUser};
use campus_shared::path::college_slug;
use gloo::timers::callback::Timeout;
use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::components::*;
use leptos_router::path;
use components::toasts::Toasts;
use page::{
    college, community, home, install, not_found, notes, opportunities, post, pyq, seniors,
};
use tracing::{error, info, trace};

use crate::toolbox::prelude::*;

pub mod components;
pub mod hook;
pub mod page;

pub const APP_TITLE: &str = "Student Senior";
pub const TOAST_MS: u32 = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIs)]
#[strum(serialize_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Clone, Copy, Debug)]
pub struct GlobalState {
    pub user: RwSignal<Option<CurrentUser>>,
    pub colleges: RwSignal<Collection<College>>,
    pub toasts: RwSignal<Vec<Toast>>,
    pub toast_id: StoredValue<u64>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            user: RwSignal::new(None),
            colleges: RwSignal::new(Collection::new()),
            toasts: RwSignal::new(Vec::new()),
            toast_id: StoredValue::new(0),
        }
    }
}

impl GlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_user_id_tracked(&self) -> Option<String> {
        self.user.with(|user| user.as_ref().map(|user| user.id.clone()))
    }

    pub fn get_user_id_untracked(&self) -> Option<String> {
        self.user
            .with_untracked(|user| user.as_ref().map(|user| user.id.clone()))
    }

    pub fn get_username_tracked(&self) -> Option<String> {
        self.user
            .with(|user| user.as_ref().map(|user| user.username.clone()))
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.with(|user| user.is_some())
    }

    pub fn update_user(&self) {
        let user = load_current_user();
        if let Some(user) = &user {
            info!("logged in as {}", user.username);
        }
        let r = self.user.try_set(user);
        if r.is_some() {
            error!("global state user was disposed somehow");
        }
    }

    pub fn update_colleges(&self) {
        let this = *self;
        if !this.colleges.with_untracked(|v| v.status().is_idle()) {
            return;
        }
        this.colleges.update(|v| v.begin_load());
        ApiWebPlain::new()
            .get_colleges()
            .send_web(move |result| async move {
                this.set_colleges_from_res(result);
            });
    }

    pub fn set_colleges_from_res(&self, result: Result<ServerRes, ServerErr>) {
        let r = match result {
            Ok(ServerRes::Colleges(colleges)) => {
                trace!("received {} colleges", colleges.len());
                self.colleges.try_update(|v| v.loaded(colleges))
            }
            Ok(res) => {
                error!("expected Colleges, received {res:?}");
                self.colleges
                    .try_update(|v| v.failed("unexpected response"))
            }
            Err(err) => {
                error!("{err}");
                self.toast_err(format!("failed to load colleges: {err}"));
                self.colleges.try_update(|v| v.failed(err.to_string()))
            }
        };
        if r.is_none() {
            error!("global state colleges was disposed somehow");
        }
    }

    pub fn colleges_status_tracked(&self) -> LoadStatus {
        self.colleges.with(|v| v.status().clone())
    }

    pub fn get_college_by_slug_tracked(&self, slug: &str) -> Option<College> {
        self.colleges.with(|v| {
            v.items()
                .iter()
                .find(|college| college_slug(&college.name) == slug)
                .cloned()
        })
    }

    pub fn toast_ok(&self, message: impl Into<String>) {
        self.toast(ToastKind::Success, message);
    }

    pub fn toast_err(&self, message: impl Into<String>) {
        self.toast(ToastKind::Error, message);
    }

    pub fn toast(&self, kind: ToastKind, message: impl Into<String>) {
        let id = self.toast_id.get_value();
        self.toast_id.set_value(id + 1);
        let toast = Toast {
            id,
            kind,
            message: message.into(),
        };
        trace!("toast {toast:?}");
        self.toasts.update(|v| v.push(toast));

        let toasts = self.toasts;
        Timeout::new(TOAST_MS, move || {
            let r = toasts.try_update(|v| v.retain(|toast| toast.id != id));
            if r.is_none() {
                trace!("toast list gone before dismiss");
            }
        })
        .forget();
    }

    pub fn dismiss_toast(&self, id: u64) {
        self.toasts.update(|v| v.retain(|toast| toast.id != id));
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    provide_context(GlobalState::new());
    let global_state = expect_context::<GlobalState>();

    Effect::new(move || {
        global_state.update_user();
        global_state.update_colleges();
    });

    view! {
        <Title text=APP_TITLE />
        <Router>
            <Toasts />
            <Routes fallback=not_found::Page>
                <Route path=path!("") view=home::Page />
                <Route path=path!("/install") view=install::Page />
                <Route path=path!("/college/:college") view=college::Page />
                <Route path=path!("/college/:college/community") view=community::Page />
                <Route path=path!("/college/:college/community/post/:post") view=post::Page />
                <Route path=path!("/college/:college/seniors") view=seniors::Page />
                <Route path=path!("/college/:college/seniors/add") view=seniors::AddPage />
                <Route path=path!("/college/:college/pyq") view=pyq::Page />
                <Route path=path!("/college/:college/opportunities") view=opportunities::Page />
                <Route path=path!("/college/:college/notes") view=notes::Page />
                <Route path=path!("/college/:college/notes/:course/:branch") view=notes::SubjectsPage />
                <Route path=path!("/college/:college/notes/:course/:branch/:subject") view=notes::NotesPage />
                <Route path=path!("/college/:college/notes/:course/:branch/:subject/:note") view=notes::NotePage />
            </Routes>
        </Router>
    }
}
