pub mod prelude {
    pub use super::clipboard::{self, copy_to_clipboard};
    pub use super::file::{self, read_file_bytes};
    pub use super::storage::{self, load_current_user, load_liked_comments, save_liked_comments};
    pub use super::stored::{self, CallStored, RunStored, StoredFn, StoredGetter};
    pub use super::window::{self, origin};
}

pub mod stored {
    use leptos::prelude::{StoredValue, WithValue};

    pub type StoredFn<A> = StoredValue<Box<dyn Fn(A) + Sync + Send + 'static>>;
    pub type StoredGetter<T> = StoredValue<Box<dyn Fn() -> T + Sync + Send + 'static>>;

    pub fn stored_fn<A: 'static>(f: impl Fn(A) + Sync + Send + 'static) -> StoredFn<A> {
        StoredValue::new(Box::new(f))
    }

    pub fn stored_getter<T: 'static>(f: impl Fn() -> T + Sync + Send + 'static) -> StoredGetter<T> {
        StoredValue::new(Box::new(f))
    }

    pub trait RunStored<T> {
        fn run(&self) -> T;
    }

    impl<T: 'static> RunStored<T> for StoredGetter<T> {
        fn run(&self) -> T {
            self.with_value(|f| f())
        }
    }

    pub trait CallStored<A> {
        fn call(&self, arg: A);
    }

    impl<A: 'static> CallStored<A> for StoredFn<A> {
        fn call(&self, arg: A) {
            self.with_value(|f| f(arg))
        }
    }
}

pub mod storage {
    use campus_shared::interaction::LikedComments;
    use campus_shared::model::CurrentUser;
    use campus_shared::{CURRENT_USER_KEY, LIKED_COMMENTS_KEY};
    use gloo::storage::{LocalStorage, Storage};
    use tracing::{error, trace};

    /// Session user as persisted by the sign-in flow.
    pub fn load_current_user() -> Option<CurrentUser> {
        match LocalStorage::get::<CurrentUser>(CURRENT_USER_KEY) {
            Ok(user) => Some(user),
            Err(err) => {
                trace!("no current user: {err}");
                None
            }
        }
    }

    pub fn load_liked_comments() -> LikedComments {
        let raw = LocalStorage::raw().get_item(LIKED_COMMENTS_KEY).ok().flatten();
        match raw {
            Some(raw) => LikedComments::from_json(&raw),
            None => LikedComments::default(),
        }
    }

    pub fn save_liked_comments(liked: &LikedComments) {
        if let Err(err) = LocalStorage::raw().set_item(LIKED_COMMENTS_KEY, &liked.to_json()) {
            error!("failed to persist liked comments {err:?}");
        }
    }
}

pub mod window {
    use thiserror::Error;

    #[derive(Debug, Error, Clone)]
    pub enum ErrorWindow {
        #[error("failed to get Window object")]
        GettingWindow,

        #[error("failed to read location \"{0}\"")]
        Location(String),
    }

    pub fn origin() -> Result<String, ErrorWindow> {
        web_sys::window()
            .ok_or(ErrorWindow::GettingWindow)?
            .location()
            .origin()
            .map_err(|err| ErrorWindow::Location(format!("{err:?}")))
    }
}

pub mod clipboard {
    use thiserror::Error;
    use wasm_bindgen_futures::JsFuture;

    #[derive(Debug, Error, Clone)]
    pub enum ErrorClipboard {
        #[error("failed to get Window object")]
        GettingWindow,

        #[error("failed to write to clipboard \"{0}\"")]
        Writing(String),
    }

    pub async fn copy_to_clipboard(text: impl AsRef<str>) -> Result<(), ErrorClipboard> {
        let promise = web_sys::window()
            .ok_or(ErrorClipboard::GettingWindow)?
            .navigator()
            .clipboard()
            .write_text(text.as_ref());
        JsFuture::from(promise)
            .await
            .map_err(|err| ErrorClipboard::Writing(format!("{err:?}")))?;
        Ok(())
    }
}

pub mod file {
    use gloo::file::futures::read_as_bytes;
    use thiserror::Error;

    #[derive(Debug, Error, Clone)]
    pub enum ErrorFileRead {
        #[error("failed to read file \"{0}\"")]
        Reading(String),
    }

    pub async fn read_file_bytes(file: web_sys::File) -> Result<Vec<u8>, ErrorFileRead> {
        let file = gloo::file::File::from(file);
        read_as_bytes(&file)
            .await
            .map_err(|err| ErrorFileRead::Reading(err.to_string()))
    }
}
