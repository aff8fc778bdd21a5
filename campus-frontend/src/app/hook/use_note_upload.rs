use campus_api::ApiWebPlain;
use campus_api::upload::{NoteUpload, upload_note, validate_upload};
use campus_shared::valid::upload::proccess_note_title;
use leptos::prelude::*;
use leptos::task::spawn_local;
use send_wrapper::SendWrapper;
use tracing::{debug, error};

use crate::app::GlobalState;
use crate::toolbox::prelude::*;

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
    strum::EnumIs,
)]
#[strum(serialize_all = "lowercase")]
pub enum UploadStage {
    #[default]
    Idle,
    Reading,
    Uploading,
    Done,
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct NoteUploadForm {
    pub title: String,
    pub description: String,
    pub subject_code: String,
    pub branch_code: String,
    pub college: String,
    pub file: Option<SendWrapper<web_sys::File>>,
}

#[derive(Clone, Copy)]
pub struct NoteUploadHook {
    pub stage: RwSignal<UploadStage>,
    pub on_upload: StoredFn<NoteUploadForm>,
}

impl NoteUploadHook {
    pub fn is_busy_tracked(&self) -> bool {
        matches!(self.stage.get(), UploadStage::Reading | UploadStage::Uploading)
    }
}

pub fn use_note_upload(on_done: impl Fn() + Send + Sync + 'static) -> NoteUploadHook {
    let global_state = expect_context::<GlobalState>();
    let stage = RwSignal::new(UploadStage::Idle);
    let on_done = StoredValue::new(on_done);

    let on_upload = move |form: NoteUploadForm| {
        if matches!(stage.get_untracked(), UploadStage::Reading | UploadStage::Uploading) {
            return;
        }
        let (name, mime, size) = form
            .file
            .as_ref()
            .map(|file| (file.name(), file.type_(), file.size() as u64))
            .unwrap_or_default();
        if let Err(err) = validate_upload(&name, &mime, size) {
            global_state.toast_err(err.to_string());
            return;
        }
        if let Err(err) = proccess_note_title(&form.title) {
            global_state.toast_err(err);
            return;
        }
        let Some(file) = form.file else {
            return;
        };

        stage.set(UploadStage::Reading);
        spawn_local(async move {
            let bytes = match read_file_bytes(file.take()).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    error!("use_note_upload: {err}");
                    global_state.toast_err(err.to_string());
                    stage.set(UploadStage::Failed);
                    return;
                }
            };
            debug!("read {} bytes of {name}", bytes.len());
            stage.set(UploadStage::Uploading);

            let upload = NoteUpload {
                title: form.title,
                description: form.description,
                subject_code: form.subject_code,
                branch_code: form.branch_code,
                college: form.college,
                file_name: name,
                mime,
                bytes,
            };
            match upload_note(&ApiWebPlain::new(), upload).await {
                Ok(_) => {
                    stage.set(UploadStage::Done);
                    global_state.toast_ok("Note uploaded");
                    on_done.with_value(|on_done| on_done());
                }
                Err(err) => {
                    error!("use_note_upload: {err}");
                    global_state.toast_err(err.to_string());
                    stage.set(UploadStage::Failed);
                }
            }
        });
    };

    NoteUploadHook {
        stage,
        on_upload: StoredValue::new(Box::new(on_upload)),
    }
}
