use campus_shared::model::{NoteMeta, PresignRequest};
use campus_shared::valid::upload::{UploadFile, proccess_note_title, proccess_upload};
use http::header::CONTENT_TYPE;
use jiff::Timestamp;
use thiserror::Error;
use tracing::{debug, error, trace};

use crate::{Api, ServerErr, ServerRes};

pub const NOTES_PREFIX: &str = "ss-notes";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UploadErr {
    #[error("{0}")]
    Invalid(String),

    #[error("failed to get upload url: {0}")]
    Presign(String),

    #[error("failed to upload file: {0}")]
    Transfer(String),

    #[error("failed to save note: {0}")]
    Metadata(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoteUpload {
    pub title: String,
    pub description: String,
    pub subject_code: String,
    pub branch_code: String,
    pub college: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Checked before the file is even read, so a rejected file never reaches the network.
pub fn validate_upload(
    name: impl AsRef<str>,
    mime: impl AsRef<str>,
    size: u64,
) -> Result<UploadFile, UploadErr> {
    proccess_upload(name.as_ref(), mime.as_ref(), size).map_err(UploadErr::Invalid)
}

pub fn presign_file_name(title: impl AsRef<str>, unix_ms: i64) -> String {
    format!("{NOTES_PREFIX}/{}-{unix_ms}.pdf", title.as_ref())
}

pub async fn upload_note<A: Api>(api: &A, upload: NoteUpload) -> Result<ServerRes, ServerErr> {
    upload_note_at(api, upload, Timestamp::now().as_millisecond()).await
}

pub async fn upload_note_at<A: Api>(
    api: &A,
    upload: NoteUpload,
    unix_ms: i64,
) -> Result<ServerRes, ServerErr> {
    let file = validate_upload(&upload.file_name, &upload.mime, upload.bytes.len() as u64)?;
    let title = proccess_note_title(&upload.title).map_err(UploadErr::Invalid)?;
    trace!("uploading {file:?}");

    let presign = PresignRequest {
        file_name: presign_file_name(&title, unix_ms),
        file_type: file.mime.clone(),
    };
    let presigned = match api.get_presigned_url(&presign).send_native().await {
        Ok(ServerRes::PresignedUrl(presigned)) => presigned,
        Ok(res) => {
            error!("upload_note: expected ServerRes::PresignedUrl, received: {res:?}");
            return Err(UploadErr::Presign(String::from("unexpected response")).into());
        }
        Err(err) => return Err(UploadErr::Presign(err.to_string()).into()),
    };
    debug!("upload url for {}", presigned.key);

    // storage request carries no api key
    let res = reqwest::Client::new()
        .put(&presigned.upload_url)
        .header(CONTENT_TYPE, &file.mime)
        .body(upload.bytes)
        .send()
        .await
        .inspect_err(|err| error!("upload transfer failed {err}"))
        .map_err(|err| UploadErr::Transfer(err.to_string()))?;
    if !res.status().is_success() {
        return Err(UploadErr::Transfer(format!("storage responded with {}", res.status())).into());
    }

    let meta = NoteMeta {
        title,
        description: upload.description.trim().to_string(),
        subject_code: upload.subject_code,
        branch_code: upload.branch_code,
        college: upload.college,
        file_url: api.provide_config().file_url(&presigned.key),
    };
    api.add_note(&meta)
        .send_native()
        .await
        .map_err(|err| UploadErr::Metadata(err.to_string()).into())
}
