use campus_api::{Api, ApiWebPlain};
use campus_shared::interaction::LikeToggle;
use campus_shared::model::SubjectNote;
use leptos::prelude::*;
use tracing::{error, warn};

use crate::app::GlobalState;
use crate::app::hook::use_remote_collection::RemoteCollection;
use crate::toolbox::prelude::*;

pub fn like_key(note_id: &str) -> String {
    format!("like:{note_id}")
}

/// Optimistic like toggle over a loaded note list, reverted when the request fails.
pub fn use_note_like(notes: RemoteCollection<SubjectNote>) -> StoredFn<String> {
    let global_state = expect_context::<GlobalState>();

    let on_like = move |note_id: String| {
        let Some(viewer) = global_state.get_user_id_untracked() else {
            global_state.toast_err("Please log in to like notes");
            return;
        };
        let key = like_key(&note_id);
        let toggle = notes
            .items
            .try_update(|v| {
                if !v.begin(key.clone()) {
                    warn!("note like {note_id} still pending");
                    return None;
                }
                let toggle = v
                    .find_mut(&note_id)
                    .map(|note| LikeToggle::apply(note, &viewer));
                if toggle.is_none() {
                    v.finish(&key);
                }
                toggle
            })
            .flatten();
        let Some(toggle) = toggle else {
            return;
        };

        ApiWebPlain::new()
            .toggle_note_like(&note_id)
            .send_web(move |result| async move {
                match result {
                    Ok(_) => {
                        notes.items.update(|v| v.finish(&key));
                        notes.reload.call(());
                    }
                    Err(err) => {
                        error!("use_note_like: {err}");
                        global_state.toast_err(err.to_string());
                        notes.items.update(|v| {
                            v.finish(&key);
                            if let Some(note) = v.find_mut(&note_id) {
                                toggle.revert(note, &viewer);
                            }
                        });
                    }
                }
            });
    };

    StoredValue::new(Box::new(on_like))
}
