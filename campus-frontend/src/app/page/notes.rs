use campus_api::{Api, ApiWeb, ApiWebPlain, ServerErr, ServerRes};
use campus_shared::collection::{All, Matches, SubjectFilter, group_by_semester};
use campus_shared::model::{Branch, Course, Subject, SubjectNote};
use campus_shared::path::{link_note, link_notes, link_subject_notes, link_subjects};
use gloo::timers::callback::Interval;
use leptos::html;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use send_wrapper::SendWrapper;
use tracing::{error, trace};
use web_sys::{Event, MouseEvent, SubmitEvent};

use crate::app::GlobalState;
use crate::app::components::nav::Nav;
use crate::app::components::status::Status;
use crate::app::hook::use_college::{use_college, use_param};
use crate::app::hook::use_note_like::{like_key, use_note_like};
use crate::app::hook::use_note_upload::{NoteUploadForm, use_note_upload};
use crate::app::hook::use_remote_collection::{RemoteCollection, use_remote_collection};
use crate::toolbox::prelude::*;

pub const DOWNLOAD_COUNTDOWN: u32 = 5;

fn eq_code(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

fn find_course(courses: RemoteCollection<Course>, code: &str) -> Option<Course> {
    courses.items.with(|v| {
        v.items()
            .iter()
            .find(|course| eq_code(&course.course_code, code))
            .cloned()
    })
}

fn find_branch(branches: RemoteCollection<Branch>, code: &str) -> Option<Branch> {
    branches.items.with(|v| {
        v.items()
            .iter()
            .find(|branch| eq_code(&branch.branch_code, code))
            .cloned()
    })
}

/// Course and branch picker.
#[component]
pub fn Page() -> impl IntoView {
    let global_state = expect_context::<GlobalState>();
    let scope = use_college();
    let navigate = use_navigate();
    let course = RwSignal::new(String::new());
    let branch = RwSignal::new(String::new());
    let courses = use_remote_collection::<Course, _>(|| Some(ApiWebPlain::new().get_courses()));
    let course_id = Memo::new(move |_| {
        let code = course.get();
        find_course(courses, &code).map(|course| course.id)
    });
    let branches = use_remote_collection::<Branch, _>(move || {
        course_id.get().map(|id| ApiWebPlain::new().get_branches(id))
    });

    let course_options = move || {
        courses.items.with(|v| {
            v.items()
                .iter()
                .map(|course| view! { <option value=course.course_code.clone()>{ course.course_name.clone() }</option> })
                .collect_view()
        })
    };
    let branch_options = move || {
        branches.items.with(|v| {
            v.items()
                .iter()
                .map(|branch| view! { <option value=branch.branch_code.clone()>{ branch.branch_name.clone() }</option> })
                .collect_view()
        })
    };

    let on_go = move |e: SubmitEvent| {
        e.prevent_default();
        let (course, branch) = (course.get_untracked(), branch.get_untracked());
        if course.is_empty() || branch.is_empty() {
            global_state.toast_err("Please select a course and a branch");
            return;
        }
        navigate(
            &link_subjects(scope.slug.get_untracked(), course, branch),
            Default::default(),
        );
    };

    view! {
        <main class="grid grid-rows-[auto_1fr] min-h-screen text-base05">
            <Nav scope=scope />
            <form class="flex flex-col gap-2 px-4 py-6 max-w-[30rem] w-full mx-auto" on:submit=on_go>
                <h1 class="text-[1.8rem] font-black text-base0F">"Notes"</h1>
                <select
                    class="border-2 border-base02 bg-base01 px-2"
                    on:change=move |ev: Event| {
                        course.set(event_target_value(&ev));
                        branch.set(String::new());
                    }
                >
                    <option value="">"Select course"</option>
                    { course_options }
                </select>
                <select
                    class="border-2 border-base02 bg-base01 px-2"
                    prop:value=move || branch.get()
                    on:change=move |ev: Event| branch.set(event_target_value(&ev))
                >
                    <option value="">"Select branch"</option>
                    { branch_options }
                </select>
                <input type="submit" value="Show subjects" class="border-2 border-base0E px-4 py-1 font-bold text-base0E hover:bg-base02" />
            </form>
        </main>
    }
}

/// Subjects of a branch, grouped by semester.
#[component]
pub fn SubjectsPage() -> impl IntoView {
    let global_state = expect_context::<GlobalState>();
    let scope = use_college();
    let course_code = use_param("course");
    let branch_code = use_param("branch");
    let search = RwSignal::new(String::new());
    let semester = RwSignal::new(None::<String>);

    let courses = use_remote_collection::<Course, _>(|| Some(ApiWebPlain::new().get_courses()));
    let course_id = Memo::new(move |_| {
        course_code
            .with(|code| find_course(courses, code))
            .map(|course| course.id)
    });
    let branches = use_remote_collection::<Branch, _>(move || {
        course_id.get().map(|id| ApiWebPlain::new().get_branches(id))
    });
    let branch_id = Memo::new(move |_| {
        branch_code
            .with(|code| find_branch(branches, code))
            .map(|branch| branch.id)
    });

    Effect::new(move || {
        let courses_loaded = courses.items.with(|v| v.status().is_loaded());
        if courses_loaded && course_id.with(|id| id.is_none()) {
            global_state.toast_err("Course not found");
        }
    });
    Effect::new(move || {
        let branches_loaded = branches.items.with(|v| v.status().is_loaded());
        if branches_loaded && branch_id.with(|id| id.is_none()) {
            global_state.toast_err("Branch not found");
        }
    });
    let subjects = use_remote_collection::<Subject, _>(move || {
        branch_id.get().map(|id| ApiWebPlain::new().get_subjects(id))
    });

    let groups = Memo::new(move |_| {
        let filter = SubjectFilter {
            search: search.get(),
        };
        subjects.items.with(|v| {
            let matching = v.items().iter().filter(|subject| filter.matches(*subject));
            group_by_semester(matching)
                .into_iter()
                .map(|(semester, subjects)| {
                    (semester, subjects.into_iter().cloned().collect::<Vec<_>>())
                })
                .collect::<Vec<_>>()
        })
    });
    let active = move || {
        semester
            .get()
            .or_else(|| groups.with(|groups| groups.first().map(|(semester, _)| semester.clone())))
    };

    let tabs = move || {
        groups
            .get()
            .into_iter()
            .map(|(name, _)| {
                let label = format!("Semester {name}");
                let is_active = {
                    let name = name.clone();
                    move || active().as_deref() == Some(name.as_str())
                };
                view! {
                    <button
                        class=move || format!("border-2 px-3 {}", if is_active() { "border-base0E text-base0E" } else { "border-base02" })
                        on:click=move |_: MouseEvent| semester.set(Some(name.clone()))
                    >
                        { label }
                    </button>
                }
            })
            .collect_view()
    };

    let cards = move || {
        let active = active();
        let slug = scope.slug.get();
        let (course, branch) = (course_code.get(), branch_code.get());
        groups
            .get()
            .into_iter()
            .filter(|(name, _)| Some(name) == active.as_ref())
            .flat_map(|(_, subjects)| subjects)
            .map(|subject| {
                let href = link_subject_notes(&slug, &course, &branch, &subject.subject_code);
                view! {
                    <a href=href class="flex flex-col gap-1 border-2 border-base02 p-3 hover:bg-base01">
                        <h2 class="font-bold text-base0F">{ subject.subject_name.clone() }</h2>
                        <p class="text-base03">{ subject.subject_code.clone() }</p>
                    </a>
                }
            })
            .collect_view()
    };

    view! {
        <main class="grid grid-rows-[auto_1fr] min-h-screen text-base05">
            <Nav scope=scope />
            <div class="flex flex-col gap-4 px-4 py-6">
                <div class="flex flex-wrap justify-between gap-2">
                    <h1 class="text-[1.8rem] font-black text-base0F">
                        { move || format!("{} {}", course_code.get().to_uppercase(), branch_code.get().to_uppercase()) }
                    </h1>
                    <a href=move || link_notes(scope.slug.get()) class="text-base0D">"Change branch"</a>
                </div>
                <input
                    class="border-2 border-base02 bg-base01 px-2"
                    placeholder="Search subject"
                    on:input=move |ev: Event| search.set(event_target_value(&ev))
                />
                <div class="flex flex-wrap gap-2">{ tabs }</div>
                <Status
                    status=Signal::derive(move || subjects.items.with(|v| v.status().clone()))
                    empty=Signal::derive(move || groups.with(|v| v.is_empty()))
                />
                <div class="grid grid-cols-1 md:grid-cols-3 gap-4">{ cards }</div>
            </div>
        </main>
    }
}

fn is_note_owner(note: &SubjectNote, viewer: Option<&str>) -> bool {
    match (note.owner.as_ref(), viewer) {
        (Some(owner), Some(viewer)) => owner.id() == viewer,
        _ => false,
    }
}

fn delete_note(notes: RemoteCollection<SubjectNote>, global_state: GlobalState, note_id: String) {
    let began = notes.items.try_update(|v| v.begin(note_id.clone()));
    if began != Some(true) {
        return;
    }
    ApiWebPlain::new()
        .delete_note(&note_id)
        .send_web(move |result| async move {
            notes.items.update(|v| v.finish(&note_id));
            match result {
                Ok(_) => {
                    global_state.toast_ok("Note deleted");
                    notes.items.update(|v| {
                        v.remove(&note_id);
                    });
                    notes.reload.call(());
                }
                Err(err) => {
                    error!("delete note: {err}");
                    global_state.toast_err(err.to_string());
                }
            }
        });
}

/// Notes of one subject, with like, delete and upload.
#[component]
pub fn NotesPage() -> impl IntoView {
    let global_state = expect_context::<GlobalState>();
    let scope = use_college();
    let course_code = use_param("course");
    let branch_code = use_param("branch");
    let subject_code = use_param("subject");
    let show_form = RwSignal::new(false);

    let notes = use_remote_collection::<SubjectNote, _>(move || {
        let college_id = scope.id_tracked()?;
        Some(ApiWebPlain::new().get_subject_notes(
            subject_code.get(),
            branch_code.get(),
            college_id,
        ))
    });
    let on_like = use_note_like(notes);
    let upload = use_note_upload(move || {
        show_form.set(false);
        notes.reload.call(());
    });

    let title_ref = NodeRef::<html::Input>::new();
    let description_ref = NodeRef::<html::Textarea>::new();
    let file = RwSignal::new(None::<SendWrapper<web_sys::File>>);

    let on_file = move |ev: Event| {
        let input = event_target::<web_sys::HtmlInputElement>(&ev);
        let selected = input.files().and_then(|files| files.get(0));
        trace!("selected file {:?}", selected.as_ref().map(|file| file.name()));
        file.set(selected.map(SendWrapper::new));
    };

    let on_upload = move |e: SubmitEvent| {
        e.prevent_default();
        let (Some(title), Some(description)) =
            (title_ref.get_untracked(), description_ref.get_untracked())
        else {
            return;
        };
        let Some(college) = scope.id_untracked() else {
            global_state.toast_err("Unknown college");
            return;
        };
        upload.on_upload.call(NoteUploadForm {
            title: title.value(),
            description: description.value(),
            subject_code: subject_code.get_untracked().to_uppercase(),
            branch_code: branch_code.get_untracked(),
            college,
            file: file.get_untracked(),
        });
    };

    let cards = move || {
        let viewer = global_state.get_user_id_tracked();
        let slug = scope.slug.get();
        let (course, branch, subject) = (course_code.get(), branch_code.get(), subject_code.get());
        notes.items.with(|v| {
            v.view(&All)
                .items
                .into_iter()
                .map(|note| {
                    let id = note.id.clone();
                    let owner = is_note_owner(note, viewer.as_deref());
                    let liked = viewer
                        .as_deref()
                        .map(|viewer| note.likes.contains(viewer))
                        .unwrap_or_default();
                    let like_count = note.likes.len();
                    let href = link_note(&slug, &course, &branch, &subject, &note.slug);
                    let like_pending = {
                        let key = like_key(&id);
                        move || notes.is_pending_tracked(&key)
                    };
                    let delete_pending = {
                        let id = id.clone();
                        move || notes.is_pending_tracked(&id)
                    };
                    let like_id = id.clone();
                    view! {
                        <div class="flex flex-col gap-1 border-2 border-base02 p-3">
                            <a href=href class="text-[1.1rem] font-bold text-base0F">{ note.title.clone() }</a>
                            <p class="text-base03">{ note.description.clone() }</p>
                            <div class="flex gap-3">
                                <button
                                    class=format!("border-2 px-3 {}", if liked { "border-base08 text-base08" } else { "border-base05" })
                                    disabled=like_pending
                                    on:click=move |_: MouseEvent| on_like.call(like_id.clone())
                                >
                                    { format!("♥ {like_count}") }
                                </button>
                                <button
                                    class=if owner { "text-base08" } else { "hidden" }
                                    disabled=delete_pending
                                    on:click=move |_: MouseEvent| delete_note(notes, global_state, id.clone())
                                >
                                    "Delete"
                                </button>
                            </div>
                        </div>
                    }
                })
                .collect_view()
        })
    };

    view! {
        <main class="grid grid-rows-[auto_1fr] min-h-screen text-base05">
            <Nav scope=scope />
            <div class="flex flex-col gap-4 px-4 py-6">
                <div class="flex flex-wrap justify-between gap-2">
                    <h1 class="text-[1.8rem] font-black text-base0F">{ move || format!("{} Notes", subject_code.get().to_uppercase()) }</h1>
                    <a href=move || link_subjects(scope.slug.get(), course_code.get(), branch_code.get()) class="text-base0D">"All subjects"</a>
                </div>
                <button
                    class=move || if global_state.is_logged_in() { "border-2 border-base0E px-3 py-1 text-base0E self-start" } else { "hidden" }
                    on:click=move |_: MouseEvent| show_form.update(|v| *v = !*v)
                >
                    "Add Note"
                </button>
                <form class=move || if show_form.get() { "flex flex-col gap-2 max-w-[30rem]" } else { "hidden" } on:submit=on_upload>
                    <input node_ref=title_ref class="border-2 border-base02 bg-base01 px-2" placeholder="Title" />
                    <textarea node_ref=description_ref class="border-2 border-base02 bg-base01 px-2" placeholder="Description"></textarea>
                    <input type="file" accept="application/pdf" on:change=on_file />
                    <input
                        type="submit"
                        disabled=move || upload.is_busy_tracked()
                        value=move || format!("Upload ({})", upload.stage.get())
                        class="border-2 border-base0E px-4 py-1 font-bold text-base0E hover:bg-base02"
                    />
                </form>
                <Status
                    status=Signal::derive(move || notes.items.with(|v| v.status().clone()))
                    empty=Signal::derive(move || notes.items.with(|v| v.items().is_empty()))
                />
                <div class="grid grid-cols-1 md:grid-cols-3 gap-4">{ cards }</div>
            </div>
        </main>
    }
}

/// Single note with an embedded viewer and a delayed download.
#[component]
pub fn NotePage() -> impl IntoView {
    let global_state = expect_context::<GlobalState>();
    let scope = use_college();
    let course_code = use_param("course");
    let branch_code = use_param("branch");
    let subject_code = use_param("subject");
    let slug = use_param("note");
    let api = ApiWeb::new();
    let note = RwSignal::new(None::<SubjectNote>);
    let not_found = RwSignal::new(false);
    let countdown = RwSignal::new(None::<u32>);
    let timer = StoredValue::new(None::<SendWrapper<Interval>>);

    Effect::new(move || {
        let slug = slug.get();
        api.get_note(slug).send_web(move |result| async move {
            match result {
                Ok(ServerRes::Note(found)) => {
                    note.set(Some(found));
                }
                Ok(res) => {
                    error!("expected Note, received {res:?}");
                }
                Err(ServerErr::Status { status: 404, .. }) => {
                    not_found.set(true);
                }
                Err(err) => {
                    error!("{err}");
                    global_state.toast_err("Failed to fetch note.");
                    not_found.set(true);
                }
            }
        });
    });

    on_cleanup(move || timer.set_value(None));

    let open_file = move || {
        let Some(url) =
            note.with_untracked(|note| note.as_ref().map(|note| note.file_url.clone()))
        else {
            return;
        };
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(err) = window.open_with_url_and_target(&url, "_blank") {
            error!("failed to open note {err:?}");
        }
    };

    let on_download = move |_: MouseEvent| {
        if countdown.get_untracked().is_some() {
            return;
        }
        countdown.set(Some(DOWNLOAD_COUNTDOWN));
        let interval = Interval::new(1000, move || {
            let Some(left) = countdown.get_untracked() else {
                return;
            };
            let left = left.saturating_sub(1);
            if left == 0 {
                countdown.set(None);
                open_file();
            } else {
                countdown.set(Some(left));
            }
        });
        timer.set_value(Some(SendWrapper::new(interval)));
    };

    let subject = move || {
        note.with(|note| {
            note.as_ref()
                .and_then(|note| note.subject.as_ref())
                .and_then(|subject| subject.populated())
                .map(|subject| {
                    format!("Subject: {} ({})", subject.subject_name, subject.subject_code)
                })
        })
    };
    let viewer_url = move || {
        note.with(|note| {
            note.as_ref().map(|note| {
                format!("https://docs.google.com/gview?url={}&embedded=true", note.file_url)
            })
        })
    };

    view! {
        <main class="grid grid-rows-[auto_1fr] min-h-screen text-base05">
            <Nav scope=scope />
            <div class="flex flex-col gap-4 px-4 py-6">
                <a href=move || link_subject_notes(scope.slug.get(), course_code.get(), branch_code.get(), subject_code.get()) class="text-base0D">
                    "Back to notes"
                </a>
                <div class=move || if not_found.get() { "grid place-items-center text-[1.5rem]" } else { "hidden" }>
                    "Note not found."
                </div>
                <p class=move || if api.is_pending_tracked() { "text-base03" } else { "hidden" }>"Loading note..."</p>
                <h1 class="text-[1.8rem] font-black text-base0F">
                    { move || note.with(|note| note.as_ref().map(|note| note.title.clone())) }
                </h1>
                <p class="text-base03">{ subject }</p>
                { move || viewer_url().map(|url| view! {
                    <iframe src=url title="PDF View" class="w-full h-[56rem] bg-white"></iframe>
                }) }
                <button
                    class=move || if note.with(|note| note.is_some()) { "border-2 border-base0E px-4 py-1 text-base0E self-center" } else { "hidden" }
                    disabled=move || countdown.get().is_some()
                    on:click=on_download
                >
                    { move || match countdown.get() {
                        Some(left) => format!("Download {left}s"),
                        None => String::from("Download"),
                    } }
                </button>
            </div>
        </main>
    }
}
