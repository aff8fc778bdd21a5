use campus_api::{Api, ApiWeb, ApiWebPlain, ServerRes};
use campus_shared::collection::{And, CollegeFilter, SeniorFilter, senior_branches};
use campus_shared::model::{Senior, SeniorForm};
use campus_shared::path::{link_add_senior, link_seniors};
use campus_shared::valid::form::proccess_senior;
use leptos::html;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use tracing::{error, trace};
use web_sys::{MouseEvent, SubmitEvent};

use crate::app::GlobalState;
use crate::app::components::nav::Nav;
use crate::app::components::pager::Pager;
use crate::app::components::status::Status;
use crate::app::hook::use_college::use_college;
use crate::app::hook::use_remote_collection::{RemoteCollection, use_remote_collection};
use crate::toolbox::prelude::*;

pub const SENIOR_YEARS: [&str; 5] = ["1st Year", "2nd Year", "3rd Year", "4th Year", "5th Year"];

fn is_owner(senior: &Senior, viewer: Option<&str>) -> bool {
    match (senior.owner.as_ref(), viewer) {
        (Some(owner), Some(viewer)) => owner.id() == viewer,
        _ => false,
    }
}

fn delete_senior(seniors: RemoteCollection<Senior>, global_state: GlobalState, senior_id: String) {
    let began = seniors.items.try_update(|v| v.begin(senior_id.clone()));
    if began != Some(true) {
        return;
    }
    ApiWebPlain::new()
        .delete_senior(&senior_id)
        .send_web(move |result| async move {
            seniors.items.update(|v| v.finish(&senior_id));
            match result {
                Ok(_) => {
                    global_state.toast_ok("Senior deleted");
                    seniors.items.update(|v| {
                        v.remove(&senior_id);
                    });
                    seniors.reload.call(());
                }
                Err(err) => {
                    error!("delete senior: {err}");
                    global_state.toast_err(err.to_string());
                }
            }
        });
}

#[component]
pub fn Page() -> impl IntoView {
    let global_state = expect_context::<GlobalState>();
    let scope = use_college();
    let seniors = use_remote_collection::<Senior, _>(move || {
        scope.id_tracked().map(|college_id| ApiWebPlain::new().get_seniors(college_id))
    });
    let branch = RwSignal::new(String::new());
    let year = RwSignal::new(String::new());
    let editing = RwSignal::new(None::<(String, SeniorForm)>);

    let filter = move || {
        And(
            SeniorFilter {
                branch: branch.get(),
                year: year.get(),
            },
            CollegeFilter {
                college_id: scope.id_tracked().unwrap_or_default(),
            },
        )
    };
    let page = Memo::new(move |_| {
        let filter = filter();
        seniors.items.with(|v| {
            let page = v.view(&filter);
            (
                page.items.into_iter().cloned().collect::<Vec<_>>(),
                page.page,
                page.total_pages,
            )
        })
    });
    let branches = move || seniors.items.with(|v| senior_branches(v.items()));

    let on_filter = move |set: RwSignal<String>| {
        move |ev: web_sys::Event| {
            set.set(event_target_value(&ev));
            seniors.set_page(1);
        }
    };

    let cards = move || {
        let viewer = global_state.get_user_id_tracked();
        page.get()
            .0
            .into_iter()
            .map(|senior| {
                let owner = is_owner(&senior, viewer.as_deref());
                let id = senior.id.clone();
                let form = SeniorForm::from(&senior);
                let pending_id = id.clone();
                let pending = move || seniors.is_pending_tracked(&pending_id);
                view! {
                    <div class="flex flex-col gap-1 border-2 border-base02 p-3">
                        <h2 class="text-[1.2rem] font-bold text-base0F">{ senior.name.clone() }</h2>
                        <p>{ format!("{} · {}", senior.branch, senior.year) }</p>
                        <p class="text-base03">{ senior.domain.clone() }</p>
                        <div class="flex gap-3">
                            <a href=format!("https://wa.me/{}", senior.whatsapp) class="text-base0B">"WhatsApp"</a>
                            { senior.telegram.clone().map(|telegram| view! {
                                <a href=format!("https://t.me/{telegram}") class="text-base0D">"Telegram"</a>
                            }) }
                        </div>
                        <div class=if owner { "flex gap-3" } else { "hidden" }>
                            <button
                                class="text-base0E"
                                on:click={
                                    let id = id.clone();
                                    move |_: MouseEvent| editing.set(Some((id.clone(), form.clone())))
                                }
                            >
                                "Edit"
                            </button>
                            <button
                                class="text-base08"
                                disabled=pending
                                on:click=move |_: MouseEvent| delete_senior(seniors, global_state, id.clone())
                            >
                                "Delete"
                            </button>
                        </div>
                    </div>
                }
            })
            .collect_view()
    };

    view! {
        <main class="grid grid-rows-[auto_1fr] min-h-screen text-base05">
            <Nav scope=scope />
            <div class="flex flex-col gap-4 px-4 py-6">
                <div class="flex flex-wrap justify-between gap-2">
                    <h1 class="text-[1.8rem] font-black text-base0F">"Seniors"</h1>
                    <a href=move || link_add_senior(scope.slug.get()) class="border-2 border-base0E px-3 py-1 text-base0E">"Add Senior"</a>
                </div>
                <div class="flex flex-wrap gap-2">
                    <select class="border-2 border-base02 bg-base01 px-2" on:change=on_filter(branch)>
                        <option value="">"All branches"</option>
                        { move || branches().into_iter().map(|branch| { let label = branch.clone(); view! { <option value=branch>{ label }</option> } }).collect_view() }
                    </select>
                    <select class="border-2 border-base02 bg-base01 px-2" on:change=on_filter(year)>
                        <option value="">"All years"</option>
                        { SENIOR_YEARS.iter().map(|year| view! { <option value=*year>{ *year }</option> }).collect_view() }
                    </select>
                </div>
                <Status
                    status=Signal::derive(move || seniors.items.with(|v| v.status().clone()))
                    empty=Signal::derive(move || page.with(|v| v.0.is_empty()))
                />
                <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
                    { cards }
                </div>
                <Pager
                    page=Signal::derive(move || page.with(|v| v.1))
                    total_pages=Signal::derive(move || page.with(|v| v.2))
                    on_page=Callback::new(move |page| seniors.set_page(page))
                />
            </div>
            <EditModal editing=editing seniors=seniors />
        </main>
    }
}

fn form_input(
    label: &'static str,
    form: RwSignal<Option<(String, SeniorForm)>>,
    get: fn(&SeniorForm) -> String,
    set: fn(&mut SeniorForm, String),
) -> impl IntoView {
    view! {
        <label class="flex flex-col gap-1">
            { label }
            <input
                class="border-2 border-base02 bg-base01 px-2"
                prop:value=move || form.with(|form| form.as_ref().map(|(_, form)| get(form)).unwrap_or_default())
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    form.update(|form| {
                        if let Some((_, form)) = form {
                            set(form, value);
                        }
                    });
                }
            />
        </label>
    }
}

#[component]
fn EditModal(
    editing: RwSignal<Option<(String, SeniorForm)>>,
    seniors: RemoteCollection<Senior>,
) -> impl IntoView {
    let global_state = expect_context::<GlobalState>();
    let api = ApiWeb::new();

    let on_save = move |e: SubmitEvent| {
        e.prevent_default();
        let Some((senior_id, form)) = editing.get_untracked() else {
            return;
        };
        let form = match proccess_senior(form) {
            Ok(form) => form,
            Err(err) => {
                global_state.toast_err(err);
                return;
            }
        };
        trace!("saving senior {senior_id}");
        api.edit_senior(&senior_id, &form)
            .send_web(move |result| async move {
                match result {
                    Ok(_) => {
                        global_state.toast_ok("Senior updated");
                        editing.set(None);
                        seniors.reload.call(());
                    }
                    Err(err) => {
                        error!("edit senior: {err}");
                        global_state.toast_err(err.to_string());
                    }
                }
            });
    };

    view! {
        <div class=move || if editing.with(|v| v.is_some()) { "fixed inset-0 z-40 grid place-items-center bg-base00/80" } else { "hidden" }>
            <form class="flex flex-col gap-2 border-2 border-base0E bg-base00 p-4 min-w-[20rem]" on:submit=on_save>
                <h2 class="text-[1.3rem] font-bold text-base0F">"Edit Senior"</h2>
                { form_input("Name", editing, |f| f.name.clone(), |f, v| f.name = v) }
                { form_input("Branch", editing, |f| f.branch.clone(), |f, v| f.branch = v) }
                { form_input("Year", editing, |f| f.year.clone(), |f, v| f.year = v) }
                { form_input("Domain", editing, |f| f.domain.clone(), |f, v| f.domain = v) }
                { form_input("WhatsApp", editing, |f| f.whatsapp.clone(), |f, v| f.whatsapp = v) }
                { form_input("Telegram", editing, |f| f.telegram.clone().unwrap_or_default(), |f, v| f.telegram = Some(v)) }
                <div class="flex gap-2 justify-end">
                    <button type="button" on:click=move |_: MouseEvent| editing.set(None)>"Cancel"</button>
                    <input
                        type="submit"
                        value=move || if api.is_pending_tracked() { "Saving..." } else { "Save" }
                        class="border-2 border-base0E px-4 text-base0E"
                    />
                </div>
            </form>
        </div>
    }
}

#[component]
pub fn AddPage() -> impl IntoView {
    let global_state = expect_context::<GlobalState>();
    let scope = use_college();
    let navigate = use_navigate();
    let api = ApiWeb::new();
    let name = NodeRef::<html::Input>::new();
    let branch = NodeRef::<html::Input>::new();
    let year = NodeRef::<html::Select>::new();
    let domain = NodeRef::<html::Input>::new();
    let whatsapp = NodeRef::<html::Input>::new();
    let telegram = NodeRef::<html::Input>::new();
    let err_general = RwSignal::new(String::new());

    let on_submit = move |e: SubmitEvent| {
        e.prevent_default();
        let value = |input: NodeRef<html::Input>| {
            input
                .get_untracked()
                .map(|input| input.value())
                .unwrap_or_default()
        };
        let Some(college) = scope.id_untracked() else {
            err_general.set(String::from("unknown college"));
            return;
        };
        let telegram = value(telegram);
        let form = SeniorForm {
            name: value(name),
            branch: value(branch),
            year: year
                .get_untracked()
                .map(|select| select.value())
                .unwrap_or_default(),
            domain: value(domain),
            whatsapp: value(whatsapp),
            telegram: Some(telegram),
            college,
        };
        let form = match proccess_senior(form) {
            Ok(form) => form,
            Err(err) => {
                err_general.set(err);
                return;
            }
        };
        err_general.set(String::new());

        let navigate = navigate.clone();
        let slug = scope.slug.get_untracked();
        api.add_senior(&form).send_web(move |result| async move {
            match result {
                Ok(ServerRes::Done { message }) => {
                    global_state.toast_ok(message.unwrap_or_else(|| String::from("Senior added")));
                    navigate(&link_seniors(slug), Default::default());
                }
                Ok(res) => {
                    error!("add senior: expected ServerRes::Done, received: {res:?}");
                }
                Err(err) => {
                    error!("add senior: {err}");
                    global_state.toast_err(err.to_string());
                    err_general.set(err.to_string());
                }
            }
        });
    };

    view! {
        <main class="grid grid-rows-[auto_1fr] min-h-screen text-base05">
            <Nav scope=scope />
            <form class="flex flex-col gap-2 px-4 py-6 max-w-[30rem] w-full mx-auto" on:submit=on_submit>
                <h1 class="text-[1.8rem] font-black text-base0F">"Add Senior"</h1>
                <label class="flex flex-col gap-1">"Name"<input node_ref=name class="border-2 border-base02 bg-base01 px-2" /></label>
                <label class="flex flex-col gap-1">"Branch"<input node_ref=branch class="border-2 border-base02 bg-base01 px-2" /></label>
                <label class="flex flex-col gap-1">
                    "Year"
                    <select node_ref=year class="border-2 border-base02 bg-base01 px-2">
                        <option value="">"Select year"</option>
                        { SENIOR_YEARS.iter().map(|year| view! { <option value=*year>{ *year }</option> }).collect_view() }
                    </select>
                </label>
                <label class="flex flex-col gap-1">"Domain"<input node_ref=domain class="border-2 border-base02 bg-base01 px-2" /></label>
                <label class="flex flex-col gap-1">"WhatsApp"<input node_ref=whatsapp class="border-2 border-base02 bg-base01 px-2" /></label>
                <label class="flex flex-col gap-1">"Telegram (optional)"<input node_ref=telegram class="border-2 border-base02 bg-base01 px-2" /></label>
                <p class="text-base08 whitespace-pre-line">{ move || err_general.get() }</p>
                <input
                    type="submit"
                    value=move || if api.is_pending_tracked() { "Submitting..." } else { "Submit" }
                    class="border-2 border-base0E px-4 py-1 font-bold text-base0E hover:bg-base02"
                />
            </form>
        </main>
    }
}
