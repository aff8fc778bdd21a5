use campus_api::{Api, ApiWeb, ApiWebPlain};
use campus_shared::collection::CollegeFilter;
use campus_shared::model::{Opportunity, OpportunityForm, OpportunityKind};
use campus_shared::valid::form::proccess_opportunity;
use leptos::prelude::*;
use strum::IntoEnumIterator;
use tracing::{error, trace};
use web_sys::{Event, MouseEvent, SubmitEvent};

use crate::app::GlobalState;
use crate::app::components::nav::Nav;
use crate::app::components::pager::Pager;
use crate::app::components::status::Status;
use crate::app::hook::use_college::use_college;
use crate::app::hook::use_remote_collection::{RemoteCollection, use_remote_collection};
use crate::toolbox::prelude::*;

fn kind_label(kind: OpportunityKind) -> &'static str {
    match kind {
        OpportunityKind::Get => "Get Opportunity",
        OpportunityKind::Give => "Give Opportunity",
    }
}

fn is_owner(opportunity: &Opportunity, viewer: Option<&str>) -> bool {
    match (opportunity.owner.as_ref(), viewer) {
        (Some(owner), Some(viewer)) => owner.id() == viewer,
        _ => false,
    }
}

fn delete_opportunity(
    opportunities: RemoteCollection<Opportunity>,
    global_state: GlobalState,
    kind: OpportunityKind,
    id: String,
) {
    let began = opportunities.items.try_update(|v| v.begin(id.clone()));
    if began != Some(true) {
        return;
    }
    ApiWebPlain::new()
        .delete_opportunity(kind, &id)
        .send_web(move |result| async move {
            opportunities.items.update(|v| v.finish(&id));
            match result {
                Ok(_) => {
                    global_state.toast_ok("Opportunity deleted");
                    opportunities.reload.call(());
                }
                Err(err) => {
                    error!("delete opportunity: {err}");
                    global_state.toast_err(err.to_string());
                }
            }
        });
}

fn form_input(
    label: &'static str,
    form: RwSignal<OpportunityForm>,
    get: fn(&OpportunityForm) -> String,
    set: fn(&mut OpportunityForm, String),
) -> impl IntoView {
    view! {
        <label class="flex flex-col gap-1">
            { label }
            <input
                class="border-2 border-base02 bg-base01 px-2"
                prop:value=move || form.with(get)
                on:input=move |ev: Event| {
                    let value = event_target_value(&ev);
                    form.update(|form| set(form, value));
                }
            />
        </label>
    }
}

#[component]
pub fn Page() -> impl IntoView {
    let global_state = expect_context::<GlobalState>();
    let scope = use_college();
    let api = ApiWeb::new();
    let kind = RwSignal::new(OpportunityKind::Get);
    let show_form = RwSignal::new(false);
    let editing = RwSignal::new(None::<String>);
    let form = RwSignal::new(OpportunityForm::default());

    let opportunities = use_remote_collection::<Opportunity, _>(move || {
        let college_id = scope.id_tracked()?;
        Some(ApiWebPlain::new().get_opportunities(kind.get(), college_id))
    });

    let page = Memo::new(move |_| {
        let filter = CollegeFilter {
            college_id: scope.id_tracked().unwrap_or_default(),
        };
        opportunities.items.with(|v| {
            let page = v.view(&filter);
            (
                page.items.into_iter().cloned().collect::<Vec<_>>(),
                page.page,
                page.total_pages,
            )
        })
    });

    let open_add = move |_: MouseEvent| {
        if !global_state.is_logged_in() {
            global_state.toast_err("Please log in to add an opportunity");
            return;
        }
        editing.set(None);
        form.set(OpportunityForm::default());
        show_form.set(true);
    };

    let on_submit = move |e: SubmitEvent| {
        e.prevent_default();
        let mut input = form.get_untracked();
        input.college = scope.id_untracked();
        let input = match proccess_opportunity(input) {
            Ok(input) => input,
            Err(err) => {
                global_state.toast_err(err);
                return;
            }
        };
        let kind = kind.get_untracked();
        let req = match editing.get_untracked() {
            Some(id) => {
                trace!("editing opportunity {id}");
                api.edit_opportunity(kind, id, &input)
            }
            None => api.add_opportunity(kind, &input),
        };
        req.send_web(move |result| async move {
            match result {
                Ok(_) => {
                    global_state.toast_ok("Opportunity saved");
                    show_form.set(false);
                    editing.set(None);
                    opportunities.reload.call(());
                }
                Err(err) => {
                    error!("save opportunity: {err}");
                    global_state.toast_err(err.to_string());
                }
            }
        });
    };

    let tabs = move || {
        OpportunityKind::iter()
            .map(|tab| {
                view! {
                    <button
                        class=move || format!("border-2 px-3 py-1 {}", if kind.get() == tab { "border-base0E text-base0E" } else { "border-base02" })
                        on:click=move |_: MouseEvent| {
                            kind.set(tab);
                            opportunities.set_page(1);
                        }
                    >
                        { kind_label(tab) }
                    </button>
                }
            })
            .collect_view()
    };

    let cards = move || {
        let viewer = global_state.get_user_id_tracked();
        page.get()
            .0
            .into_iter()
            .map(|opportunity| {
                let owner = is_owner(&opportunity, viewer.as_deref());
                let id = opportunity.id.clone();
                let edit_id = id.clone();
                let pending_id = id.clone();
                let edit_form = OpportunityForm::from(&opportunity);
                view! {
                    <div class="flex flex-col gap-1 border-2 border-base02 p-3">
                        <h2 class="text-[1.1rem] font-bold text-base0F">{ opportunity.name.clone() }</h2>
                        <p class="whitespace-pre-wrap">{ opportunity.description.clone() }</p>
                        <div class="flex gap-3">
                            <a href=format!("https://wa.me/{}", opportunity.whatsapp) class="text-base0B">"WhatsApp"</a>
                            <a href=format!("mailto:{}", opportunity.email) class="text-base0D">"Email"</a>
                        </div>
                        <div class=if owner { "flex gap-3" } else { "hidden" }>
                            <button
                                class="text-base0E"
                                on:click=move |_: MouseEvent| {
                                    editing.set(Some(edit_id.clone()));
                                    form.set(edit_form.clone());
                                    show_form.set(true);
                                }
                            >
                                "Edit"
                            </button>
                            <button
                                class="text-base08"
                                disabled=move || opportunities.is_pending_tracked(&pending_id)
                                on:click=move |_: MouseEvent| delete_opportunity(opportunities, global_state, kind.get_untracked(), id.clone())
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
                    <h1 class="text-[1.8rem] font-black text-base0F">"Opportunities"</h1>
                    <button class="border-2 border-base0E px-3 py-1 text-base0E" on:click=open_add>"Add Opportunity"</button>
                </div>
                <div class="flex gap-2">{ tabs }</div>
                <form class=move || if show_form.get() { "flex flex-col gap-2 max-w-[30rem]" } else { "hidden" } on:submit=on_submit>
                    <h2 class="text-[1.2rem] font-bold">
                        { move || if editing.with(|v| v.is_some()) { "Edit Opportunity" } else { "New Opportunity" } }
                    </h2>
                    { form_input("Name", form, |f| f.name.clone(), |f, v| f.name = v) }
                    { form_input("Description", form, |f| f.description.clone(), |f, v| f.description = v) }
                    { form_input("WhatsApp", form, |f| f.whatsapp.clone(), |f, v| f.whatsapp = v) }
                    { form_input("Email", form, |f| f.email.clone(), |f, v| f.email = v) }
                    <div class="flex gap-2 justify-end">
                        <button type="button" on:click=move |_: MouseEvent| show_form.set(false)>"Cancel"</button>
                        <input
                            type="submit"
                            value=move || if api.is_pending_tracked() { "Saving..." } else { "Save" }
                            class="border-2 border-base0E px-4 text-base0E"
                        />
                    </div>
                </form>
                <Status
                    status=Signal::derive(move || opportunities.items.with(|v| v.status().clone()))
                    empty=Signal::derive(move || page.with(|v| v.0.is_empty()))
                />
                <div class="grid grid-cols-1 md:grid-cols-3 gap-4">{ cards }</div>
                <Pager
                    page=Signal::derive(move || page.with(|v| v.1))
                    total_pages=Signal::derive(move || page.with(|v| v.2))
                    on_page=Callback::new(move |page| opportunities.set_page(page))
                />
            </div>
        </main>
    }
}
