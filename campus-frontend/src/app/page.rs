pub mod community;
pub mod notes;
pub mod opportunities;
pub mod post;
pub mod pyq;
pub mod seniors;

pub mod not_found {
    use campus_shared::path::PATH_HOME;
    use leptos::prelude::*;

    use crate::app::components::nav::Nav;

    #[component]
    pub fn Page() -> impl IntoView {
        view! {
            <main class="grid grid-rows-[auto_1fr] h-screen text-base05">
                <Nav />
                <div class="grid place-items-center gap-2">
                    <p class="text-[1.5rem]">"Not Found"</p>
                    <a href=PATH_HOME class="text-base0D">"Back home"</a>
                </div>
            </main>
        }
    }
}

pub mod home {
    use campus_shared::path::{college_slug, link_college};
    use leptos::prelude::*;
    use leptos_router::hooks::use_navigate;
    use tracing::trace;
    use web_sys::SubmitEvent;

    use crate::app::GlobalState;
    use crate::app::components::nav::Nav;
    use crate::app::components::status::Status;

    #[component]
    pub fn Page() -> impl IntoView {
        let global_state = expect_context::<GlobalState>();
        let navigate = use_navigate();
        let selected = RwSignal::new(String::new());

        let options = move || {
            global_state.colleges.with(|colleges| {
                colleges
                    .items()
                    .iter()
                    .map(|college| {
                        let slug = college_slug(&college.name);
                        view! { <option value=slug>{ college.name.clone() }</option> }
                    })
                    .collect_view()
            })
        };
        let is_empty = Signal::derive(move || global_state.colleges.with(|v| v.items().is_empty()));

        let on_go = move |e: SubmitEvent| {
            e.prevent_default();
            let slug = selected.get_untracked();
            if slug.is_empty() {
                global_state.toast_err("Please select a college");
                return;
            }
            trace!("navigating to {slug}");
            navigate(&link_college(slug), Default::default());
        };

        view! {
            <main class="grid grid-rows-[auto_1fr] min-h-screen text-base05">
                <Nav />
                <div class="flex flex-col gap-4 items-center justify-center px-4">
                    <h1 class="text-[2rem] font-black text-base0F">"Your college, your resources"</h1>
                    <p class="text-base03">"Seniors, notes, previous year papers and a community for every campus."</p>
                    <Status status=Signal::derive(move || global_state.colleges_status_tracked()) empty=is_empty />
                    <form class="flex gap-2" on:submit=on_go>
                        <select
                            class="border-2 border-base0E bg-base01 px-2 py-1"
                            on:change=move |ev| selected.set(event_target_value(&ev))
                        >
                            <option value="">"Select your college"</option>
                            { options }
                        </select>
                        <input type="submit" value="Go" class="border-2 border-base0E px-4 font-bold text-base0E hover:bg-base02" />
                    </form>
                </div>
            </main>
        }
    }
}

pub mod college {
    use campus_shared::path::{
        link_community, link_notes, link_opportunities, link_pyq, link_seniors,
    };
    use leptos::prelude::*;
    use leptos_meta::Title;

    use crate::app::APP_TITLE;
    use crate::app::components::nav::Nav;
    use crate::app::hook::use_college::use_college;

    #[component]
    pub fn Page() -> impl IntoView {
        let scope = use_college();
        let title = move || format!("{} | {APP_TITLE}", scope.name_tracked());
        let card = |href: String, title: &'static str, about: &'static str| {
            view! {
                <a href=href class="flex flex-col gap-1 border-2 border-base02 p-4 hover:bg-base01">
                    <h2 class="text-[1.2rem] font-bold text-base0F">{ title }</h2>
                    <p class="text-base03">{ about }</p>
                </a>
            }
        };
        let cards = move || {
            let slug = scope.slug.get();
            view! {
                { card(link_seniors(&slug), "Seniors", "Reach out to seniors of your branch.") }
                { card(link_pyq(&slug), "PYQ", "Previous year question papers.") }
                { card(link_notes(&slug), "Notes", "Notes shared by students, per subject.") }
                { card(link_community(&slug), "Community", "Ask, answer and discuss.") }
                { card(link_opportunities(&slug), "Opportunities", "Internships and gigs to get or give.") }
            }
        };

        view! {
            <Title text=title />
            <main class="grid grid-rows-[auto_1fr] min-h-screen text-base05">
                <Nav scope=scope />
                <div class="flex flex-col gap-4 px-4 py-6">
                    <h1 class="text-[1.8rem] font-black text-base0F">{ move || scope.name_tracked() }</h1>
                    <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
                        { cards }
                    </div>
                </div>
            </main>
        }
    }
}

pub mod install {
    use gloo::events::EventListener;
    use leptos::prelude::*;
    use send_wrapper::SendWrapper;
    use tracing::{debug, error, info};
    use wasm_bindgen::JsCast;
    use web_sys::js_sys::{Function, Reflect};

    use crate::app::GlobalState;
    use crate::app::components::nav::Nav;

    #[derive(Debug, Clone, Copy, PartialEq, strum::Display, strum::EnumIs)]
    #[strum(serialize_all = "lowercase")]
    pub enum InstallStage {
        Unavailable,
        Ready,
        Installed,
    }

    fn prompt(event: &web_sys::Event) -> Result<(), String> {
        let prompt = Reflect::get(event, &"prompt".into()).map_err(|err| format!("{err:?}"))?;
        let prompt = prompt
            .dyn_into::<Function>()
            .map_err(|_| String::from("install prompt is not callable"))?;
        prompt.call0(event).map_err(|err| format!("{err:?}"))?;
        Ok(())
    }

    #[component]
    pub fn Page() -> impl IntoView {
        let global_state = expect_context::<GlobalState>();
        let stage = RwSignal::new(InstallStage::Unavailable);
        let deferred = StoredValue::new(None::<SendWrapper<web_sys::Event>>);

        if let Some(window) = web_sys::window() {
            let listener = EventListener::new(&window, "beforeinstallprompt", move |event| {
                event.prevent_default();
                debug!("install prompt deferred");
                deferred.set_value(Some(SendWrapper::new(event.clone())));
                stage.set(InstallStage::Ready);
            });
            let listener = SendWrapper::new(listener);
            on_cleanup(move || drop(listener));
        }

        let on_install = move |_: web_sys::MouseEvent| {
            let Some(event) = deferred.get_value() else {
                global_state.toast_err("Install is not available on this browser");
                return;
            };
            match prompt(&event) {
                Ok(()) => {
                    info!("install prompt shown");
                    deferred.set_value(None);
                    stage.set(InstallStage::Installed);
                }
                Err(err) => {
                    error!("install prompt failed {err}");
                    global_state.toast_err(err);
                }
            }
        };

        view! {
            <main class="grid grid-rows-[auto_1fr] min-h-screen text-base05">
                <Nav />
                <div class="flex flex-col gap-4 items-center justify-center px-4">
                    <h1 class="text-[1.8rem] font-black text-base0F">"Install Student Senior"</h1>
                    <p class="text-base03">"Add the portal to your home screen for quick access."</p>
                    <button
                        class="border-2 border-base0E px-4 py-1 font-bold text-base0E disabled:text-base03 disabled:border-base03"
                        disabled=move || !stage.get().is_ready()
                        on:click=on_install
                    >
                        { move || match stage.get() {
                            InstallStage::Unavailable => "Not available",
                            InstallStage::Ready => "Install",
                            InstallStage::Installed => "Installed",
                        } }
                    </button>
                </div>
            </main>
        }
    }
}
