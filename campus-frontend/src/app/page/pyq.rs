use campus_api::{Api, ApiWebPlain};
use campus_shared::collection::{
    PyqFilter, distinct, pyq_branches, pyq_courses, pyq_exam_types, pyq_years,
};
use campus_shared::model::Pyq;
use leptos::prelude::*;
use web_sys::Event;

use crate::app::components::nav::Nav;
use crate::app::components::pager::Pager;
use crate::app::components::status::Status;
use crate::app::hook::use_college::use_college;
use crate::app::hook::use_remote_collection::use_remote_collection;

fn options(values: Vec<String>) -> impl IntoView {
    values
        .into_iter()
        .map(|value| { let label = value.clone(); view! { <option value=value>{ label }</option> } })
        .collect_view()
}

#[component]
pub fn Page() -> impl IntoView {
    let scope = use_college();
    let pyqs = use_remote_collection::<Pyq, _>(|| Some(ApiWebPlain::new().get_pyqs()));
    let filter = RwSignal::new(PyqFilter::default());

    let page = Memo::new(move |_| {
        filter.with(|filter| {
            pyqs.items.with(|v| {
                let page = v.view(filter);
                (
                    page.items.into_iter().cloned().collect::<Vec<_>>(),
                    page.page,
                    page.total_pages,
                )
            })
        })
    });

    let set_field = move |set: fn(&mut PyqFilter, String)| {
        move |ev: Event| {
            let value = event_target_value(&ev);
            filter.update(|filter| set(filter, value));
            pyqs.set_page(1);
        }
    };

    let courses = move || pyqs.items.with(|v| pyq_courses(v.items()));
    let branches = move || {
        let course = filter.with(|filter| filter.course.clone());
        pyqs.items.with(|v| pyq_branches(v.items(), &course))
    };
    let years = move || pyqs.items.with(|v| pyq_years(v.items()));
    let semesters = move || pyqs.items.with(|v| distinct(v.items(), |pyq| pyq.semester.as_str()));
    let exam_types = move || pyqs.items.with(|v| pyq_exam_types(v.items()));

    let cards = move || {
        page.get()
            .0
            .into_iter()
            .map(|pyq| {
                view! {
                    <div class="flex flex-col gap-1 border-2 border-base02 p-3">
                        <h2 class="text-[1.1rem] font-bold text-base0F">{ pyq.subject_name.clone() }</h2>
                        <p class="text-base03">{ pyq.subject_code.clone() }</p>
                        <p>{ format!("Semester: {}", pyq.semester) }</p>
                        <p>{ format!("Year: {}", pyq.year) }</p>
                        <p>{ format!("{} · {}", pyq.course, pyq.branch.joined()) }</p>
                        <p>{ format!("Exam: {}", pyq.exam_type) }</p>
                        <a href=pyq.link.clone() target="_blank" rel="noopener" class="text-base0D">"View PDF"</a>
                    </div>
                }
            })
            .collect_view()
    };

    let select_class = "border-2 border-base02 bg-base01 px-2";

    view! {
        <main class="grid grid-rows-[auto_1fr] min-h-screen text-base05">
            <Nav scope=scope />
            <div class="flex flex-col gap-4 px-4 py-6">
                <h1 class="text-[1.8rem] font-black text-base0F">"Previous Year Questions (PYQ)"</h1>
                <div class="flex flex-wrap gap-2">
                    <input
                        class=select_class
                        placeholder="Search subject"
                        on:input=set_field(|filter, value| filter.search = value)
                    />
                    <select class=select_class on:change=set_field(|filter, value| filter.year = value)>
                        <option value="">"All years"</option>
                        { move || options(years()) }
                    </select>
                    <select class=select_class on:change=set_field(|filter, value| filter.semester = value)>
                        <option value="">"All semesters"</option>
                        { move || options(semesters()) }
                    </select>
                    <select
                        class=select_class
                        on:change=set_field(|filter, value| {
                            filter.course = value;
                            filter.branch = String::new();
                        })
                    >
                        <option value="">"All courses"</option>
                        { move || options(courses()) }
                    </select>
                    <select
                        class=select_class
                        prop:value=move || filter.with(|filter| filter.branch.clone())
                        on:change=set_field(|filter, value| filter.branch = value)
                    >
                        <option value="">"All branches"</option>
                        { move || options(branches()) }
                    </select>
                    <select class=select_class on:change=set_field(|filter, value| filter.exam_type = value)>
                        <option value="">"All exams"</option>
                        { move || options(exam_types()) }
                    </select>
                </div>
                <Status
                    status=Signal::derive(move || pyqs.items.with(|v| v.status().clone()))
                    empty=Signal::derive(move || page.with(|v| v.0.is_empty()))
                />
                <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
                    { cards }
                </div>
                <Pager
                    page=Signal::derive(move || page.with(|v| v.1))
                    total_pages=Signal::derive(move || page.with(|v| v.2))
                    on_page=Callback::new(move |page| pyqs.set_page(page))
                />
            </div>
        </main>
    }
}
