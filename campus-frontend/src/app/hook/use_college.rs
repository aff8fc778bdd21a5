use campus_shared::model::College;
use leptos::prelude::*;
use leptos_router::hooks::use_params_map;

use crate::app::GlobalState;

/// The college the current route is scoped to, resolved from its slug.
#[derive(Clone, Copy)]
pub struct CollegeScope {
    pub slug: Memo<String>,
    pub college: Memo<Option<College>>,
}

impl CollegeScope {
    pub fn id_tracked(&self) -> Option<String> {
        self.college
            .with(|college| college.as_ref().map(|college| college.id.clone()))
    }

    pub fn id_untracked(&self) -> Option<String> {
        self.college
            .with_untracked(|college| college.as_ref().map(|college| college.id.clone()))
    }

    pub fn name_tracked(&self) -> String {
        self.college
            .with(|college| college.as_ref().map(|college| college.name.clone()))
            .unwrap_or_else(|| self.slug.get())
    }
}

pub fn use_param(name: &'static str) -> Memo<String> {
    let params = use_params_map();
    Memo::new(move |_| params.read().get(name).unwrap_or_default())
}

pub fn use_college() -> CollegeScope {
    let global_state = expect_context::<GlobalState>();
    let slug = use_param("college");
    let college = Memo::new(move |_| {
        let slug = slug.get();
        global_state.get_college_by_slug_tracked(&slug)
    });

    CollegeScope { slug, college }
}
