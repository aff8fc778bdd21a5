use std::sync::Arc;

use campus_api::{ApiReq, ServerRes};
use campus_shared::collection::Collection;
use campus_shared::model::{
    Branch, College, Course, Opportunity, Pyq, Senior, Subject, SubjectNote,
};
use leptos::prelude::*;
use tracing::{error, trace};

use crate::app::GlobalState;
use crate::toolbox::prelude::*;

/// List entity that a [`ServerRes`] can carry.
pub trait FromServerRes: Sized {
    fn from_res(res: ServerRes) -> Result<Vec<Self>, ServerRes>;
}

macro_rules! from_server_res {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromServerRes for $ty {
                fn from_res(res: ServerRes) -> Result<Vec<Self>, ServerRes> {
                    match res {
                        ServerRes::$variant(items) => Ok(items),
                        res => Err(res),
                    }
                }
            }
        )*
    };
}

from_server_res! {
    College => Colleges,
    Senior => Seniors,
    Pyq => Pyqs,
    Course => Courses,
    Branch => Branches,
    Subject => Subjects,
    SubjectNote => Notes,
    Opportunity => Opportunities,
}

pub struct RemoteCollection<T: Send + Sync + 'static> {
    pub items: RwSignal<Collection<T>>,
    pub reload: StoredFn<()>,
}

impl<T: Send + Sync + 'static> Clone for RemoteCollection<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Send + Sync + 'static> Copy for RemoteCollection<T> {}

impl<T: Send + Sync + 'static> RemoteCollection<T> {
    pub fn is_loading_tracked(&self) -> bool {
        self.items.with(|v| v.status().is_loading())
    }

    pub fn is_pending_tracked(&self, id: &str) -> bool {
        self.items.with(|v| v.is_pending(id))
    }

    pub fn set_page(&self, page: usize) {
        self.items.update(|v| v.set_page(page));
    }
}

/// Fetches the list built by `request` and refetches whenever its tracked inputs change.
/// `request` returning `None` means the inputs are not ready yet.
pub fn use_remote_collection<T, F>(request: F) -> RemoteCollection<T>
where
    T: FromServerRes + std::fmt::Debug + Send + Sync + 'static,
    F: Fn() -> Option<ApiReq> + Send + Sync + 'static,
{
    let global_state = expect_context::<GlobalState>();
    let items = RwSignal::new(Collection::<T>::new());
    let request = Arc::new(request);

    let load = move |req: ApiReq| {
        items.update(|v| v.begin_load());
        req.send_web(move |result| async move {
            let r = match result.map(T::from_res) {
                Ok(Ok(list)) => {
                    trace!("collection received {} items", list.len());
                    items.try_update(|v| v.loaded(list))
                }
                Ok(Err(res)) => {
                    error!("use_remote_collection: unexpected response {res:?}");
                    items.try_update(|v| v.failed("unexpected response"))
                }
                Err(err) => {
                    error!("use_remote_collection: {err}");
                    global_state.toast_err(err.to_string());
                    items.try_update(|v| v.failed(err.to_string()))
                }
            };
            if r.is_none() {
                trace!("collection disposed before response");
            }
        });
    };

    Effect::new({
        let request = request.clone();
        move || {
            if let Some(req) = request() {
                load(req);
            }
        }
    });

    let reload = move |_: ()| {
        if let Some(req) = untrack(|| request()) {
            load(req);
        }
    };

    RemoteCollection {
        items,
        reload: StoredValue::new(Box::new(reload)),
    }
}

#[cfg(test)]
mod remote_collection_tests {
    use super::FromServerRes;
    use campus_api::ServerRes;
    use campus_shared::model::{College, Senior};
    use pretty_assertions::assert_eq;
    use test_log::test;

    #[test]
    fn test_from_server_res() {
        let colleges = vec![College {
            id: String::from("c1"),
            name: String::from("Integral University"),
        }];
        let res = ServerRes::Colleges(colleges.clone());
        assert_eq!(College::from_res(res), Ok(colleges));

        let res = ServerRes::Done { message: None };
        assert_eq!(Senior::from_res(res.clone()), Err(res));
    }
}
