use app::App;

pub mod app;
pub mod logger;
pub mod toolbox;

#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    logger::simple_web_logger_init();
    tracing::debug!("mounting app");
    leptos::mount::mount_to_body(App);
}
