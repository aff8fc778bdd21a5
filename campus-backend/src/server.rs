use std::path::Path;

use axum::{
    Router,
    http::{Method, header},
    routing::get,
};
use tower_http::{
    compression::{CompressionLayer, predicate},
    cors::{self, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{debug, trace};

use crate::settings::{AppInfo, Settings};

pub const PATH_MANIFEST: &str = "/manifest.webmanifest";
pub const PATH_SERVICE_WORKER: &str = "/sw.js";
pub const SERVICE_WORKER: &str = include_str!("sw.js");

pub fn manifest(app: &AppInfo) -> serde_json::Value {
    serde_json::json!({
        "name": app.name,
        "short_name": app.short_name,
        "start_url": "/",
        "display": "standalone",
        "theme_color": app.theme_color,
        "background_color": app.background_color,
    })
}

/// Shell router: manifest, service worker and the built bundle.
/// Client routes fall back to `index.html`.
pub fn router(settings: &Settings) -> Router {
    let manifest = manifest(&settings.app).to_string();
    let root = Path::new(&settings.site.root);
    let index = root.join("index.html");
    debug!("serving {root:?} with fallback {index:?}");

    let comppression_layer = CompressionLayer::new()
        .br(true)
        .zstd(true)
        .gzip(true)
        .deflate(true)
        .compress_when(predicate::SizeAbove::new(0));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_origin(cors::Any);

    Router::new()
        .route(
            PATH_MANIFEST,
            get(move || {
                trace!("manifest requested");
                let manifest = manifest.clone();
                async move { ([(header::CONTENT_TYPE, "application/manifest+json")], manifest) }
            }),
        )
        .route(
            PATH_SERVICE_WORKER,
            get(|| async {
                (
                    [
                        (header::CONTENT_TYPE, "text/javascript"),
                        (header::CACHE_CONTROL, "no-cache"),
                    ],
                    SERVICE_WORKER,
                )
            }),
        )
        .fallback_service(ServeDir::new(root).fallback(ServeFile::new(index)))
        .layer(cors)
        .layer(comppression_layer)
        .layer(TraceLayer::new_for_http())
}
