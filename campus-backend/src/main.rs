use anyhow::Context;
use campus_backend::{server::router, settings::Settings};
use tracing::{info, trace};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .event_format(
            tracing_subscriber::fmt::format()
                .with_file(true)
                .with_line_number(true),
        )
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    trace!("started!");

    let settings = Settings::new_from_file().context("failed to read settings")?;
    let app = router(&settings);

    let listener = tokio::net::TcpListener::bind(&settings.site.address)
        .await
        .with_context(|| format!("failed to bind {}", settings.site.address))?;
    info!("listening on http://{}", &settings.site.address);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
