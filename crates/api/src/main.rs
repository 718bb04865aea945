use anyhow::Context;

use warden_api::settings::{DEV_JWT_SECRET, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut settings = Settings::load().context("failed to load settings")?;

    warden_observability::init(&settings.log);

    if settings.jwt_secret_missing() {
        tracing::warn!("auth.jwt_secret not set; using insecure dev default");
        settings.auth.jwt_secret = DEV_JWT_SECRET.to_string();
    }

    let app = warden_api::app::build_app(&settings).context("failed to build app")?;

    let addr = settings.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
