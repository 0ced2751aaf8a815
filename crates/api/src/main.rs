use careops_infra::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    careops_observability::init();

    let settings = Settings::from_env()?;
    let services = careops_api::app::services::AppServices::from_settings(&settings).await?;
    let app = careops_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    tracing::info!(
        app = %settings.app_name,
        version = %settings.app_version,
        "listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app).await?;
    Ok(())
}
