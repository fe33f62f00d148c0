use anyhow::Context;
use lectern_app::Application;
use lectern_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Lectern settings")?;
    lectern_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "lectern-app bootstrap starting"
    );

    let app = Application::build(settings).await?;

    tracing::info!("lectern-app bootstrap complete");
    app.run().await
}
