use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lectern_app::Application;
use lectern_kernel::settings::Settings;

/// Lectern book catalog service
#[derive(Debug, Parser)]
#[command(name = "lectern", version, about)]
struct Cli {
    /// Directory holding base.toml and per-environment overlays
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Environment overlay to load (local, staging, production)
    #[arg(long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve the HTTP API (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Print the resolved configuration
    Config,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        if self.config_dir.is_none() && self.env.is_none() {
            return Settings::load();
        }

        let config_dir = match &self.config_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };
        let env = match &self.env {
            Some(env) => env.clone(),
            None => std::env::var("LECTERN_ENV").unwrap_or_else(|_| "local".to_string()),
        };
        Settings::load_from(&config_dir, &env)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli
        .settings()
        .with_context(|| "failed to load Lectern settings")?;
    lectern_telemetry::init(&settings.telemetry);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!(env = ?settings.environment, "lectern serve");
            Application::build(settings).await?.run().await
        }
        Command::Migrate => {
            let app = Application::build(settings).await?;
            let applied = app.migrate().await;
            app.close().await;
            println!("applied {} migration(s)", applied?);
            Ok(())
        }
        Command::Config => {
            println!("{settings:#?}");
            Ok(())
        }
    }
}
