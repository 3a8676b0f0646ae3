use anyhow::{Context, Result};

use honeyshell::config::Settings;
use honeyshell::events::EventSink;
use honeyshell::fs::Fs;
use honeyshell::server::HoneypotServer;
use honeyshell::shell::prompt;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_env()?;

    let default_directive = if settings.debug {
        "honeyshell=debug"
    } else {
        "honeyshell=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_directive.parse()?),
        )
        .init();

    let raw = std::fs::read_to_string(&settings.files_config).with_context(|| {
        format!(
            "Error reading FILES_CONFIG {}",
            settings.files_config.display()
        )
    })?;
    let fs = Fs::from_yaml(&raw)?;
    tracing::info!(config = %settings.files_config.display(), "Loaded fake filesystem");

    let sink = EventSink::new(&settings.elasticsearch_url);
    let hostname = prompt::hostname();

    HoneypotServer::new(fs, sink, hostname)
        .run(settings.port)
        .await
}
