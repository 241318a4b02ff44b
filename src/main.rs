use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use docchat::app::App;
use docchat::config::{ClientConfig, APP_NAME};
use docchat::providers::HttpBackend;
use docchat::ui::terminal::TerminalView;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = ClientConfig::load(config_path.as_deref())?;
    tracing::info!("{} talking to {}", APP_NAME, config.base_url);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let backend = Arc::new(HttpBackend::new(&config)?);
        let mut app = App::new(&config, backend, TerminalView::stdio());
        app.start().await;
        app.run_terminal().await
    })
}
