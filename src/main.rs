use std::process::ExitCode;

use anyhow::Result;

use pylon::config::AppConfig;
use pylon::console::StdConsole;
use pylon::host::HostCli;
use pylon::plugin::loader::PluginLoader;
use pylon::plugin::store::ArtifactStore;

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code.clamp(0, 255) as u8),
        Err(err) => {
            eprintln!("pylon error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<i32> {
    let config = AppConfig::load()?;

    // Logging to file (never stdout)
    let log_dir = directories::ProjectDirs::from("", "", "pylon")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::path::PathBuf::from("/tmp"));
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "pylon.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(config.general.log_filter.as_str())
        .init();

    tracing::info!("pylon starting");

    // Plugins load once, strictly before dispatch.
    let store = ArtifactStore::resolve(&config);
    let loaded = PluginLoader::new(&store).load_all();
    tracing::info!("loaded {} plugin(s)", loaded.len());

    let mut host = HostCli::new(store);
    host.register_all(loaded);

    let argv: Vec<String> = std::env::args().collect();
    let mut console = StdConsole;
    host.run(&argv, &mut console)
}
