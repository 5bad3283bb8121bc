use crate::config_loader::MasterConfig;
use env_logger::Builder;
use log::LevelFilter;

/// Log level precedence: `--debug` flag, then the config file, then info.
pub fn initialize_logging(config: Option<&MasterConfig>, cli_matches: &clap::ArgMatches) {
    let level = if cli_matches.get_flag("debug") {
        LevelFilter::Debug
    } else {
        let configured = config
            .and_then(|c| c.app_settings.log_level.as_deref())
            .unwrap_or("info");
        match configured.to_lowercase().as_str() {
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            other => {
                // The logger is not up yet, so this goes straight to stderr.
                eprintln!("Unrecognized log level '{}', defaulting to info.", other);
                LevelFilter::Info
            }
        }
    };

    let mut builder = Builder::new();
    builder.filter_level(level);
    builder.try_init().unwrap_or_else(|e| {
        eprintln!(
            "Failed to initialize logger: {}. Continuing without structured logs.",
            e
        );
    });
}
