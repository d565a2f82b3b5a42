use log::LevelFilter;
use simplelog::{ConfigBuilder, SimpleLogger};

/// Stdout logger for non prod runs: app logs plus the ntex request log line.
pub fn setup_simple_logger(level: LevelFilter) -> anyhow::Result<()> {
    let logger_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("vet_clinic")
        .add_filter_allow_str("ntex::web::middleware::logger")
        .build();

    Ok(SimpleLogger::init(level, logger_config)?)
}
