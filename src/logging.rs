use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PLANBOARD_LOG";

/// Initialise the global subscriber, filtered by `PLANBOARD_LOG` (default
/// `info`). Later calls are ignored.
pub fn init_logging() {
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|s| parse_filter(&s))
        .unwrap_or_else(|| EnvFilter::new("info"));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init();

    if result.is_err() {
        tracing::debug!("logging already initialised");
    }
}

fn parse_filter(s: &str) -> Option<EnvFilter> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let normalised = match s.to_lowercase().as_str() {
        "warning" => "warn".to_string(),
        other => other.to_string(),
    };
    EnvFilter::try_new(normalised).ok()
}
