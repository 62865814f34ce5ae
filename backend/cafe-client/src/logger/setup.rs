//! Setup logging subsystem.

use tracing_subscriber::{
    filter::{Directive, LevelFilter},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use super::config::{Log, LogFormat};
use crate::error::ConfigurationError;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs the global subscriber. Logs are written to stderr so command output on stdout
/// stays machine readable.
pub fn setup(
    config: &Log,
    service_name: &str,
    crates_to_filter: impl AsRef<[&'static str]>,
) -> Result<(), ConfigurationError> {
    let console_layer = config.console.enabled.then(|| {
        let filter = get_envfilter(
            config.console.filtering_directive.as_deref(),
            config.console.level.into_level(),
            crates_to_filter.as_ref(),
        );
        let layer: BoxedLayer = match config.console.log_format {
            LogFormat::Default => fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(filter)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(std::io::stderr)
                .with_filter(filter)
                .boxed(),
        };
        layer
    });

    tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .map_err(|error| ConfigurationError::LoggerInitialization(error.to_string()))?;

    tracing::debug!(service = service_name, "logger initialized");
    Ok(())
}

/// `RUST_LOG` wins over the configured directive, which wins over the per-crate default.
fn get_envfilter(
    filtering_directive: Option<&str>,
    default_log_level: tracing::Level,
    crates_to_filter: &[&str],
) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let builder = EnvFilter::builder().with_default_directive(LevelFilter::WARN.into());
    match filtering_directive {
        Some(directive) => builder.parse_lossy(directive),
        None => crate_directives(crates_to_filter, default_log_level)
            .fold(builder.parse_lossy(""), EnvFilter::add_directive),
    }
}

fn crate_directives<'a>(
    crates: &'a [&str],
    level: tracing::Level,
) -> impl Iterator<Item = Directive> + 'a {
    crates
        .iter()
        .filter_map(move |krate| {
            format!("{krate}={}", level.as_str().to_ascii_lowercase())
                .parse()
                .ok()
        })
}
