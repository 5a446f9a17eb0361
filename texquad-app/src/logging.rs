use color_eyre::Report;
use tracing::Level;
use tracing_subscriber::{
    Layer, filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Configuration for the logging system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default level for console output; `RUST_LOG` directives take precedence
    pub level: Level,
    /// Whether to emit JSON formatted logs for structured output
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: Level::INFO, json_format: false }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(level) = var("TEXQUAD_LOG_LEVEL").and_then(|l| l.parse::<Level>().ok()) {
            config.level = level;
        }

        if var("TEXQUAD_JSON_LOGS").is_some() {
            config.json_format = true;
        }

        config
    }

    /// Overrides the level when the command line names one.
    #[must_use]
    pub fn with_level(mut self, level: Option<Level>) -> Self {
        if let Some(level) = level {
            self.level = level;
        }
        self
    }
}

/// Initialize the logging system with the given configuration
pub fn init_logging(config: &LoggingConfig) -> Result<(), Report> {
    let filter = EnvFilter::builder()
        .with_default_directive(config.level.into())
        .from_env_lossy()
        // winit logs every event loop iteration at trace
        .add_directive("winit=info".parse()?);

    let layer = if config.json_format {
        fmt::layer()
            .json()
            .with_filter(filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_filter(filter)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()?;

    Ok(())
}
