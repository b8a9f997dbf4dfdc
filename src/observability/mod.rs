//! Logging setup
//!
//! Library code reports through [`Diagnostics`](crate::diagnostics::Diagnostics)
//! or plain `tracing` macros and never installs a subscriber itself. Binaries
//! call [`init`] once at startup.
//!
//! ```ignore
//! use iggy::observability::{init, LogFormat, ObservabilityConfig};
//!
//! let config = ObservabilityConfig::builder()
//!     .log_format(LogFormat::Compact)
//!     .log_filter("iggy=debug")
//!     .build();
//! init(&config)?;
//! ```

mod config;
mod providers;

pub use config::{LogFormat, ObservabilityConfig, ObservabilityConfigBuilder};

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the filter directive is invalid or a subscriber is
/// already installed.
pub fn init(config: &ObservabilityConfig) -> Result<(), ObservabilityError> {
    providers::init_tracing(config)?;

    tracing::debug!(
        log_format = ?config.log_format,
        log_filter = %config.log_filter,
        "Observability initialized"
    );

    Ok(())
}

/// Observability initialization errors
#[derive(Debug)]
pub enum ObservabilityError {
    /// Invalid configuration
    Config(String),
    /// Subscriber installation failed
    Provider(String),
}

impl std::fmt::Display for ObservabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Observability config error: {}", msg),
            Self::Provider(msg) => write!(f, "Provider error: {}", msg),
        }
    }
}

impl std::error::Error for ObservabilityError {}
