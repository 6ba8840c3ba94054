//! Tracing configuration module for structured logging
//!
//! The library itself only emits spans and events through the helpers in
//! [`spans`] and [`events`]. Installing a subscriber is left to applications;
//! [`TracingConfig::init`] and [`init_cli_tracing`] do that for the bundled
//! CLI and are only available with the `cli` feature.

#[cfg(feature = "cli")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Configuration for tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable console output with colors (default for CLI)
    Console,
    /// Compact console output without ANSI colors, for CI logs
    Compact,
    /// JSON structured logging
    #[cfg(feature = "tracing-json")]
    Json,
}

/// Tracing configuration builder
#[derive(Debug)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
    /// Output format
    pub format: TracingFormat,
    /// Environment filter string (overrides verbosity if set)
    pub env_filter: Option<String>,
    /// Session ID for correlating a dataset sweep
    pub session_id: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            format: TracingFormat::Console,
            env_filter: None,
            session_id: None,
        }
    }
}

impl TracingConfig {
    /// Create a new tracing configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity level (0-2+)
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set output format
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Set custom environment filter
    #[must_use]
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Set session ID
    #[must_use]
    pub fn with_session_id<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Convert verbosity level to tracing filter string
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info",  // decode warnings and sweep summaries
            1 => "debug", // -v: chosen windows, provider construction
            _ => "trace", // -vv+
        }
    }

    /// Initialize the global tracing subscriber
    #[cfg(feature = "cli")]
    pub fn init(self) -> anyhow::Result<()> {
        use tracing_subscriber::fmt;

        let filter = if let Some(env_filter) = &self.env_filter {
            EnvFilter::try_new(env_filter)?
        } else {
            EnvFilter::try_new(self.verbosity_to_filter())?
        };

        let registry = Registry::default().with(filter);

        match self.format {
            TracingFormat::Console => {
                let fmt_layer = fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_level(true)
                    .compact();

                registry.with(fmt_layer).try_init()?;
            },

            TracingFormat::Compact => {
                let fmt_layer = fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact();

                registry.with(fmt_layer).try_init()?;
            },

            #[cfg(feature = "tracing-json")]
            TracingFormat::Json => {
                let fmt_layer = fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true);

                registry.with(fmt_layer).try_init()?;
            },
        }

        if let Some(session_id) = &self.session_id {
            tracing::info!(session_id = %session_id, "clip sampler session started");
        }

        Ok(())
    }
}

/// Initialize tracing with CLI-friendly defaults and a fresh session ID
#[cfg(feature = "cli")]
pub fn init_cli_tracing(verbosity: u8) -> anyhow::Result<()> {
    let session_id = uuid::Uuid::new_v4().to_string();

    TracingConfig::new()
        .with_verbosity(verbosity)
        .with_format(TracingFormat::Console)
        .with_session_id(session_id)
        .init()
}

/// Span creation helpers for common operations
pub mod spans {
    use std::path::Path;
    use tracing::{Level, Span};

    /// Span covering one `VideoDataset::get` call
    pub fn sample_loading(index: usize, label: u32) -> Span {
        tracing::span!(Level::DEBUG, "sample_loading", index = %index, label = %label)
    }

    /// Span covering assembly of one volume from a frame directory
    pub fn assembly(frame_dir: &Path, usage: &str, clips: usize) -> Span {
        tracing::span!(
            Level::DEBUG,
            "assembly",
            frame_dir = %frame_dir.display(),
            usage = %usage,
            clips = %clips
        )
    }

    /// Span covering a full pass over a dataset
    pub fn dataset_sweep(dataset: &str, sample_count: usize) -> Span {
        tracing::span!(
            Level::INFO,
            "dataset_sweep",
            dataset = %dataset,
            sample_count = %sample_count
        )
    }
}

/// Event helpers for common logging patterns
pub mod events {
    use std::path::Path;
    use tracing::{debug, warn};

    /// A frame failed to decode; its buffer slot keeps its previous contents
    pub fn decode_failure(path: &Path, error: &dyn std::error::Error) {
        warn!(
            path = %path.display(),
            error = %error,
            "could not decode frame, leaving slot unfilled"
        );
    }

    /// A volume finished assembling
    pub fn sample_loaded(shape: &[usize], decode_failures: usize) {
        debug!(
            shape = ?shape,
            decode_failures = %decode_failures,
            "volume assembled"
        );
    }
}
