//! Unified error types for the ledger, its configuration and the chat front end.

use thiserror::Error;

/// Every failure the crate can surface.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The ledger log could not be opened, read or written
    #[error("Ledger storage error: {message}")]
    Persistence {
        /// What went wrong
        message: String,
    },

    /// Aggregation was requested with a granularity other than day/week/month/year
    #[error("Unsupported period '{period}', expected one of: day, week, month, year")]
    InvalidPeriod {
        /// The rejected period name
        period: String,
    },

    /// Amount text was not a non-negative integer
    #[error("Invalid amount '{input}': must be a whole number of at least 0")]
    InvalidAmount {
        /// The rejected user input
        input: String,
    },

    /// A transaction kind other than income or expense
    #[error("Invalid transaction kind '{kind}', expected 'income' or 'expense'")]
    InvalidKind {
        /// The rejected kind string
        kind: String,
    },

    /// Chart could not be produced
    #[error("Chart error: {message}")]
    Chart {
        /// What went wrong
        message: String,
    },

    /// A required environment variable is missing
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Error bubbled up from the Discord framework
    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// One-line text suitable for a chat reply.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Persistence { .. } => {
                "❌ The ledger is unavailable right now, please try again later.".to_string()
            }
            Self::InvalidPeriod { .. } => {
                "❌ Invalid choice. Use: day, week, month, year".to_string()
            }
            Self::InvalidAmount { .. } => {
                "❌ Amount must be a whole number, e.g. `/income 1000 salary`".to_string()
            }
            Self::Chart { .. } => "❌ Could not draw the chart.".to_string(),
            other => format!("❌ An error occurred: {other}"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Persistence {
            message: value.to_string(),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Self::Persistence {
            message: value.to_string(),
        }
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
