use nonfollowers_core::http::rate_limit_suffix;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("{message}{}", reset_suffix(.reset_at))]
    RateLimited {
        status: u16,
        message: String,
        /// Unix seconds at which the quota refills, when the platform says
        reset_at: Option<i64>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Session cache error: {0}")]
    Session(String),
}

impl Error {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } | Error::RateLimited { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn reset_suffix(reset_at: &Option<i64>) -> String {
    rate_limit_suffix(*reset_at)
}
