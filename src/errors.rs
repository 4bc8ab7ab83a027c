use thiserror::Error;

/// Errors raised while resolving or running matchers.
///
/// A failing assertion is not an error: it is a `MatcherResult` with
/// `pass == false`. These variants cover the structural faults only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatchError {
    /// No scope from the innermost outward to the root registers this name.
    #[error("unknown matcher: {0}")]
    UnknownMatcher(String),

    /// The matcher's `compare` returned an error or panicked.
    #[error("matcher '{matcher}' failed: {message}")]
    MatcherExecution { matcher: String, message: String },

    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Popping the root scope would drop the built-in matchers.
    #[error("scope underflow: the root scope cannot be exited")]
    ScopeUnderflow,

    #[error("parse error: {0}")]
    Parse(String),

    #[error("config error: {0}")]
    Config(String),
}

impl MatchError {
    pub(crate) fn execution(matcher: &str, message: impl Into<String>) -> Self {
        MatchError::MatcherExecution {
            matcher: matcher.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;
