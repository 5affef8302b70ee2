//! Unified error type.

use http::{Method, StatusCode};

/// The error type carried through every fallible operation in the pipeline.
///
/// Hook failures travel through [`Processor::process_exception`] as values of
/// this type, so middlewares can translate one variant into another (a
/// low-level [`Error::Other`] into a user-facing [`Error::Http`], say) before
/// the transport layer renders it.
///
/// [`Processor::process_exception`]: crate::Processor::process_exception
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Binding to a port or accepting a connection failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Reading the request body from the connection failed.
    #[error("body: {0}")]
    Body(#[from] hyper::Error),

    /// A [`Chain`](crate::Chain) lookup by name found nothing.
    #[error("no entry named `{0}`")]
    NotFound(String),

    /// No binding matches the request path.
    #[error("no route for {method} {path}")]
    NoRoute { method: Method, path: String },

    /// A binding matches the path but not the method.
    #[error("method {method} not allowed for {path}")]
    MethodNotAllowed { method: Method, path: String },

    /// A binding path could not be compiled into the route table.
    #[error("invalid route `{path}`: {reason}")]
    InvalidRoute { path: String, reason: String },

    /// The reply phase ran out of middlewares without reaching a final
    /// response. A registration bug, never a transient condition.
    #[error("middlewares did not produce a final response")]
    Contract,

    /// A user-facing failure with an explicit status.
    #[error("{status}: {message}")]
    Http { status: StatusCode, message: String },

    /// Anything else a responder or hook wants to propagate.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Shorthand for [`Error::Http`].
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http { status, message: message.into() }
    }

    /// Wraps an arbitrary error as [`Error::Other`].
    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Other(err.into())
    }

    /// The HTTP status this error renders as when it reaches the transport.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Body(_) => StatusCode::BAD_REQUEST,
            Self::NoRoute { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Http { status, .. } => *status,
            Self::Io(_)
            | Self::NotFound(_)
            | Self::InvalidRoute { .. }
            | Self::Contract
            | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
