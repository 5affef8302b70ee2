//! Reply values: what responders produce and data hooks refine.
//!
//! A responder does not have to build an HTTP response itself. It may return
//! a plain payload wrapped in [`Data`] and leave the conversion to a
//! middleware's data hook (serialisation, templating, ...). The reply phase
//! keeps handing the value along until it becomes a [`Response`].

use std::any::Any;
use std::fmt;

use http::StatusCode;

use crate::error::Error;
use crate::response::{IntoResponse, Response};

/// A type-erased intermediate payload.
pub struct Payload(Box<dyn Any + Send>);

impl Payload {
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self(Box::new(value))
    }

    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// Takes the payload out as `T`, or gives it back unchanged.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        self.0.downcast::<T>().map(|b| *b).map_err(Self)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Payload(..)")
    }
}

/// A reply travelling through the reply phase.
#[derive(Debug)]
pub enum Reply {
    /// Transport-ready. Ends the reply phase.
    Response(Response),
    /// Not yet a response; some data hook still has to convert it.
    Data(Payload),
}

impl Reply {
    pub fn data<T: Any + Send>(value: T) -> Self {
        Self::Data(Payload::new(value))
    }

    /// Whether this reply is a final response.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Response(_))
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Response(res) => Some(res),
            Self::Data(_) => None,
        }
    }
}

impl From<Response> for Reply {
    fn from(res: Response) -> Self {
        Self::Response(res)
    }
}

/// Marks a responder return value as intermediate data.
///
/// ```rust
/// use interest::{Data, Request};
///
/// async fn count(_req: Request) -> Data<u64> {
///     Data(42)
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Data<T>(pub T);

// ── IntoReply ─────────────────────────────────────────────────────────────────

/// Conversion of responder outputs into a [`Reply`].
///
/// Strings and status codes become final responses right away, the way a
/// handler returning them would expect. Wrap a value in [`Data`] to defer the
/// conversion to the middlewares.
pub trait IntoReply {
    fn into_reply(self) -> Result<Reply, Error>;
}

impl IntoReply for Reply {
    fn into_reply(self) -> Result<Reply, Error> { Ok(self) }
}

impl IntoReply for Response {
    fn into_reply(self) -> Result<Reply, Error> { Ok(Reply::Response(self)) }
}

impl IntoReply for StatusCode {
    fn into_reply(self) -> Result<Reply, Error> { Ok(Reply::Response(self.into_response())) }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> Result<Reply, Error> { Ok(Reply::Response(self.into_response())) }
}

impl IntoReply for String {
    fn into_reply(self) -> Result<Reply, Error> { Ok(Reply::Response(self.into_response())) }
}

impl<T: Any + Send> IntoReply for Data<T> {
    fn into_reply(self) -> Result<Reply, Error> { Ok(Reply::data(self.0)) }
}

impl<R, E> IntoReply for Result<R, E>
where
    R: IntoReply,
    E: Into<Error>,
{
    fn into_reply(self) -> Result<Reply, Error> {
        self.map_err(Into::into)?.into_reply()
    }
}
