//! Adapter for handler-wrapping middleware written as closures.
//!
//! Plenty of middleware is easiest to express as "take the request and the
//! rest of the pipeline, return a reply". [`Adapter`] turns such a closure
//! into an intercepting [`Middleware`].

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use super::{Intercept, Middleware};
use crate::error::Error;
use crate::reply::{IntoReply, Reply};
use crate::request::Request;
use crate::responder::BoxFuture;
use crate::service::{Service, dispatch};

/// The default continuation handed to an [`Adapter`] closure.
pub struct Next {
    service: Arc<dyn Service>,
}

impl Next {
    /// Routes `request` and calls the matched responder.
    pub async fn run(self, request: Request) -> Result<Reply, Error> {
        dispatch(self.service.as_ref(), &request).await
    }
}

/// A closure-backed intercepting middleware.
///
/// ```rust
/// use std::sync::Arc;
/// use http::StatusCode;
/// use interest::{Adapter, Error, Next, Request, Router, Service};
///
/// let service: Arc<dyn Service> = Arc::new(Router::new());
/// let guard = Adapter::new(service, "guard", |req: Request, next: Next| async move {
///     if req.header("authorization").is_none() {
///         return Err(Error::http(StatusCode::UNAUTHORIZED, "missing credentials"));
///     }
///     next.run(req).await
/// });
/// ```
pub struct Adapter<F> {
    service: Arc<dyn Service>,
    name: Cow<'static, str>,
    handler: F,
}

impl<F> Adapter<F> {
    pub fn new(service: Arc<dyn Service>, name: impl Into<Cow<'static, str>>, handler: F) -> Self {
        Self { service, name: name.into(), handler }
    }
}

impl<F, Fut, R> Middleware for Adapter<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoReply + Send + 'static,
{
    fn service(&self) -> &Arc<dyn Service> {
        &self.service
    }

    fn name(&self) -> Cow<'static, str> {
        self.name.clone()
    }

    fn interceptor(&self) -> Option<&dyn Intercept> {
        Some(self)
    }
}

impl<F, Fut, R> Intercept for Adapter<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoReply + Send + 'static,
{
    fn intercept<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Reply, Error>> {
        let next = Next { service: Arc::clone(&self.service) };
        let fut = (self.handler)(request.clone(), next);
        Box::pin(async move { fut.await.into_reply() })
    }
}
