//! Middleware layer.
//!
//! Middleware is the right place for cross-cutting concerns: request-id
//! injection, authentication, payload serialisation, compression, error
//! translation.
//!
//! # Capabilities
//!
//! A middleware takes part in a phase only if it declares the matching
//! capability. Each phase has its own trait, and [`Middleware`] has one query
//! per trait that returns `None` unless overridden:
//!
//! | Phase | Capability | Query | Order |
//! |---|---|---|---|
//! | request | [`RequestHook`] | [`Middleware::request_hook`] | registration |
//! | reply | [`DataHook`] | [`Middleware::data_hook`] | registration, stops at a final response |
//! | response | [`ResponseHook`] | [`Middleware::response_hook`] | reverse |
//! | exception | [`ExceptionHook`] | [`Middleware::exception_hook`] | reverse |
//! | responder call | [`Intercept`] | [`Middleware::interceptor`] | first interceptor wins |
//!
//! The responder call itself ([`MiddlewareExt::process`] and
//! [`MiddlewareExt::next`]) is shared by every middleware and cannot be
//! overridden; [`Intercept`] is the only way to take it over.
//!
//! ```rust
//! use std::sync::Arc;
//! use http::{HeaderValue, header::SERVER};
//! use interest::{BoxFuture, Error, FromService, Middleware, Request, Response, ResponseHook, Service};
//!
//! struct ServerHeader {
//!     service: Arc<dyn Service>,
//! }
//!
//! impl FromService for ServerHeader {
//!     fn from_service(service: Arc<dyn Service>) -> Self {
//!         Self { service }
//!     }
//! }
//!
//! impl Middleware for ServerHeader {
//!     fn service(&self) -> &Arc<dyn Service> { &self.service }
//!     fn response_hook(&self) -> Option<&dyn ResponseHook> { Some(self) }
//! }
//!
//! impl ResponseHook for ServerHeader {
//!     fn process_response<'a>(
//!         &'a self,
//!         _request: &'a Request,
//!         mut response: Response,
//!     ) -> BoxFuture<'a, Result<Response, Error>> {
//!         Box::pin(async move {
//!             response.headers_mut().insert(SERVER, HeaderValue::from_static("interest"));
//!             Ok(response)
//!         })
//!     }
//! }
//! ```

mod adapter;

use std::borrow::Cow;
use std::sync::Arc;

use crate::chain::Named;
use crate::error::Error;
use crate::reply::Reply;
use crate::request::Request;
use crate::responder::BoxFuture;
use crate::response::Response;
use crate::service::{Service, dispatch};

pub use adapter::{Adapter, Next};

// ── Capabilities ──────────────────────────────────────────────────────────────

/// Transforms or validates the inbound request, in place.
///
/// Returning an error aborts the request phase.
pub trait RequestHook: Send + Sync {
    fn process_request<'a>(&'a self, request: &'a mut Request) -> BoxFuture<'a, Result<(), Error>>;
}

/// Converts an intermediate reply a step closer to a final [`Response`].
pub trait DataHook: Send + Sync {
    fn process_data<'a>(&'a self, request: &'a Request, reply: Reply) -> BoxFuture<'a, Result<Reply, Error>>;
}

/// Post-processes a final response (headers, compression, logging).
pub trait ResponseHook: Send + Sync {
    fn process_response<'a>(
        &'a self,
        request: &'a Request,
        response: Response,
    ) -> BoxFuture<'a, Result<Response, Error>>;
}

/// Translates or enriches a propagating error.
///
/// `Ok` carries the (possibly replaced) error on to the next hook. `Err`
/// means the translation itself failed; that error leaves the exception
/// phase immediately.
pub trait ExceptionHook: Send + Sync {
    fn process_exception<'a>(&'a self, request: &'a Request, error: Error) -> BoxFuture<'a, Result<Error, Error>>;
}

/// Takes over the responder call.
///
/// An interceptor decides on its own whether to continue with
/// [`MiddlewareExt::next`].
pub trait Intercept: Send + Sync {
    fn intercept<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Reply, Error>>;
}

// ── Middleware ────────────────────────────────────────────────────────────────

/// A pluggable unit of request processing, bound to one service.
pub trait Middleware: Send + Sync + 'static {
    /// The service this middleware was built for.
    fn service(&self) -> &Arc<dyn Service>;

    /// Defaults to the lower-cased type name, without module path or
    /// generic arguments.
    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(short_type_name(std::any::type_name::<Self>()).to_lowercase())
    }

    fn request_hook(&self) -> Option<&dyn RequestHook> { None }
    fn data_hook(&self) -> Option<&dyn DataHook> { None }
    fn response_hook(&self) -> Option<&dyn ResponseHook> { None }
    fn exception_hook(&self) -> Option<&dyn ExceptionHook> { None }
    fn interceptor(&self) -> Option<&dyn Intercept> { None }
}

/// Responder-call operations every middleware gets.
///
/// Blanket-implemented for all [`Middleware`] types and not overridable: a
/// middleware takes over the responder call only by declaring an
/// [`Intercept`] capability.
///
/// ```compile_fail
/// use std::sync::Arc;
/// use interest::{BoxFuture, Error, Middleware, Reply, Request, Service};
///
/// struct Sneaky {
///     service: Arc<dyn Service>,
/// }
///
/// impl Middleware for Sneaky {
///     fn service(&self) -> &Arc<dyn Service> { &self.service }
///
///     fn process<'a>(&'a self, _request: &'a Request) -> BoxFuture<'a, Result<Reply, Error>> {
///         todo!()
///     }
/// }
/// ```
pub trait MiddlewareExt: Middleware {
    /// Produces the reply for `request`: the interceptor if one is declared,
    /// the default continuation otherwise.
    fn process<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Reply, Error>> {
        match self.interceptor() {
            Some(interceptor) => interceptor.intercept(request),
            None => self.next(request),
        }
    }

    /// Default continuation: route through the service, call the responder.
    fn next<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Reply, Error>> {
        Box::pin(dispatch(self.service().as_ref(), request))
    }
}

impl<M: Middleware + ?Sized> MiddlewareExt for M {}

impl Named for Box<dyn Middleware> {
    fn name(&self) -> Cow<'_, str> {
        Middleware::name(&**self)
    }
}

/// Builds a middleware bound to a service. Implement this to register a
/// middleware by type.
pub trait FromService: Sized {
    fn from_service(service: Arc<dyn Service>) -> Self;
}

fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// ── Registry ──────────────────────────────────────────────────────────────────

type Factory = fn(Arc<dyn Service>) -> Box<dyn Middleware>;

/// An explicit, ordered list of middleware types for bulk registration.
///
/// Registration order is the order of [`with`](Registry::with) calls.
///
/// ```rust,ignore
/// let defaults = Registry::new().with::<RequestId>().with::<Json>();
/// processor.register(&defaults);
/// ```
#[derive(Default, Clone)]
pub struct Registry {
    factories: Vec<Factory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<M: Middleware + FromService>(mut self) -> Self {
        self.factories.push(|service| Box::new(M::from_service(service)));
        self
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub(crate) fn build(&self, service: &Arc<dyn Service>) -> impl Iterator<Item = Box<dyn Middleware>> {
        self.factories.iter().map(|factory| factory(Arc::clone(service)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Router;

    struct RequestId {
        service: Arc<dyn Service>,
    }

    impl Middleware for RequestId {
        fn service(&self) -> &Arc<dyn Service> { &self.service }
    }

    struct Wrapper<T> {
        service: Arc<dyn Service>,
        _inner: T,
    }

    impl<T: Send + Sync + 'static> Middleware for Wrapper<T> {
        fn service(&self) -> &Arc<dyn Service> { &self.service }
    }

    struct Renamed {
        service: Arc<dyn Service>,
    }

    impl Middleware for Renamed {
        fn service(&self) -> &Arc<dyn Service> { &self.service }
        fn name(&self) -> Cow<'static, str> { Cow::Borrowed("custom") }
    }

    fn service() -> Arc<dyn Service> {
        Arc::new(Router::new())
    }

    #[test]
    fn default_name_is_lowercased_type_name() {
        let m = RequestId { service: service() };
        assert_eq!(m.name(), "requestid");
    }

    #[test]
    fn default_name_drops_generics() {
        let m = Wrapper { service: service(), _inner: 1_u8 };
        assert_eq!(m.name(), "wrapper");
    }

    #[test]
    fn name_is_overridable_and_boxed_names_agree() {
        let boxed: Box<dyn Middleware> = Box::new(Renamed { service: service() });
        assert_eq!(Named::name(&boxed), "custom");
    }

    struct Canned {
        service: Arc<dyn Service>,
    }

    impl Middleware for Canned {
        fn service(&self) -> &Arc<dyn Service> { &self.service }
        fn interceptor(&self) -> Option<&dyn Intercept> { Some(self) }
    }

    impl Intercept for Canned {
        fn intercept<'a>(&'a self, _request: &'a Request) -> BoxFuture<'a, Result<Reply, Error>> {
            Box::pin(async { Ok(Reply::from(Response::text("canned"))) })
        }
    }

    fn root() -> Request {
        Request::new(http::Method::GET, http::Uri::from_static("/"))
    }

    fn routed_service() -> Arc<dyn Service> {
        async fn responder(_req: Request) -> &'static str {
            "responder"
        }
        Arc::new(Router::new().bind(crate::Binding::any(responder)))
    }

    #[tokio::test]
    async fn process_uses_the_declared_interceptor() {
        let m: Box<dyn Middleware> = Box::new(Canned { service: routed_service() });
        let res = m.process(&root()).await.unwrap().into_response().unwrap();
        assert_eq!(res.body().as_ref(), b"canned");
    }

    #[tokio::test]
    async fn process_without_interceptor_routes_to_the_responder() {
        let m: Box<dyn Middleware> = Box::new(RequestId { service: routed_service() });
        let res = m.process(&root()).await.unwrap().into_response().unwrap();
        assert_eq!(res.body().as_ref(), b"responder");
    }

    #[test]
    fn no_capabilities_by_default() {
        let m = RequestId { service: service() };
        assert!(m.request_hook().is_none());
        assert!(m.data_hook().is_none());
        assert!(m.response_hook().is_none());
        assert!(m.exception_hook().is_none());
        assert!(m.interceptor().is_none());
    }
}
