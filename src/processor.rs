//! Four-phase middleware orchestration.
//!
//! ```text
//!            registration order ──▶          ◀── reverse order
//! request ─▶ [M1 ▸ M2 ▸ M3] ─▶ process ─▶ [M1 ▸ M2 ▸ M3] ─▶ [M3 ▸ M2 ▸ M1] ─▶ response
//!            process_request    (route)    process_reply     process_response
//!                                          (stops at final)
//!
//!   any failure ─▶ [M3 ▸ M2 ▸ M1] process_exception ─▶ error response
//! ```
//!
//! Hooks run one at a time. A hook may suspend on its own I/O, but the next
//! middleware never starts before the previous one has finished, so every
//! request, reply, response and error sees a total order of mutation.

use std::sync::Arc;

use tracing::{debug, error, trace, warn};

use crate::chain::Chain;
use crate::error::Error;
use crate::middleware::{FromService, Middleware, MiddlewareExt, Registry};
use crate::reply::Reply;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::service::{Service, dispatch};

/// Owns the ordered middleware list of one service and drives the phases.
///
/// Register everything before the first request; the list is append-only
/// and is read without locking while requests are in flight.
pub struct Processor {
    service: Arc<dyn Service>,
    middlewares: Chain<Box<dyn Middleware>>,
}

impl Processor {
    pub fn new(service: Arc<dyn Service>) -> Self {
        let middlewares = Chain::new(|items: &[Box<dyn Middleware>]| {
            if let Some(last) = items.last() {
                debug!(middleware = %last.name(), total = items.len(), "middleware registered");
            }
        });
        Self { service, middlewares }
    }

    pub fn service(&self) -> &Arc<dyn Service> {
        &self.service
    }

    pub fn middlewares(&self) -> &Chain<Box<dyn Middleware>> {
        &self.middlewares
    }

    /// Looks a registered middleware up by name.
    pub fn middleware(&self, name: &str) -> Result<&dyn Middleware, Error> {
        self.middlewares.get_by_name(name).map(|m| &**m)
    }

    /// Instantiates `M` bound to this processor's service and appends it.
    pub fn add_middleware<M: Middleware + FromService>(&mut self) -> &mut Self {
        let middleware = M::from_service(Arc::clone(&self.service));
        self.push(Box::new(middleware))
    }

    /// Appends an already-built middleware.
    pub fn push(&mut self, middleware: Box<dyn Middleware>) -> &mut Self {
        self.middlewares.add(middleware, None);
        self
    }

    /// Appends every middleware type in `registry`, in registry order.
    pub fn register(&mut self, registry: &Registry) -> &mut Self {
        for middleware in registry.build(&self.service) {
            self.middlewares.add(middleware, None);
        }
        self
    }

    // ── Phases ────────────────────────────────────────────────────────────────

    /// Runs every request hook in registration order.
    ///
    /// The first failing hook aborts the phase; `request` keeps whatever the
    /// hooks before it did.
    pub async fn process_request(&self, request: &mut Request) -> Result<(), Error> {
        for middleware in &self.middlewares {
            if let Some(hook) = middleware.request_hook() {
                trace!(middleware = %middleware.name(), "process_request");
                hook.process_request(request).await?;
            }
        }
        Ok(())
    }

    /// Produces the initial reply: the first registered interceptor takes the
    /// call, otherwise the request is routed and its responder invoked.
    pub async fn process(&self, request: &Request) -> Result<Reply, Error> {
        for middleware in &self.middlewares {
            if middleware.interceptor().is_some() {
                trace!(middleware = %middleware.name(), "process");
                return middleware.process(request).await;
            }
        }
        dispatch(self.service.as_ref(), request).await
    }

    /// Converts `reply` into a final response through the data hooks, in
    /// registration order.
    ///
    /// Iteration stops as soon as the reply is final; middlewares after that
    /// point never see it. Running out of middlewares with a non-final reply
    /// is [`Error::Contract`].
    pub async fn process_reply(&self, request: &Request, mut reply: Reply) -> Result<Response, Error> {
        for middleware in &self.middlewares {
            if reply.is_final() {
                break;
            }
            if let Some(hook) = middleware.data_hook() {
                trace!(middleware = %middleware.name(), "process_data");
                reply = hook.process_data(request, reply).await?;
            }
        }
        match reply {
            Reply::Response(response) => Ok(response),
            Reply::Data(_) => {
                warn!(path = request.path(), "middlewares did not produce a final response");
                Err(Error::Contract)
            }
        }
    }

    /// Runs every response hook in reverse registration order.
    pub async fn process_response(&self, request: &Request, mut response: Response) -> Result<Response, Error> {
        for middleware in self.middlewares.iter().rev() {
            if let Some(hook) = middleware.response_hook() {
                trace!(middleware = %middleware.name(), "process_response");
                response = hook.process_response(request, response).await?;
            }
        }
        Ok(response)
    }

    /// Runs every exception hook in reverse registration order.
    ///
    /// `Ok` carries the translated error. `Err` means a hook failed while
    /// translating; nothing here retries or falls back.
    pub async fn process_exception(&self, request: &Request, mut error: Error) -> Result<Error, Error> {
        for middleware in self.middlewares.iter().rev() {
            if let Some(hook) = middleware.exception_hook() {
                trace!(middleware = %middleware.name(), "process_exception");
                error = hook.process_exception(request, error).await?;
            }
        }
        Ok(error)
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Drives one request through every phase and always yields a response.
    ///
    /// A failure anywhere goes through the exception phase once. Whatever
    /// comes out of it (the translated error, or the error a translating hook
    /// raised) is rendered with [`IntoResponse`].
    pub async fn handle(&self, mut request: Request) -> Response {
        match self.run(&mut request).await {
            Ok(response) => response,
            Err(err) => {
                debug!(error = %err, path = request.path(), "request failed");
                match self.process_exception(&request, err).await {
                    Ok(err) => err.into_response(),
                    Err(err) => {
                        error!(error = %err, path = request.path(), "exception phase failed");
                        err.into_response()
                    }
                }
            }
        }
    }

    async fn run(&self, request: &mut Request) -> Result<Response, Error> {
        self.process_request(request).await?;
        let reply = self.process(request).await?;
        let response = self.process_reply(request, reply).await?;
        self.process_response(request, response).await
    }
}
