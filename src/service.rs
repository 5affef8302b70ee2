//! The owning-service seam.
//!
//! Middlewares never resolve URLs themselves. When one wants the default
//! continuation ([`MiddlewareExt::next`](crate::MiddlewareExt::next)) it asks the
//! service it is bound to for a [`Route`] and calls the route's responder.

use std::collections::HashMap;

use crate::binding::Binding;
use crate::error::Error;
use crate::reply::Reply;
use crate::request::Request;
use crate::responder::BoxFuture;

/// URL-to-binding resolution, implemented by the owning service.
///
/// [`Router`](crate::Router) is the built-in implementation.
pub trait Service: Send + Sync + 'static {
    fn route<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Route, Error>>;
}

/// A resolved binding plus the arguments matched out of the path.
#[derive(Clone, Debug)]
pub struct Route {
    binding: Binding,
    params: HashMap<String, String>,
}

impl Route {
    pub fn new(binding: Binding, params: HashMap<String, String>) -> Self {
        Self { binding, params }
    }

    pub fn binding(&self) -> &Binding { &self.binding }

    /// Arguments matched out of the request path.
    pub fn params(&self) -> &HashMap<String, String> { &self.params }
}

/// Routes `request` through `service` and invokes the matched responder with
/// the match arguments installed as request params.
pub(crate) async fn dispatch(service: &dyn Service, request: &Request) -> Result<Reply, Error> {
    let Route { binding, params } = service.route(request).await?;
    let mut request = request.clone();
    request.set_params(params);
    binding.responder().call(request).await
}
