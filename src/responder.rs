//! Responder trait and type erasure.
//!
//! # How async responders are stored
//!
//! A router holds responders of *different* types side by side in its
//! binding chain, so each one is hidden behind a trait object
//! (`dyn ErasedResponder`) and stored uniformly.
//!
//! ```text
//! async fn get_user(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.on(Method::GET, "/users/{id}", get_user)
//! get_user.into_boxed_responder()                     ← Responder blanket impl
//!        ↓
//! Arc::new(FnResponder(get_user))                     ← heap-allocated wrapper
//!        ↓  stored in a Binding as BoxedResponder
//! responder.call(req)  when a middleware calls next   ← one vtable dispatch
//!        ↓
//! Box::pin(async { get_user(req).await.into_reply() })
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Error;
use crate::reply::{IntoReply, Reply};
use crate::request::Request;

/// A heap-allocated, type-erased future.
///
/// Every phase hook returns one of these so hooks can live behind trait
/// objects. `Send` lets tokio move the future across worker threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Responder` trait's `into_boxed_responder`.
#[doc(hidden)]
pub trait ErasedResponder {
    fn call(&self, req: Request) -> BoxFuture<'static, Result<Reply, Error>>;
}

/// A type-erased responder shared across concurrent requests.
#[doc(hidden)]
pub type BoxedResponder = Arc<dyn ErasedResponder + Send + Sync + 'static>;

/// Implemented for every valid route responder.
///
/// You never implement this yourself. It is satisfied by any `async fn` (or
/// closure returning a future) with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoReply
/// ```
///
/// Match arguments extracted from the path arrive as request params
/// (`req.param("id")`).
pub trait Responder: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_responder(self) -> BoxedResponder;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoReply + Send + 'static,
{
}

impl<F, Fut, R> Responder for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoReply + Send + 'static,
{
    fn into_boxed_responder(self) -> BoxedResponder {
        Arc::new(FnResponder(self))
    }
}

/// Bridges a concrete responder `F` to [`ErasedResponder`].
struct FnResponder<F>(F);

impl<F, Fut, R> ErasedResponder for FnResponder<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoReply + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<'static, Result<Reply, Error>> {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_reply() })
    }
}
