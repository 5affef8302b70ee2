//! # interest
//!
//! A request-processing pipeline for HTTP services: an ordered chain of
//! middlewares that cooperatively turns an incoming request into an outgoing
//! response.
//!
//! ## The pipeline
//!
//! Every request passes through four phases, each a separate pass over the
//! registered middlewares:
//!
//! - **request**: hooks transform or validate the request, in registration order
//! - **reply**: the responder runs, then data hooks convert its reply until it
//!   is a final [`Response`], in registration order, stopping early
//! - **response**: hooks post-process the response, in *reverse* order
//! - **exception**: on any failure, hooks translate the error, in reverse order
//!
//! The reverse passes make the chain an onion: the first middleware to see
//! the request is the last to touch the response.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use http::Method;
//! use interest::{Processor, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::new()
//!         .prefix("/api/v1")
//!         .on(Method::GET, "/users/{id}", get_user);
//!
//!     let processor = Processor::new(Arc::new(router));
//!
//!     Server::bind("0.0.0.0:3000").serve(processor).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//! ```
//!
//! See [`middleware`] for writing middlewares.

mod binding;
mod chain;
mod error;
mod processor;
mod reply;
mod request;
mod responder;
mod response;
mod router;
mod server;
mod service;

pub mod middleware;

pub use binding::Binding;
pub use chain::{Chain, Named};
pub use error::Error;
pub use middleware::{
    Adapter, DataHook, ExceptionHook, FromService, Intercept, Middleware, MiddlewareExt, Next,
    Registry, RequestHook, ResponseHook,
};
pub use processor::Processor;
pub use reply::{Data, IntoReply, Payload, Reply};
pub use request::Request;
pub use responder::{BoxFuture, Responder};
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use service::{Route, Service};
