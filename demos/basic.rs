//! Minimal interest example: a JSON data hook, a request-id header and error
//! translation around a couple of endpoints.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/api/v1/users/42
//!   curl -i http://localhost:3000/api/v1/stats
//!   curl -i -X DELETE http://localhost:3000/api/v1/users/42

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use http::{HeaderValue, Method, StatusCode};
use interest::{
    BoxFuture, Data, DataHook, Error, ExceptionHook, FromService, Middleware, Processor, Registry,
    Reply, Request, Response, ResponseHook, Router, Server, Service,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let router = Router::new()
        .prefix("/api/v1")
        .on(Method::GET,    "/users/{id}", get_user)
        .on(Method::DELETE, "/users/{id}", delete_user)
        .on(Method::GET,    "/stats",      stats);

    let mut processor = Processor::new(Arc::new(router));
    processor.register(&Registry::new().with::<RequestId>().with::<Stats>());

    Server::bind("0.0.0.0:3000")
        .serve(processor)
        .await
        .expect("server error");
}

// GET /users/{id}: a final response straight from the responder.
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#))
}

// DELETE /users/{id}: fails, the exception phase decides what the client sees.
async fn delete_user(_req: Request) -> Result<StatusCode, Error> {
    Err(Error::other("storage offline"))
}

// GET /stats: intermediate data, rendered by the Stats middleware.
async fn stats(_req: Request) -> Data<Counters> {
    Data(Counters { users: 3, deleted: 0 })
}

struct Counters {
    users: u64,
    deleted: u64,
}

/// Stamps every successful response with a sequence number.
struct RequestId {
    service: Arc<dyn Service>,
    next_id: AtomicU64,
}

impl FromService for RequestId {
    fn from_service(service: Arc<dyn Service>) -> Self {
        Self { service, next_id: AtomicU64::new(1) }
    }
}

impl Middleware for RequestId {
    fn service(&self) -> &Arc<dyn Service> { &self.service }
    fn response_hook(&self) -> Option<&dyn ResponseHook> { Some(self) }
}

impl ResponseHook for RequestId {
    fn process_response<'a>(
        &'a self,
        _request: &'a Request,
        mut response: Response,
    ) -> BoxFuture<'a, Result<Response, Error>> {
        Box::pin(async move {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            response.headers_mut().insert("x-request-id", HeaderValue::from(id));
            Ok(response)
        })
    }
}

/// Renders `Counters` as JSON and hides storage failures behind a 503.
struct Stats {
    service: Arc<dyn Service>,
}

impl FromService for Stats {
    fn from_service(service: Arc<dyn Service>) -> Self {
        Self { service }
    }
}

impl Middleware for Stats {
    fn service(&self) -> &Arc<dyn Service> { &self.service }
    fn data_hook(&self) -> Option<&dyn DataHook> { Some(self) }
    fn exception_hook(&self) -> Option<&dyn ExceptionHook> { Some(self) }
}

impl DataHook for Stats {
    fn process_data<'a>(&'a self, _request: &'a Request, reply: Reply) -> BoxFuture<'a, Result<Reply, Error>> {
        Box::pin(async move {
            let Reply::Data(payload) = reply else { return Ok(reply) };
            match payload.downcast::<Counters>() {
                Ok(c) => Ok(Response::json(format!(
                    r#"{{"users":{},"deleted":{}}}"#,
                    c.users, c.deleted,
                )).into()),
                Err(payload) => Ok(Reply::Data(payload)),
            }
        })
    }
}

impl ExceptionHook for Stats {
    fn process_exception<'a>(&'a self, _request: &'a Request, error: Error) -> BoxFuture<'a, Result<Error, Error>> {
        Box::pin(async move {
            Ok(match error {
                Error::Other(_) => Error::http(StatusCode::SERVICE_UNAVAILABLE, "try again later"),
                other => other,
            })
        })
    }
}
