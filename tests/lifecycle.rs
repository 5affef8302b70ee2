use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method, StatusCode, Uri};
use interest::{
    Adapter, BoxFuture, Data, DataHook, Error, ExceptionHook, FromService, Middleware, Next,
    Processor, Registry, Reply, Request, RequestHook, Response, ResponseHook, Router, Service,
};

// ── Middlewares ───────────────────────────────────────────────────────────────

/// Rejects requests without an `authorization` header.
struct Auth {
    service: Arc<dyn Service>,
}

impl FromService for Auth {
    fn from_service(service: Arc<dyn Service>) -> Self { Self { service } }
}

impl Middleware for Auth {
    fn service(&self) -> &Arc<dyn Service> { &self.service }
    fn request_hook(&self) -> Option<&dyn RequestHook> { Some(self) }
}

impl RequestHook for Auth {
    fn process_request<'a>(&'a self, request: &'a mut Request) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            match request.header("authorization") {
                Some(_) => Ok(()),
                None => Err(Error::http(StatusCode::UNAUTHORIZED, "missing credentials")),
            }
        })
    }
}

/// Renders `u64` payloads as JSON numbers and tags every response.
struct Json {
    service: Arc<dyn Service>,
}

impl FromService for Json {
    fn from_service(service: Arc<dyn Service>) -> Self { Self { service } }
}

impl Middleware for Json {
    fn service(&self) -> &Arc<dyn Service> { &self.service }
    fn data_hook(&self) -> Option<&dyn DataHook> { Some(self) }
    fn response_hook(&self) -> Option<&dyn ResponseHook> { Some(self) }
}

impl DataHook for Json {
    fn process_data<'a>(&'a self, _request: &'a Request, reply: Reply) -> BoxFuture<'a, Result<Reply, Error>> {
        Box::pin(async move {
            let Reply::Data(payload) = reply else { return Ok(reply) };
            match payload.downcast::<u64>() {
                Ok(n) => Ok(Response::json(n.to_string()).into()),
                Err(payload) => Ok(Reply::Data(payload)),
            }
        })
    }
}

impl ResponseHook for Json {
    fn process_response<'a>(
        &'a self,
        _request: &'a Request,
        mut response: Response,
    ) -> BoxFuture<'a, Result<Response, Error>> {
        Box::pin(async move {
            response.headers_mut().insert("x-served-by", HeaderValue::from_static("json"));
            Ok(response)
        })
    }
}

/// Hides internal failures behind a 503.
struct Shield {
    service: Arc<dyn Service>,
}

impl FromService for Shield {
    fn from_service(service: Arc<dyn Service>) -> Self { Self { service } }
}

impl Middleware for Shield {
    fn service(&self) -> &Arc<dyn Service> { &self.service }
    fn exception_hook(&self) -> Option<&dyn ExceptionHook> { Some(self) }
}

impl ExceptionHook for Shield {
    fn process_exception<'a>(&'a self, _request: &'a Request, error: Error) -> BoxFuture<'a, Result<Error, Error>> {
        Box::pin(async move {
            Ok(match error {
                Error::Other(_) => Error::http(StatusCode::SERVICE_UNAVAILABLE, "try again later"),
                other => other,
            })
        })
    }
}

/// Exception hook that itself fails.
struct Broken {
    service: Arc<dyn Service>,
}

impl FromService for Broken {
    fn from_service(service: Arc<dyn Service>) -> Self { Self { service } }
}

impl Middleware for Broken {
    fn service(&self) -> &Arc<dyn Service> { &self.service }
    fn exception_hook(&self) -> Option<&dyn ExceptionHook> { Some(self) }
}

impl ExceptionHook for Broken {
    fn process_exception<'a>(&'a self, _request: &'a Request, _error: Error) -> BoxFuture<'a, Result<Error, Error>> {
        Box::pin(async move { Err(Error::http(StatusCode::BAD_GATEWAY, "translator down")) })
    }
}

// ── Responders ────────────────────────────────────────────────────────────────

static COUNTED: AtomicUsize = AtomicUsize::new(0);

async fn count(_req: Request) -> Data<u64> {
    Data(COUNTED.fetch_add(1, Ordering::SeqCst) as u64 + 41)
}

async fn echo_id(req: Request) -> String {
    format!("user {}", req.param("id").unwrap_or("?"))
}

async fn fails(_req: Request) -> Result<Response, Error> {
    Err(Error::other("connection reset"))
}

async fn unconvertible(_req: Request) -> Data<&'static str> {
    Data("not a number")
}

fn router() -> Arc<dyn Service> {
    Arc::new(
        Router::new()
            .prefix("/api")
            .on(Method::GET, "/count", count)
            .on(Method::GET, "/users/{id}", echo_id)
            .on(Method::GET, "/fails", fails)
            .on(Method::GET, "/raw", unconvertible),
    )
}

fn get(path: &'static str) -> Request {
    Request::new(Method::GET, Uri::from_static(path))
        .with_header(AUTHORIZATION, HeaderValue::from_static("Bearer t"))
}

fn processor(registry: Registry) -> Processor {
    let mut processor = Processor::new(router());
    processor.register(&registry);
    processor
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn data_reply_is_converted_and_post_processed() {
    let processor = processor(Registry::new().with::<Auth>().with::<Json>());

    let res = processor.handle(get("/api/count")).await;

    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(res.headers()["x-served-by"], "json");
    assert!(res.body().as_ref().starts_with(b"4"));
}

#[tokio::test]
async fn path_params_reach_the_responder() {
    let processor = processor(Registry::new().with::<Json>());

    let res = processor.handle(get("/api/users/7")).await;

    assert_eq!(res.body().as_ref(), b"user 7");
    assert_eq!(res.headers()["x-served-by"], "json");
}

#[tokio::test]
async fn rejected_request_becomes_an_error_response() {
    let processor = processor(Registry::new().with::<Auth>().with::<Json>());

    let req = Request::new(Method::GET, Uri::from_static("/api/users/7"));
    let res = processor.handle(req).await;

    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.body().as_ref(), b"missing credentials");
    assert!(res.headers().get("x-served-by").is_none());
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let processor = processor(Registry::new());
    let res = processor.handle(get("/api/nothing")).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wrong_method_is_not_allowed() {
    let processor = processor(Registry::new());
    let req = Request::new(Method::POST, Uri::from_static("/api/count"));
    let res = processor.handle(req).await;
    assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn exception_hooks_translate_responder_failures() {
    let processor = processor(Registry::new().with::<Shield>().with::<Json>());

    let res = processor.handle(get("/api/fails")).await;

    assert_eq!(res.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.body().as_ref(), b"try again later");
}

#[tokio::test]
async fn failing_translator_error_is_rendered() {
    let processor = processor(Registry::new().with::<Shield>().with::<Broken>());

    let res = processor.handle(get("/api/fails")).await;

    // Broken runs first (reverse order) and its own failure wins.
    assert_eq!(res.status_code(), StatusCode::BAD_GATEWAY);
    assert_eq!(res.body().as_ref(), b"translator down");
}

#[tokio::test]
async fn unconverted_payload_is_a_server_error() {
    let processor = processor(Registry::new().with::<Json>());

    let res = processor.handle(get("/api/raw")).await;

    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn adapter_can_short_circuit_the_responder() {
    let svc = router();
    let mut processor = Processor::new(Arc::clone(&svc));
    processor.push(Box::new(Adapter::new(svc, "maintenance", |req: Request, next: Next| async move {
        if req.header("x-maintenance").is_some() {
            return Ok(Reply::from(Response::status(StatusCode::SERVICE_UNAVAILABLE)));
        }
        next.run(req).await
    })));

    let normal = processor.handle(get("/api/users/1")).await;
    let blocked = processor
        .handle(get("/api/users/1").with_header("x-maintenance".parse().unwrap(), HeaderValue::from_static("1")))
        .await;

    assert_eq!(normal.status_code(), StatusCode::OK);
    assert_eq!(blocked.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}
