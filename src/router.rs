//! Radix-tree request router.
//!
//! Bindings live in a [`Chain`] in registration order. The matchit tree is
//! compiled from that chain on first lookup and dropped by the chain listener
//! whenever a binding is added, so late registrations are picked up by the
//! next lookup.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use http::Method;
use matchit::Router as MatchitRouter;
use parking_lot::RwLock;
use tracing::debug;

use crate::binding::Binding;
use crate::chain::Chain;
use crate::error::Error;
use crate::request::Request;
use crate::responder::{BoxFuture, Responder};
use crate::service::{Route, Service};

/// Compiled lookup table: one tree node per distinct path, holding every
/// binding registered on it in chain order.
struct Table {
    tree: MatchitRouter<Vec<Binding>>,
}

/// The built-in [`Service`]: resolves requests against a chain of bindings.
///
/// Build it once at startup, optionally under a path prefix. Each
/// [`Router::on`] call returns `self` so registrations chain naturally.
///
/// ```rust
/// # use http::Method;
/// # use interest::{Request, Response, Router};
/// # async fn get_user(_: Request) -> Response { Response::text("") }
/// # async fn create_user(_: Request) -> Response { Response::text("") }
/// Router::new()
///     .prefix("/api/v1")
///     .on(Method::GET,  "/users/{id}", get_user)
///     .on(Method::POST, "/users",      create_user);
/// ```
pub struct Router {
    prefix: String,
    bindings: Chain<Binding>,
    stale: Arc<AtomicBool>,
    table: RwLock<Option<Arc<Table>>>,
}

impl Router {
    pub fn new() -> Self {
        let stale = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stale);
        let bindings = Chain::new(move |_: &[Binding]| flag.store(true, Ordering::Release));
        Self { prefix: String::new(), bindings, stale, table: RwLock::new(None) }
    }

    /// Mounts every binding under `prefix` (e.g. `/api/v1`).
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.trim_end_matches('/').to_owned();
        self.stale.store(true, Ordering::Release);
        self
    }

    /// Register a responder for a method + path pair. Returns `self` for chaining.
    pub fn on(self, method: Method, path: &str, responder: impl Responder) -> Self {
        self.bind(Binding::new(path, [method], responder))
    }

    /// Register a prepared binding. Returns `self` for chaining.
    pub fn bind(mut self, binding: Binding) -> Self {
        self.add(binding, None);
        self
    }

    /// Insert a binding at `place` (or append). Earlier bindings win when
    /// several on the same path accept the method.
    pub fn add(&mut self, binding: Binding, place: Option<usize>) {
        self.bindings.add(binding, place);
    }

    pub fn bindings(&self) -> &Chain<Binding> {
        &self.bindings
    }

    /// Resolves a method + path pair to a binding and its match arguments.
    pub fn lookup(&self, method: &Method, path: &str) -> Result<Route, Error> {
        let table = self.table()?;
        let matched = table.tree.at(path).map_err(|_| Error::NoRoute {
            method: method.clone(),
            path: path.to_owned(),
        })?;
        let binding = matched
            .value
            .iter()
            .find(|binding| binding.accepts(method))
            .ok_or_else(|| Error::MethodNotAllowed {
                method: method.clone(),
                path: path.to_owned(),
            })?;
        let params: HashMap<String, String> = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Ok(Route::new(binding.clone(), params))
    }

    fn table(&self) -> Result<Arc<Table>, Error> {
        if !self.stale.load(Ordering::Acquire) {
            if let Some(table) = self.table.read().as_ref() {
                return Ok(Arc::clone(table));
            }
        }

        let mut slot = self.table.write();
        let stale = self.stale.swap(false, Ordering::AcqRel);
        match slot.as_ref() {
            Some(table) if !stale => Ok(Arc::clone(table)),
            _ => {
                let table = Arc::new(self.compile().inspect_err(|_| {
                    self.stale.store(true, Ordering::Release);
                })?);
                *slot = Some(Arc::clone(&table));
                Ok(table)
            }
        }
    }

    fn compile(&self) -> Result<Table, Error> {
        let mut groups: Vec<(String, Vec<Binding>)> = Vec::new();
        for binding in &self.bindings {
            let path = self.full_path(binding.path());
            match groups.iter_mut().find(|(p, _)| *p == path) {
                Some((_, group)) => group.push(binding.clone()),
                None => groups.push((path, vec![binding.clone()])),
            }
        }

        let mut tree = MatchitRouter::new();
        for (path, group) in groups {
            tree.insert(path.clone(), group)
                .map_err(|e| Error::InvalidRoute { path, reason: e.to_string() })?;
        }
        debug!(bindings = self.bindings.len(), "route table compiled");
        Ok(Table { tree })
    }

    fn full_path(&self, path: &str) -> String {
        let full = match path {
            "" => self.prefix.clone(),
            p if p.starts_with('/') => format!("{}{p}", self.prefix),
            p => format!("{}/{p}", self.prefix),
        };
        if full.is_empty() { "/".to_owned() } else { full }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl Service for Router {
    fn route<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Route, Error>> {
        Box::pin(async move { self.lookup(request.method(), request.path()) })
    }
}
