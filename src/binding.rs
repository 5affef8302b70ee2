//! Route bindings.

use std::fmt;
use std::sync::Arc;

use http::Method;

use crate::responder::{BoxedResponder, Responder};

/// Immutable descriptor of one route: path, accepted methods, responder.
///
/// An empty path means the root of the owning router; an empty method list
/// accepts any method. Cloning shares the responder.
#[derive(Clone)]
pub struct Binding {
    path: String,
    methods: Vec<Method>,
    responder: BoxedResponder,
}

impl Binding {
    pub fn new(
        path: impl Into<String>,
        methods: impl Into<Vec<Method>>,
        responder: impl Responder,
    ) -> Self {
        Self {
            path: path.into(),
            methods: methods.into(),
            responder: responder.into_boxed_responder(),
        }
    }

    /// A binding on the router root accepting any method.
    pub fn any(responder: impl Responder) -> Self {
        Self::new("", Vec::new(), responder)
    }

    /// Path relative to the owning router.
    pub fn path(&self) -> &str { &self.path }

    pub fn methods(&self) -> &[Method] { &self.methods }

    #[doc(hidden)]
    pub fn responder(&self) -> &BoxedResponder { &self.responder }

    /// Whether a request with `method` may reach this binding.
    pub fn accepts(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let methods: Vec<&str> = self.methods.iter().map(Method::as_str).collect();
        write!(
            f,
            r#"<Binding path="{}" methods="[{}]" responder="{:p}">"#,
            self.path,
            methods.join(", "),
            Arc::as_ptr(&self.responder).cast::<()>(),
        )
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
