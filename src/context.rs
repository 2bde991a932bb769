//! Request-scoped context carriers.
//!
//! # Design
//! - A logger derives fields from any type that can answer a key lookup.
//! - Only [`REQUEST_ID_KEY`] and [`USER_ID_KEY`] are consulted.
//! - [`RequestContext`] can live in a request's extensions or in task-local
//!   storage for the duration of a future.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;

use serde_json::Value;

/// Well-known key for the request identifier.
pub const REQUEST_ID_KEY: &str = "request_id";

/// Well-known key for the authenticated user identifier.
pub const USER_ID_KEY: &str = "user_id";

/// Keys copied from a carrier into logger fields.
pub const CONTEXT_KEYS: [&str; 2] = [REQUEST_ID_KEY, USER_ID_KEY];

/// Anything that can answer "what value is stored under this key".
pub trait ContextCarrier {
    fn lookup(&self, key: &str) -> Option<Value>;
}

impl ContextCarrier for HashMap<String, Value> {
    fn lookup(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl ContextCarrier for BTreeMap<String, Value> {
    fn lookup(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl ContextCarrier for serde_json::Map<String, Value> {
    fn lookup(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl<C: ContextCarrier + ?Sized> ContextCarrier for &C {
    fn lookup(&self, key: &str) -> Option<Value> {
        (**self).lookup(key)
    }
}

/// Identifiers associated with the request being served.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: Option<String>,
    pub user_id: Option<String>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        RequestContext {
            request_id: Some(request_id.into()),
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

impl ContextCarrier for RequestContext {
    fn lookup(&self, key: &str) -> Option<Value> {
        match key {
            REQUEST_ID_KEY => self.request_id.clone().map(Value::String),
            USER_ID_KEY => self.user_id.clone().map(Value::String),
            _ => None,
        }
    }
}

#[cfg(feature = "http")]
impl ContextCarrier for axum::http::Extensions {
    fn lookup(&self, key: &str) -> Option<Value> {
        self.get::<RequestContext>()?.lookup(key)
    }
}

tokio::task_local! {
    static ACTIVE_REQUEST_CONTEXT: RequestContext;
}

/// Execute the provided future with `context` available to
/// [`current_request_context`].
pub async fn with_request_context<Fut, T>(context: RequestContext, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    ACTIVE_REQUEST_CONTEXT.scope(context, fut).await
}

/// The request context of the enclosing [`with_request_context`] scope, if any.
pub fn current_request_context() -> Option<RequestContext> {
    ACTIVE_REQUEST_CONTEXT.try_with(Clone::clone).ok()
}
