//! HTTP request logging middleware for Tower-compatible stacks.
//!
//! # Design
//! - Purely observational: requests, responses and errors pass through
//!   untouched.
//! - One INFO record per completed request, emitted after the inner service
//!   resolves, carrying method, URL, peer address, user agent, status code
//!   and elapsed time.
//! - A response whose handler never set a status reports 200, which is the
//!   `http::Response` default.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use std::time::Instant;

use axum::extract::ConnectInfo;
use axum::http::{header, Request, Response};
use serde_json::Value;
use tower::{Layer, Service};

use crate::logger::Logger;

/// Message of every request record.
pub const HTTP_REQUEST_MESSAGE: &str = "HTTP request";

/// Wraps HTTP services so each request is logged through a [`Logger`].
#[derive(Debug, Clone)]
pub struct HttpLogLayer {
    logger: Logger,
}

impl HttpLogLayer {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl Logger {
    /// Middleware factory: a layer that logs every request handled by the
    /// wrapped service.
    pub fn http_log_layer(&self) -> HttpLogLayer {
        HttpLogLayer::new(self.clone())
    }
}

impl<S> Layer<S> for HttpLogLayer {
    type Service = HttpLogService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HttpLogService {
            inner,
            logger: self.logger.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpLogService<S> {
    inner: S,
    logger: Logger,
}

impl<S, B, R> Service<Request<B>> for HttpLogService<S>
where
    S: Service<Request<B>, Response = Response<R>>,
    S::Future: Send + 'static,
    S::Error: 'static,
    R: 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let start = Instant::now();
        let request = RequestSummary::from_request(&req);
        let logger = self.logger.with_context(req.extensions());
        let fut = self.inner.call(req);

        Box::pin(async move {
            let response = fut.await?;
            let status = response.status().as_u16();
            logger
                .with_fields(request.into_fields(status, start))
                .info(HTTP_REQUEST_MESSAGE);
            Ok(response)
        })
    }
}

/// Request attributes captured before the request is handed to the inner
/// service.
struct RequestSummary {
    method: String,
    url: String,
    remote_addr: String,
    user_agent: String,
}

impl RequestSummary {
    fn from_request<B>(req: &Request<B>) -> Self {
        let remote_addr = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string())
            .unwrap_or_default();
        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        RequestSummary {
            method: req.method().to_string(),
            url: req.uri().to_string(),
            remote_addr,
            user_agent,
        }
    }

    fn into_fields(self, status_code: u16, start: Instant) -> [(&'static str, Value); 6] {
        [
            ("method", Value::from(self.method)),
            ("url", Value::from(self.url)),
            ("remote_addr", Value::from(self.remote_addr)),
            ("user_agent", Value::from(self.user_agent)),
            ("status_code", Value::from(status_code)),
            ("duration", Value::from(format!("{:?}", start.elapsed()))),
        ]
    }
}
