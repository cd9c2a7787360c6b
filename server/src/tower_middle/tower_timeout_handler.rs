use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use hyper::{Request, Response, StatusCode};
use tower::{Layer, Service};
use tracing::warn;

use crate::handlers::http::ResponseBody;
use crate::handlers::http::utils::{deliver_error_json, full};

/// Bounds how long a single request may take end to end.
///
/// A request still running at the deadline is dropped and answered with a
/// `408 REQUEST_TIMEOUT` JSON error.
#[derive(Clone, Copy, Debug)]
pub struct TimeoutLayer {
    limit: Duration,
}

impl TimeoutLayer {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }
}

impl<S> Layer<S> for TimeoutLayer {
    type Service = TimeoutService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TimeoutService {
            inner,
            limit: self.limit,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TimeoutService<S> {
    inner: S,
    limit: Duration,
}

impl<S, ReqBody> Service<Request<ReqBody>> for TimeoutService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResponseBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = Response<ResponseBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let limit = self.limit;
        let route = format!("{} {}", req.method(), req.uri().path());

        // The instance polled ready is the one that must take the call.
        let fresh = self.inner.clone();
        let mut ready = std::mem::replace(&mut self.inner, fresh);

        Box::pin(async move {
            match tokio::time::timeout(limit, ready.call(req)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!("{} exceeded {:?}", route, limit);
                    Ok(request_timeout())
                }
            }
        })
    }
}

fn request_timeout() -> Response<ResponseBody> {
    deliver_error_json(
        "REQUEST_TIMEOUT",
        "Request took too long",
        StatusCode::REQUEST_TIMEOUT,
    )
    .unwrap_or_else(|_| {
        let mut response = Response::new(full(""));
        *response.status_mut() = StatusCode::REQUEST_TIMEOUT;
        response
    })
}
