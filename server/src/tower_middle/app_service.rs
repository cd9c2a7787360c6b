use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::{Request, Response};
use tower::Service;

use crate::AppState;
use crate::handlers::http::ResponseBody;
use crate::handlers::http::routes::Router;

/// Remote address of the connection a request arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerAddr(pub SocketAddr);

/// Tower service wrapping the router for one connection.
///
/// Never fails: routing errors are already answered with a 500 by
/// `Router::handle`, so middleware layered on top only ever sees responses.
#[derive(Clone, Debug)]
pub struct AppService {
    router: Arc<Router>,
    state: AppState,
    peer: Option<SocketAddr>,
}

impl AppService {
    pub fn new(router: Arc<Router>, state: AppState, peer: Option<SocketAddr>) -> Self {
        Self {
            router,
            state,
            peer,
        }
    }
}

impl Service<Request<Incoming>> for AppService {
    type Response = Response<ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Incoming>) -> Self::Future {
        let router = self.router.clone();
        let state = self.state.clone();
        let peer = self.peer;

        Box::pin(async move {
            let mut req = req.map(|body| body.boxed_unsync());
            if let Some(addr) = peer {
                req.extensions_mut().insert(PeerAddr(addr));
            }
            Ok(router.handle(req, state).await)
        })
    }
}
