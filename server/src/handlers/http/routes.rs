use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result};
use hyper::{Method, Request, Response, StatusCode};
use tracing::{error, warn};

use crate::AppState;
use crate::auth::IdentityContext;
use crate::handlers::http::utils::{deliver_error_json, deliver_unauthorized, full, get_client_ip};
use crate::handlers::http::{RequestBody, ResponseBody, auth, hello};

// ---------------------------------------------------------------------------
// Handler type aliases
// ---------------------------------------------------------------------------
//
// Two access classes:
//
//   RouteHandler    : public.  Receives (req, state).  The gate never runs,
//                     so these answer the same whatever headers arrive.
//                     Use for: /auth/login, /public, /health.
//
//   SecuredHandler  : the gate runs first.  A rejected token ends the
//                     request with 401 before the handler is called; an
//                     absent token reaches the handler with an anonymous
//                     IdentityContext, and the handler enforces its own
//                     principal requirement.

type RouteFuture = Pin<Box<dyn Future<Output = Result<Response<ResponseBody>>> + Send>>;

type RouteHandler = Box<dyn Fn(Request<RequestBody>, AppState) -> RouteFuture + Send + Sync>;

type SecuredHandler =
    Box<dyn Fn(Request<RequestBody>, AppState, IdentityContext) -> RouteFuture + Send + Sync>;

// ---------------------------------------------------------------------------
// RouteKind
// ---------------------------------------------------------------------------

enum RouteKind {
    /// No authentication check.
    Open(RouteHandler),

    /// Gate runs once before the handler; handler receives the identity.
    Secured(SecuredHandler),
}

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

struct Route {
    method: Method,
    path: String,
    kind: RouteKind,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes_count", &self.routes.len())
            .finish()
    }
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Open (no auth) ────────────────────────────────────────────────────────

    /// GET with no authentication, for public pages and health checks.
    pub fn get<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<RequestBody>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<ResponseBody>>> + Send + 'static,
    {
        self.open(Method::GET, path, handler)
    }

    /// POST with no authentication; only login uses it.
    pub fn post<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<RequestBody>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<ResponseBody>>> + Send + 'static,
    {
        self.open(Method::POST, path, handler)
    }

    fn open<F, Fut>(mut self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(Request<RequestBody>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<ResponseBody>>> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            kind: RouteKind::Open(Box::new(move |req, state| Box::pin(handler(req, state)))),
        });
        self
    }

    // ── Secured (gate + identity) ─────────────────────────────────────────────
    //
    // The router runs the authentication gate before the handler is called.
    // Handlers receive the request's IdentityContext and must NOT inspect the
    // Authorization header themselves.

    /// GET guarded by the authentication gate.
    pub fn get_secured<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<RequestBody>, AppState, IdentityContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<ResponseBody>>> + Send + 'static,
    {
        self.secured(Method::GET, path, handler)
    }

    fn secured<F, Fut>(mut self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(Request<RequestBody>, AppState, IdentityContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<ResponseBody>>> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            kind: RouteKind::Secured(Box::new(move |req, state, identity| {
                Box::pin(handler(req, state, identity))
            })),
        });
        self
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    pub async fn route(
        &self,
        req: Request<RequestBody>,
        state: AppState,
    ) -> Result<Response<ResponseBody>> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let mut path_known = false;

        for route in &self.routes {
            if !Self::path_matches(&route.path, &path) {
                continue;
            }
            if route.method != method {
                path_known = true;
                continue;
            }

            return match &route.kind {
                // ── Open ──────────────────────────────────────────────────────
                RouteKind::Open(h) => h(req, state).await,

                // ── Secured: gate exactly once, then the handler ──────────────
                RouteKind::Secured(h) => match state.gate.inspect(req.headers()).into_identity() {
                    Ok(identity) => {
                        let identity = identity.with_client_ip(get_client_ip(&req));
                        h(req, state, identity).await
                    }
                    Err(reason) => {
                        warn!("Gate rejected {} {}: {}", method, path, reason);
                        invalid_token()
                    }
                },
            };
        }

        if path_known {
            return deliver_error_json(
                "METHOD_NOT_ALLOWED",
                "Method not allowed",
                StatusCode::METHOD_NOT_ALLOWED,
            )
            .context("Failed to deliver 405 response");
        }

        deliver_error_json("NOT_FOUND", "Endpoint not found", StatusCode::NOT_FOUND)
            .context("Failed to deliver 404 response")
    }

    /// Dispatch and turn any unexpected failure into a 500 response.
    pub async fn handle(
        &self,
        req: Request<RequestBody>,
        state: AppState,
    ) -> Response<ResponseBody> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        match self.route(req, state).await {
            Ok(response) => response,
            Err(err) => {
                error!("{} {} failed: {:#}", method, path, err);
                internal_error()
            }
        }
    }

    // ── Path matching ─────────────────────────────────────────────────────────

    pub fn path_matches(route_path: &str, request_path: &str) -> bool {
        // Query strings never take part in matching.
        let clean = request_path.split('?').next().unwrap_or(request_path);
        route_path == clean
    }
}

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

fn invalid_token() -> Result<Response<ResponseBody>> {
    deliver_unauthorized("INVALID_TOKEN", "Invalid JWT").context("Failed to deliver 401 response")
}

fn internal_error() -> Response<ResponseBody> {
    deliver_error_json(
        "INTERNAL_ERROR",
        "An internal error occurred",
        StatusCode::INTERNAL_SERVER_ERROR,
    )
    .unwrap_or_else(|_| {
        let mut response = Response::new(full(""));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}

// ---------------------------------------------------------------------------
// API router
//
// Access class is fixed here at the routing level:
//
//   .get(...) / .post(...)   → Open     : handler gets (req, state)
//   .get_secured(...)        → Secured  : handler gets (req, state, identity)
// ---------------------------------------------------------------------------

pub fn build_api_router() -> Router {
    Router::new()
        // ── Public: no auth ──────────────────────────────────────────────────
        .post("/auth/login", |req, state| async move {
            auth::handle_login(req, state).await.context("Login failed")
        })
        .get("/public", |req, state| async move {
            hello::handle_public(req, state).await.context("Public get failed")
        })
        .get("/health", |req, state| async move {
            hello::handle_health(req, state).await.context("Health check failed")
        })
        // ── Secured: principal required ──────────────────────────────────────
        .get_secured("/secure", |req, state, identity| async move {
            hello::handle_secure(req, state, identity)
                .await
                .context("Secure get failed")
        })
        .get_secured("/auth/me", |req, state, identity| async move {
            hello::handle_me(req, state, identity)
                .await
                .context("Identity get failed")
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
