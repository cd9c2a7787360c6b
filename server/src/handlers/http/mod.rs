use std::convert::Infallible;

use bytes::Bytes;
use http_body_util::combinators::{BoxBody, UnsyncBoxBody};

pub mod auth;
pub mod hello;
pub mod routes;
pub mod utils;

/// Body type handlers receive; the connection's body, boxed.
pub type RequestBody = UnsyncBoxBody<Bytes, hyper::Error>;

/// Body type every handler responds with.
pub type ResponseBody = BoxBody<Bytes, Infallible>;
