/// Tower middleware module
///
/// - `AppService` adapts the router into a `tower::Service` per connection
/// - `TimeoutLayer` bounds how long a single request may take
pub mod app_service;
pub mod tower_timeout_handler;

pub use app_service::{AppService, PeerAddr};
pub use tower_timeout_handler::{TimeoutLayer, TimeoutService};
