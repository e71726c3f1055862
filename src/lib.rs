pub mod catalog;
pub mod config;
pub mod form;
pub mod http;
pub mod models;
pub mod observer;
pub mod repo;
pub mod ui;

use tracing::info;

use catalog::Catalog;
use config::ClientConfig;
use http::{ApiError, HttpBookRepo};
use observer::TracingObserver;

pub type HttpCatalog = Catalog<HttpBookRepo, ApiError>;

/// Build a catalog that talks to the books API at the configured base URL.
/// Nothing is fetched until [`Catalog::load`] is called.
pub fn start_client(config: &ClientConfig) -> HttpCatalog {
    info!("Using books API at {}", config.base_url);

    Catalog::new(HttpBookRepo::new(config)).with_observer(TracingObserver)
}
