// Application state module
// Everything a request handler needs, fixed at startup

use hyper::body::Bytes;

use super::types::Config;
use crate::handler::landing;

/// Application state
///
/// Constructed once in `main` and shared via `Arc` with every connection
/// task. Nothing in here changes after startup, so no locking is involved.
pub struct AppState {
    pub config: Config,
    /// The fixed landing page, materialized once
    pub landing_page: Bytes,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            landing_page: landing::page_bytes(),
        }
    }
}
