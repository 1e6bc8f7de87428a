use std::sync::Arc;

use harness_util::Config;

use crate::rate_limit::RateLimiter;

/// Shared, read-only process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(
            config.http.rate_limit.per_second,
            config.http.rate_limit.burst,
        ));
        Self { config, rate_limiter }
    }
}
