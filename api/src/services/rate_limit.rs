//! Per-client rate limiting for endpoints that write to the catalog
//!
//! Keys on the same proxy-aware address ratings are keyed by
//! (X-Forwarded-For, X-Real-IP, Forwarded, then the peer address).

use axum::Router;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

use crate::config::AppConfig;

/// Allow a burst of `rate_limit_burst` requests per client, then one more
/// every `rate_limit_replenish_secs` seconds. A zero burst or period turns
/// limiting off.
pub fn limit_writes<S>(router: Router<S>, config: &AppConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let Some(governor) = GovernorConfigBuilder::default()
        .per_second(config.rate_limit_replenish_secs)
        .burst_size(config.rate_limit_burst)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
    else {
        tracing::warn!(
            burst = config.rate_limit_burst,
            replenish_secs = config.rate_limit_replenish_secs,
            "write rate limiting disabled"
        );
        return router;
    };

    router.layer(GovernorLayer {
        config: governor.into(),
    })
}
