use axum::http::{header, HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

#[cfg(not(test))]
use {
    axum::extract::ConnectInfo,
    std::net::{IpAddr, SocketAddr},
    std::sync::Arc,
    tower_governor::{governor::GovernorConfigBuilder, key_extractor::KeyExtractor, GovernorLayer},
    tracing::warn,
};

use crate::api::handlers::{self, AppState};
use crate::config::ServerConfig;

/// Create the router with both endpoints and the middleware stack
#[cfg_attr(test, allow(unused_variables))]
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    #[cfg_attr(test, allow(unused_mut))]
    let mut api_routes = Router::new()
        .route("/", get(handlers::health_check))
        .route("/recommend", post(handlers::recommend))
        .with_state(state);

    // Apply rate limiting only in non-test builds
    // NOTE: the key extractor uses the peer address recorded by
    // `into_make_service_with_connect_info`, falling back to 127.0.0.1 when it
    // is absent (e.g. requests driven through `oneshot`).
    #[cfg(not(test))]
    {
        #[derive(Clone, Copy, Debug)]
        struct FallbackIpKeyExtractor;

        impl KeyExtractor for FallbackIpKeyExtractor {
            type Key = IpAddr;

            fn extract<B>(
                &self,
                req: &axum::http::Request<B>,
            ) -> Result<Self::Key, tower_governor::GovernorError> {
                if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>()
                {
                    return Ok(addr.ip());
                }

                Ok(IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)))
            }
        }

        // `per_*` sets the replenish interval of one permit, not a rate
        let rate = server.api_rate_limit.max(1);
        let burst = u32::try_from(rate.saturating_mul(2)).unwrap_or(u32::MAX);
        match GovernorConfigBuilder::default()
            .key_extractor(FallbackIpKeyExtractor)
            .per_nanosecond((1_000_000_000 / rate).max(1))
            .burst_size(burst)
            .finish()
        {
            Some(config) => {
                api_routes = api_routes.layer(GovernorLayer {
                    config: Arc::new(config),
                });
            }
            None => warn!(
                "Invalid rate limit configuration ({} req/s), rate limiting disabled",
                server.api_rate_limit
            ),
        }
    }

    api_routes
        .layer(
            // Request body size limit - prevent memory exhaustion from large payloads
            RequestBodyLimitLayer::new(server.max_request_body_size),
        )
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .allow_origin(tower_http::cors::Any)
                .max_age(Duration::from_secs(3600)),
        )
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}
