use crate::config::PortalConfig;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing::{debug, warn};
use twilight_gateway::{
    cluster::{Cluster, ClusterBuilder},
    Intents,
};

pub fn init(config: &PortalConfig) {
    tracing_subscriber::fmt()
        .with_level(true)
        .with_thread_ids(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();

    debug!("Loaded Config: {:?}", config);

    if let Some(port) = config.metrics.port {
        let socket = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), port);
        match PrometheusBuilder::new().with_http_listener(socket).install() {
            Ok(()) => debug!("Metrics endpoint listening on http://0.0.0.0:{}", port),
            Err(err) => warn!("Failed to set up Prometheus metrics exporter: {}", err),
        }
    }
}

pub fn http_client(config: &PortalConfig, token: String) -> twilight_http::Client {
    debug!("Creating Discord HTTP client");
    // Use the twilight HTTP proxy when configured
    if let Some(proxy) = config.discord.proxy.as_ref() {
        twilight_http::Client::builder()
            .token(token)
            .proxy(proxy.clone(), true)
            .ratelimiter(None)
            .build()
    } else {
        twilight_http::Client::new(token)
    }
}

pub fn cluster(token: String, intents: Intents) -> ClusterBuilder {
    Cluster::builder(token, intents)
}
