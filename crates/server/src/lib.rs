use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::{Extension, Router};
use blogsift_core::{Extractor, FetchConfig};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod endpoints;
pub mod error;

#[derive(Parser, Clone, Debug)]
#[command(version, about = "HTTP service extracting blog articles and their images")]
pub struct Config {
    #[arg(long, env = "BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    #[arg(long, help = "Upstream fetch timeout in seconds", env = "FETCH_TIMEOUT", default_value_t = 20)]
    pub fetch_timeout: u64,

    #[arg(long, help = "User-Agent sent upstream", env = "USER_AGENT")]
    pub user_agent: Option<String>,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn fetch_config(&self) -> FetchConfig {
        let mut fetch = FetchConfig { timeout: self.fetch_timeout, ..Default::default() };
        if let Some(user_agent) = &self.user_agent {
            fetch.user_agent = user_agent.clone();
        }
        fetch
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub fetch: Arc<FetchConfig>,
    pub extractor: Arc<Extractor>,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        let fetch = config.fetch_config();
        Self { config: Arc::new(config), fetch: Arc::new(fetch), extractor: Arc::new(Extractor::new()) }
    }
}

/// Builds the service router with its middleware stack.
pub fn app(context: AppContext) -> Router {
    Router::new()
        .merge(endpoints::routes())
        .merge(endpoints::health_check())
        .layer(Extension(context))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
