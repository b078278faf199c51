use std::sync::Arc;

use tapline::config::Config;
use tapline::engine::Engine;
use tapline::external::arcgis::RouteService;
use tapline::server::serve;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("failed to load configuration: {}", err);
            std::process::exit(1);
        }
    };

    let solver = RouteService::new(config.route_service_url.clone(), config.api_key.clone());
    let engine = Engine::new(Arc::new(solver), config.session_settings());

    if let Err(err) = serve(engine, config.server_addr).await {
        tracing::error!("server stopped: {}", err);
        std::process::exit(1);
    }
}
