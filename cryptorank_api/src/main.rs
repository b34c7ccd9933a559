mod api;
mod config;
mod convert;
mod snapshot;

#[macro_use]
extern crate log;

use std::error::Error;
use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, middleware};
use dotenv::dotenv;
use listenfd::ListenFd;

use cryptorank_util::init_logging;
use cryptorank_data::{CoinGeckoClient, FreshnessCache, MarketSourceRef};
use crate::config::ApiConfig;

const DEFAULT_LOG_FILTERS: &'static str =
    "actix_server=info,actix_web=info,cryptorank_api=info,cryptorank_data=info,warn";

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let env_result = dotenv();
    init_logging(DEFAULT_LOG_FILTERS);

    if let Err(err) = env_result {
        warn!("Failed to load .env file: {}", err);
    }

    let config = ApiConfig::from_env()?;
    info!("Upstream: '{}' (freshness window = {:?}, timeout = {:?})",
          config.upstream_url, config.cache_ttl, config.timeout);

    let client = CoinGeckoClient::new(&config.upstream_url, config.timeout)?;
    let source: MarketSourceRef = Arc::new(FreshnessCache::new(client, config.cache_ttl));

    // HTTP Server
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new(r#"%{r}a [%a] "%r" %s %b "%{Referer}i" "%{User-Agent}i" %Dms"#))
            .wrap(middleware::Compress::default())
            .data(source.clone())
            .service(api::services())
    });

    // Enable receiving passed file descriptors
    // Launch using `systemfd --no-pid -s http::PORT -- cargo watch -x run` to leverage this
    //
    let mut listenfd = ListenFd::from_env();
    server = match listenfd.take_tcp_listener(0)? {
        Some(listener) => {
            info!("Using listenfd");
            server.listen(listener)?
        },
        None => {
            let addr_input = config.listen_address();
            info!("Binding to listen address '{}'", addr_input);

            let sockets = cryptorank_util::tcp::bind_to(addr_input, config.backlog)?;
            for s in sockets {
                server = server.listen(s)?;
            }

            server
        }
    };

    info!("Starting server");
    server.run().await?;
    Ok(())
}
