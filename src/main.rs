use std::convert::TryFrom;
use std::env;
use std::net::SocketAddr;
use std::process::exit;
use std::sync::Arc;

use futures::StreamExt;
use hyper::client::HttpConnector;
use hyper::{Client, Uri};
use hyper_socks2::SocksConnector;
use log::{error, info, warn};
use telegram_bot::connector::hyper::{default_connector, HyperConnector};
use telegram_bot::connector::Connector;
use telegram_bot::Api;

use crossword_bot::bot::CrosswordBot;
use crossword_bot::catalog::Catalog;
use crossword_bot::storage::{FallbackStore, MemoryStore, SledStore};
use crossword_bot::webhook::Webhook;

const DEFAULT_MINI_APP_URL: &str = "https://kbbi-crossword.example.app";

fn socks5_connector(addr: String) -> Box<dyn Connector> {
    let mut connector = HttpConnector::new();
    connector.enforce_http(false);
    Box::new(HyperConnector::new(
        Client::builder().build(
            SocksConnector {
                proxy_addr: Uri::try_from(addr).unwrap(),
                auth: None,
                connector,
            }
            .with_tls()
            .unwrap(),
        ),
    ))
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let token = match env::var("BOT_TOKEN") {
        Ok(token) => token,
        Err(_) => {
            error!("BOT_TOKEN is not set");
            exit(1);
        }
    };
    let mini_app_url =
        env::var("MINI_APP_URL").unwrap_or_else(|_| DEFAULT_MINI_APP_URL.to_owned());
    let connector = env::var("PROXY").map_or_else(|_| default_connector().unwrap(), socks5_connector);
    let api = Api::with_connector(token.clone(), connector);

    let catalog = match Catalog::standard() {
        Ok(catalog) => catalog,
        Err(err) => {
            error!("level catalog failed to load: {}", err);
            exit(1);
        }
    };

    let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "data/progress".to_owned());
    let primary = match SledStore::open(&data_dir) {
        Ok(store) => Some(store),
        Err(err) => {
            warn!("sled store unavailable at {}: {}", data_dir, err);
            None
        }
    };
    let store = FallbackStore::new(primary, MemoryStore::new());

    let bot = Arc::new(CrosswordBot::new(api.clone(), store, catalog, mini_app_url));

    if let Ok(webhook_url) = env::var("WEBHOOK_URL") {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000u16);
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        // The webhook itself is registered with Telegram out of band.
        info!("expecting updates at {}/bot<token>", webhook_url);
        if let Err(err) = Webhook::new(bot, &token).serve(addr).await {
            error!("webhook server failed: {}", err);
            exit(1);
        }
    } else {
        info!("no WEBHOOK_URL set, falling back to long polling");
        let mut stream = api.stream();
        while let Some(update) = stream.next().await {
            match update {
                Ok(update) => {
                    if let Err(err) = bot.handle_update(update).await {
                        warn!("update handling failed: {}", err);
                    }
                }
                Err(err) => warn!("polling error: {}", err),
            }
        }
    }
}
