use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use log::{error, info};
use serde_json::{json, Value};
use thiserror::Error;

use crate::bot::CrosswordBot;
use crate::storage::KvStore;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("reading request body: {0}")]
    Http(#[from] hyper::Error),
    #[error("update envelope is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("telegram api: {0}")]
    Telegram(#[from] telegram_bot::Error),
}

/// HTTP surface for webhook deployments: one update endpoint and a health
/// check. A bad update answers 500 and the server keeps serving.
pub struct Webhook<S: KvStore> {
    bot: Arc<CrosswordBot<S>>,
    update_path: String,
}

impl<S: KvStore + 'static> Webhook<S> {
    pub fn new(bot: Arc<CrosswordBot<S>>, token: &str) -> Self {
        Self {
            bot,
            update_path: format!("/bot{}", token),
        }
    }

    pub async fn serve(self, addr: SocketAddr) -> Result<(), hyper::Error> {
        let webhook = Arc::new(self);
        let make_svc = make_service_fn(move |_conn| {
            let webhook = webhook.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |request| {
                    let webhook = webhook.clone();
                    async move { Ok::<_, Infallible>(webhook.route(request).await) }
                }))
            }
        });
        info!("webhook server listening on {}", addr);
        Server::bind(&addr).serve(make_svc).await
    }

    pub async fn route(&self, request: Request<Body>) -> Response<Body> {
        let path = request.uri().path().to_owned();
        match (request.method(), path.as_str()) {
            (&Method::GET, "/") => self.health(),
            (&Method::POST, path) if path == self.update_path => self.process_update(request).await,
            _ => json_response(StatusCode::NOT_FOUND, json!({ "error": "Not found" })),
        }
    }

    fn health(&self) -> Response<Body> {
        json_response(
            StatusCode::OK,
            json!({
                "status": "OK",
                "message": "KBBI Crossword Bot is running",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "miniAppUrl": self.bot.mini_app_url(),
            }),
        )
    }

    async fn process_update(&self, request: Request<Body>) -> Response<Body> {
        match self.dispatch(request).await {
            Ok(()) => Response::new(Body::empty()),
            Err(err) => {
                error!("webhook update failed: {}", err);
                json_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        }
    }

    async fn dispatch(&self, request: Request<Body>) -> Result<(), WebhookError> {
        let body = hyper::body::to_bytes(request.into_body()).await?;
        let value: Value = serde_json::from_slice(&body)?;
        // Mini-app payloads ride in as service messages; pull them out of the
        // raw envelope before typed parsing.
        if let Some((chat, user, data)) = extract_web_app_data(&value) {
            self.bot
                .handle_game_data(telegram_bot::ChatId::new(chat), user, &data)
                .await?;
            return Ok(());
        }
        let update: telegram_bot::Update = serde_json::from_value(value)?;
        self.bot.handle_update(update).await?;
        Ok(())
    }
}

fn extract_web_app_data(value: &Value) -> Option<(i64, i64, String)> {
    let message = value.get("message")?;
    let data = message.get("web_app_data")?.get("data")?.as_str()?;
    let chat = message.get("chat")?.get("id")?.as_i64()?;
    let user = message.get("from")?.get("id")?.as_i64()?;
    Some((chat, user, data.to_owned()))
}

fn json_response(status: StatusCode, body: Value) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}
