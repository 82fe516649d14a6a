use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// How long `/slow` waits before answering.
pub const SLOW_DELAY: Duration = Duration::from_secs(2);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub link: String,
}

#[derive(Deserialize)]
pub struct NewArticle {
    pub title: String,
    #[serde(default)]
    pub link: String,
}

/// The `{errorCode, errorMsg, data}` wrapper every endpoint answers with.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "errorCode")]
    pub error_code: i32,
    #[serde(rename = "errorMsg")]
    pub error_msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            error_code: 0,
            error_msg: String::new(),
            data: Some(data),
        })
    }

    fn rejected(code: i32, msg: &str) -> Json<Self> {
        Json(Self {
            error_code: code,
            error_msg: msg.to_string(),
            data: None,
        })
    }
}

pub type Db = Arc<RwLock<HashMap<Uuid, Article>>>;

pub fn app() -> Router {
    app_with(Vec::new())
}

/// Build the router with `articles` already stored.
pub fn app_with(articles: Vec<Article>) -> Router {
    let db: Db = Arc::new(RwLock::new(
        articles.into_iter().map(|a| (a.id, a)).collect(),
    ));
    Router::new()
        .route("/articles", get(list_articles).post(create_article))
        .route("/articles/{id}", get(get_article))
        .route("/broken", get(broken))
        .route("/slow", get(slow))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("mock server listening on {addr}");
    }
    axum::serve(listener, app()).await
}

async fn list_articles(State(db): State<Db>) -> Json<Envelope<Vec<Article>>> {
    let articles = db.read().await;
    let mut all: Vec<Article> = articles.values().cloned().collect();
    all.sort_by(|a, b| a.title.cmp(&b.title));
    Envelope::ok(all)
}

async fn get_article(State(db): State<Db>, Path(id): Path<Uuid>) -> Json<Envelope<Article>> {
    let articles = db.read().await;
    match articles.get(&id) {
        Some(article) => Envelope::ok(article.clone()),
        None => {
            log::debug!("article {id} not found");
            Envelope::rejected(404, "article not found")
        }
    }
}

async fn create_article(
    State(db): State<Db>,
    Json(input): Json<NewArticle>,
) -> Json<Envelope<Article>> {
    if input.title.trim().is_empty() {
        return Envelope::rejected(400, "title must not be empty");
    }
    let article = Article {
        id: Uuid::new_v4(),
        title: input.title,
        link: input.link,
    };
    db.write().await.insert(article.id, article.clone());
    Envelope::ok(article)
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}

async fn slow() -> Json<Envelope<&'static str>> {
    tokio::time::sleep(SLOW_DELAY).await;
    Envelope::ok("finally")
}
