use anyhow::{Context, Result};
use axum::{
    RequestPartsExt, Router,
    extract::{FromRequestParts, MatchedPath, rejection::MatchedPathRejection},
    http::request::Parts,
    response::{IntoResponse, Redirect},
    routing::get,
};
use axum_template::engine::Engine;
use clap::Parser;
use minijinja::Environment;
use state::{AppState, SharedState, TemplateEngine};
use std::{path::PathBuf, sync::Arc};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, info, warn};
use tracing_subscriber::filter::EnvFilter;

mod config;
mod error;
mod html;
mod state;
mod util;

const APP_PREFIX: &str = "/app/";

// Because minijinja loads an entire folder, we need to remove the `/app/` prefix
// and add a `.html.j2` suffix. Path parameters such as `{slug}` become `$slug`.
pub struct TemplateKey(pub String);

impl<S> FromRequestParts<S> for TemplateKey
where
    S: Send + Sync,
{
    type Rejection = MatchedPathRejection;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        let mut key = parts
            .extract::<MatchedPath>()
            .await?
            .as_str()
            .trim_start_matches(APP_PREFIX)
            .trim_end_matches('/')
            .replace('{', "$")
            .replace('}', "")
            .replace('/', "_");

        if key.is_empty() {
            key = "_INDEX".to_string();
        }
        key.push_str(".html.j2");
        Ok(TemplateKey(key))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(short, long, default_value = "config.yaml")]
    pub config: PathBuf,
    #[arg(short, long, default_value = "prod")]
    pub env: String,
    #[arg(short, long, default_value = "web")]
    pub datadir: PathBuf,
}

pub(crate) fn template_engine<P: Into<PathBuf>>(envname: &str, template_dir: P) -> TemplateEngine {
    let template_dir = template_dir.into();
    debug!(?template_dir, "Loading templates");
    let mut jinja = Environment::new();
    jinja.set_loader(minijinja::path_loader(template_dir));
    jinja.add_global("environment", envname);
    jinja.add_filter("app_url", util::app_url);
    jinja.add_filter("fmtnum", util::format_number);
    Engine::from(jinja)
}

pub(crate) fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .nest_service("/static", ServeDir::new(state.datadir.join("static")))
        .nest(APP_PREFIX, html::router(state.config.max_upload_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("GEOWEB_LOG"))
        .init();
    let args = Cli::parse();
    debug!(?args.config, ?args.env, "Loading configuration");
    let mut env = config::load(&args.config, &args.env)?;
    env.init()?;

    let shared_state = Arc::new(SharedState::new(&args.env, env, args.datadir).await?);
    let listen = &shared_state.config.listen;
    let listener = tokio::net::TcpListener::bind((listen.host.as_str(), listen.port))
        .await
        .with_context(|| format!("Unable to listen on {}:{}", listen.host, listen.port))?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(shared_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Unable to listen for the shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn root() -> impl IntoResponse {
    Redirect::permanent(APP_PREFIX)
}
