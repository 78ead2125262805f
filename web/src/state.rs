use crate::{config::EnvConfig, template_engine};
use anyhow::{Context, Result};
use axum_template::{RenderHtml, engine::Engine};
use libgeo::{Database, LOCATION_SCHEMA, Schema};
use secrecy::ExposeSecret;
use serde::Serialize;
use std::{path::PathBuf, sync::Arc};
use tracing::trace;

pub type TemplateEngine = Engine<minijinja::Environment<'static>>;

#[derive(Debug)]
pub struct SharedState {
    pub db: Database,
    pub tmpl: TemplateEngine,
    pub config: EnvConfig,
    /// the table that uploads go into
    pub schema: Schema,
    pub datadir: PathBuf,
}

impl SharedState {
    pub async fn new(envname: &str, env: EnvConfig, datadir: PathBuf) -> Result<Self> {
        let template = template_engine(envname, datadir.join("templates"));
        trace!("Creating shared app state");
        let db = Database::open(
            env.database.url.expose_secret(),
            env.database.acquire_timeout(),
        )
        .await
        .with_context(|| "Unable to open database")?;
        Ok(Self {
            db,
            tmpl: template,
            config: env,
            schema: LOCATION_SCHEMA,
            datadir,
        })
    }

    pub(crate) fn render_template<K: AsRef<str>, S: Serialize>(
        &self,
        key: K,
        ctx: S,
    ) -> RenderHtml<K, TemplateEngine, S> {
        RenderHtml(key, self.tmpl.clone(), ctx)
    }

    #[cfg(test)]
    pub fn test(pool: sqlx::Pool<sqlx::Sqlite>) -> Self {
        use crate::config::{DatabaseConfig, ListenConfig};

        let template = template_engine("test", "./templates");
        tracing::debug!("Creating test shared app state");
        Self {
            db: Database::from(pool),
            tmpl: template,
            config: EnvConfig {
                listen: ListenConfig {
                    host: "127.0.0.1".to_string(),
                    port: 8080,
                },
                database: DatabaseConfig {
                    url: "sqlite::memory:".to_string().into(),
                    urlfile: String::new(),
                    acquire_timeout: 5,
                },
                max_upload_size: crate::config::DEFAULT_MAX_UPLOAD_SIZE,
            },
            schema: LOCATION_SCHEMA,
            datadir: ".".into(),
        }
    }
}

pub type AppState = Arc<SharedState>;
