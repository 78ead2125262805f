use crate::{
    TemplateKey,
    error::Error,
    state::AppState,
    util::{FlashMessage, FlashMessageKind, app_url},
};
use axum::{
    Router,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use libgeo::page::{self, NOT_IMPLEMENTED_MESSAGE, PageRoute, TablePage};
use minijinja::context;

mod location;
#[cfg(test)]
mod tests;

pub(crate) fn router(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/table/{slug}", get(show_table))
        .nest("/location/", location::router(upload_limit))
}

async fn root() -> impl IntoResponse {
    Redirect::to(&app_url(&format!("/table/{}", TablePage::default())))
}

async fn show_table(
    TemplateKey(key): TemplateKey,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, Error> {
    let table: TablePage = slug
        .parse()
        .map_err(|_| Error::NotFound(format!("No table named '{slug}'")))?;
    Ok(match table.route() {
        PageRoute::Location => Redirect::to(&app_url("/location/")).into_response(),
        PageRoute::NotImplemented(table) => state
            .render_template(
                key,
                context!(
                    menu => page::menu(table),
                    title => table.label(),
                    message => FlashMessage::new(FlashMessageKind::Warning, NOT_IMPLEMENTED_MESSAGE),
                ),
            )
            .into_response(),
    })
}
