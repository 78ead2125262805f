use crate::{
    TemplateKey,
    error::Error,
    state::{AppState, TemplateEngine},
    util::{FlashMessage, FlashMessageKind, app_url},
};
use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    routing::get,
};
use axum_template::RenderHtml;
use libgeo::{
    charts::{ChartsView, load_charts},
    ingest::{UploadOptions, upload_csv},
    location::LocationRecord,
    page::{self, TablePage},
    viewer::{DataView, load_view},
};
use minijinja::{Value, context};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

const NO_DATA_MESSAGE: &str = "No data available.";

pub(crate) fn router(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route(
            "/upload",
            get(show_upload)
                .post(upload_file)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/view", get(show_view))
        .route("/charts", get(show_charts))
}

async fn root() -> impl IntoResponse {
    Redirect::to(&app_url("/location/upload"))
}

/// The column lists shown side by side when an upload has the wrong shape
#[derive(Debug, Serialize)]
struct ColumnMismatch {
    expected: Vec<String>,
    actual: Vec<String>,
}

fn upload_failure(err: libgeo::Error) -> (FlashMessage, Option<ColumnMismatch>) {
    match err {
        libgeo::Error::SchemaMismatch { expected, actual } => (
            FlashMessage::new(FlashMessageKind::Error, "Column mismatch."),
            Some(ColumnMismatch { expected, actual }),
        ),
        e if e.is_parse_error() => (
            FlashMessage::new(FlashMessageKind::Error, format!("Error reading CSV: {e}")),
            None,
        ),
        e => (
            FlashMessage::new(FlashMessageKind::Error, format!("Failed: {e}")),
            None,
        ),
    }
}

fn render_upload(
    state: &AppState,
    key: String,
    message: Option<FlashMessage>,
    mismatch: Option<ColumnMismatch>,
    records: Option<Vec<LocationRecord>>,
) -> RenderHtml<String, TemplateEngine, Value> {
    state.render_template(
        key,
        context!(
            menu => page::menu(TablePage::Location),
            tab => "upload",
            format_hint => state.schema.format_hint(),
            message => message,
            mismatch => mismatch,
            records => records,
        ),
    )
}

async fn show_upload(
    TemplateKey(key): TemplateKey,
    State(state): State<AppState>,
) -> impl IntoResponse {
    render_upload(&state, key, None, None, None)
}

/// Collect the uploaded file and the options from the form fields
async fn read_upload_form(
    multipart: &mut Multipart,
) -> Result<(Option<Bytes>, UploadOptions), MultipartError> {
    let mut contents = None;
    let mut options = UploadOptions::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().map(String::from);
                let bytes = field.bytes().await?;
                debug!(?filename, size = bytes.len(), "Received upload");
                contents = Some(bytes);
            }
            "skip_header" => {
                let value = field.text().await?;
                options.skip_header = matches!(value.as_str(), "on" | "true" | "1");
            }
            other => trace!("Ignoring unexpected form field '{other}'"),
        }
    }
    Ok((contents, options))
}

async fn upload_file(
    TemplateKey(key): TemplateKey,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, Error> {
    let (contents, options) = match read_upload_form(&mut multipart).await {
        Ok(form) => form,
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            warn!("Upload rejected: {}", e.body_text());
            let message = FlashMessage::new(
                FlashMessageKind::Error,
                format!(
                    "Error reading CSV: the file is larger than the upload limit of {} bytes",
                    state.config.max_upload_size
                ),
            );
            return Ok(render_upload(&state, key, Some(message), None, None));
        }
        Err(e) => return Err(e.into()),
    };
    let contents = contents.ok_or_else(|| Error::RequiredParameterMissing("file".into()))?;

    let (message, mismatch, records) =
        match upload_csv(&contents, options, &state.schema, &state.db).await {
            Ok(report) => {
                info!(table = %report.table, inserted = report.inserted, "Upload complete");
                (
                    FlashMessage::new(FlashMessageKind::Success, report.message()),
                    None,
                    Some(report.records),
                )
            }
            Err(e) => {
                warn!("Upload rejected: {e}");
                let (message, mismatch) = upload_failure(e);
                (message, mismatch, None)
            }
        };
    Ok(render_upload(&state, key, Some(message), mismatch, records))
}

async fn show_view(
    TemplateKey(key): TemplateKey,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let (view, message) = match load_view(&state.schema, &state.db).await {
        Ok(DataView::Empty) => (
            None,
            Some(FlashMessage::new(FlashMessageKind::Info, NO_DATA_MESSAGE)),
        ),
        Ok(view) => (Some(view), None),
        Err(e) => {
            warn!("Failed to load data: {e}");
            (
                None,
                Some(FlashMessage::new(
                    FlashMessageKind::Error,
                    format!("Failed to load data: {e}"),
                )),
            )
        }
    };
    state.render_template(
        key,
        context!(
            menu => page::menu(TablePage::Location),
            tab => "view",
            view => view,
            message => message,
        ),
    )
}

async fn show_charts(
    TemplateKey(key): TemplateKey,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let (charts, message) = match load_charts(&state.schema, &state.db).await {
        Ok(ChartsView::Empty) => (
            None,
            Some(FlashMessage::new(FlashMessageKind::Info, NO_DATA_MESSAGE)),
        ),
        Ok(charts) => (Some(charts), None),
        Err(e) => {
            warn!("Failed to build charts: {e}");
            (
                None,
                Some(FlashMessage::new(
                    FlashMessageKind::Error,
                    format!("Visualization error: {e}"),
                )),
            )
        }
    };
    state.render_template(
        key,
        context!(
            menu => page::menu(TablePage::Location),
            tab => "charts",
            charts => charts,
            message => message,
        ),
    )
}
