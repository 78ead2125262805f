use crate::{
    app,
    state::{AppState, SharedState},
    util::app_url,
};
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header::CONTENT_TYPE, header::LOCATION},
};
use http_body_util::BodyExt;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use test_log::test;
use tower::Service;


const BOUNDARY: &str = "geoweb-test-boundary";

fn test_app(pool: Pool<Sqlite>) -> (Router, AppState) {
    let state = Arc::new(SharedState::test(pool));
    (app(state.clone()), state)
}

fn test_app_with_upload_limit(pool: Pool<Sqlite>, limit: usize) -> (Router, AppState) {
    let mut state = SharedState::test(pool);
    state.config.max_upload_size = limit;
    let state = Arc::new(state);
    (app(state.clone()), state)
}

async fn get(app: &mut Router, path: &str) -> Response<Body> {
    let req = Request::builder()
        .uri(path)
        .method("GET")
        .body(Body::empty())
        .expect("Failed to build request");
    app.as_service()
        .call(req)
        .await
        .expect("Failed to execute request")
}

/// Posts a multipart form containing `contents` as the uploaded file
async fn upload(app: &mut Router, contents: &str, skip_header: bool) -> Response<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"locations.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {contents}\r\n"
    );
    if skip_header {
        body.push_str(&format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"skip_header\"\r\n\r\n\
             on\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    let req = Request::builder()
        .uri(app_url("/location/upload"))
        .method("POST")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("Failed to build request");
    app.as_service()
        .call(req)
        .await
        .expect("Failed to execute request")
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Body is not utf8")
}

async fn row_count(state: &AppState) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM location")
        .fetch_one(state.db.pool())
        .await
        .expect("Failed to count rows")
}

fn redirect_target(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(LOCATION)
        .expect("no location header")
        .to_str()
        .expect("location header is not a string")
}

#[test(sqlx::test(migrations = "../db/migrations/"))]
async fn test_root_redirects(pool: Pool<Sqlite>) {
    let (mut app, _state) = test_app(pool);

    let response = get(&mut app, "/").await;
    assert!(response.status().is_redirection());
    assert_eq!(redirect_target(&response), "/app/");

    let response = get(&mut app, "/app/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(redirect_target(&response), "/app/table/location");

    let response = get(&mut app, "/app/table/location").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(redirect_target(&response), "/app/location/");

    let response = get(&mut app, "/app/location/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(redirect_target(&response), "/app/location/upload");
}

#[test(sqlx::test(migrations = "../db/migrations/"))]
async fn test_tables_without_upload(pool: Pool<Sqlite>) {
    let (mut app, _state) = test_app(pool);
    for (slug, label) in [
        ("rock-units", "Rock Units"),
        ("measurements", "Measurements"),
        ("samples", "Samples"),
    ] {
        let response = get(&mut app, &app_url(&format!("/table/{slug}"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Upload UI for this table is not yet implemented."));
        assert!(body.contains(&format!("<h1>{label}</h1>")));
        // the menu entry for this table is highlighted
        assert!(body.contains("class=\"selected\""));
    }
}

#[test(sqlx::test(migrations = "../db/migrations/"))]
async fn test_unknown_table(pool: Pool<Sqlite>) {
    let (mut app, _state) = test_app(pool);
    let response = get(&mut app, &app_url("/table/minerals")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
