//! HTTP boundary for the predictor.
//!
//! Three stateless POST endpoints wrap the services; every request decodes
//! its own dataset and drops it once the response is written. The only
//! shared data is the immutable [`AppState`].

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::json;

use crate::data::codec;
use crate::error::DataError;
use crate::state::AppState;

/// Client page driving the three endpoints.
const INDEX_HTML: &str = include_str!("../templates/index.html");

/// Name of the multipart field carrying the uploaded CSV.
pub const UPLOAD_FIELD: &str = "file";

pub const DEFAULT_ROWS: i64 = 100;
pub const MIN_REQUEST_ROWS: i64 = 10;
pub const MAX_REQUEST_ROWS: i64 = 10_000;

// ---------------------------------------------------------------------------
// Error responses
// ---------------------------------------------------------------------------

/// An error rendered as `{"error": "..."}` with a matching status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        let status = match &err {
            DataError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            DataError::Schema(_) | DataError::InvalidArgument(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            DataError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            log::error!("{}", self.message);
        } else {
            log::warn!("rejected request: {}", self.message);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Builds the axum router.
///
/// Routes:
/// - `GET /` -- liveness check
/// - `GET /app` -- browser client
/// - `POST /predict/` -- CSV upload → CSV with predictions
/// - `POST /plot/` -- CSV upload → PNG regression plot
/// - `POST /create_dataset/?rows=N` -- synthetic CSV
pub fn build_router(state: Arc<AppState>) -> Router {
    let limit = state.max_upload_bytes;
    Router::new()
        .route("/", get(health_handler))
        .route("/app", get(index_handler))
        .route("/predict/", post(predict_handler))
        .route("/plot/", post(plot_handler))
        .route("/create_dataset/", post(create_dataset_handler))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

fn attachment(content_type: &'static str, filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        body,
    )
        .into_response()
}

/// Pull the CSV bytes out of the `file` multipart field.
async fn read_upload(mut multipart: Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            return Ok(field.bytes().await?);
        }
    }
    Err(ApiError::bad_request(format!(
        "missing multipart field '{UPLOAD_FIELD}'"
    )))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "App": "Running" }))
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn predict_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart).await?;
    let csv = state.prediction.handle(&upload)?;
    log::info!("predict: {} bytes in, {} bytes out", upload.len(), csv.len());
    Ok(attachment("text/csv", "predictions.csv", csv))
}

/// A missing required column is reported as a 200 JSON error body rather
/// than an error status; clients check for an `error` key before treating
/// the body as an image.
async fn plot_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart).await?;
    match state.plotting.handle(&upload) {
        Ok(artifact) => {
            log::info!("plot: {}", artifact.title);
            Ok(attachment("image/png", "plot.png", artifact.png))
        }
        Err(DataError::Schema(message)) => {
            log::warn!("plot: {message}");
            Ok(Json(json!({ "error": message })).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

#[derive(Debug, Deserialize)]
struct CreateDatasetParams {
    rows: Option<i64>,
}

async fn create_dataset_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CreateDatasetParams>,
) -> Result<Response, ApiError> {
    let rows = params.rows.unwrap_or(DEFAULT_ROWS);
    let csv = synthetic_csv(&state, rows)?;
    log::info!("create_dataset: {rows} rows");
    Ok(attachment("text/csv", "synthetic_data.csv", csv))
}

fn synthetic_csv(state: &AppState, rows: i64) -> Result<Vec<u8>, DataError> {
    if !(MIN_REQUEST_ROWS..=MAX_REQUEST_ROWS).contains(&rows) {
        return Err(DataError::invalid_argument(format!(
            "rows must be between {MIN_REQUEST_ROWS} and {MAX_REQUEST_ROWS}, got {rows}"
        )));
    }
    let dataset = state.generator.generate(&mut rand::rng(), rows)?;
    codec::encode(&dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::data::model::ModelCoefficients;

    const BOUNDARY: &str = "star-size-test-boundary";

    fn app() -> Router {
        let state = AppState::new(ModelCoefficients::default()).unwrap();
        build_router(Arc::new(state))
    }

    fn upload(uri: &str, field: &str, csv: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"data.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             {csv}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_bytes(resp: Response) -> Vec<u8> {
        resp.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    fn header_str<'a>(resp: &'a Response, name: header::HeaderName) -> &'a str {
        resp.headers().get(name).unwrap().to_str().unwrap()
    }

    #[tokio::test]
    async fn health_check() {
        let resp = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(body, json!({ "App": "Running" }));
    }

    #[tokio::test]
    async fn serves_client_page() {
        let resp = app()
            .oneshot(Request::get("/app").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let html = String::from_utf8(body_bytes(resp).await).unwrap();
        assert!(html.contains("/predict/"));
    }

    #[tokio::test]
    async fn predict_returns_csv_attachment() {
        let resp = app()
            .oneshot(upload("/predict/", "file", "Brightness,True Size\n10,30\n20,50"))
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        assert_eq!(header_str(&resp, header::CONTENT_TYPE), "text/csv");
        assert_eq!(
            header_str(&resp, header::CONTENT_DISPOSITION),
            "attachment; filename=predictions.csv"
        );

        let ds = codec::decode(&body_bytes(resp).await).unwrap();
        let preds: Vec<f64> = ds.observations.iter().filter_map(|o| o.prediction).collect();
        assert_eq!(preds.len(), 2);
        assert!((preds[0] - 29.32053).abs() < 1e-5);
        assert!((preds[1] - 49.14033).abs() < 1e-5);
    }

    #[tokio::test]
    async fn predict_header_only_keeps_predictions_column() {
        let resp = app()
            .oneshot(upload("/predict/", "file", "Brightness,True Size\n"))
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let body = String::from_utf8(body_bytes(resp).await).unwrap();
        assert_eq!(body, "Brightness,True Size,predictions\n");
    }

    #[tokio::test]
    async fn predict_rejects_three_columns() {
        let resp = app()
            .oneshot(upload("/predict/", "file", "a,b,c\n1,2,3"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 422);
        let body: serde_json::Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert!(body["error"].as_str().unwrap().contains("2 columns"));
    }

    #[tokio::test]
    async fn predict_rejects_non_numeric() {
        let resp = app()
            .oneshot(upload("/predict/", "file", "Brightness,True Size\nhigh,3"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn predict_requires_file_field() {
        let resp = app()
            .oneshot(upload("/predict/", "document", "Brightness,True Size\n1,2"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert!(body["error"].as_str().unwrap().contains("file"));
    }

    #[tokio::test]
    async fn plot_returns_png_attachment() {
        let resp = app()
            .oneshot(upload("/plot/", "file", "Brightness,True Size\n10,30\n20,50\n30,70"))
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        assert_eq!(header_str(&resp, header::CONTENT_TYPE), "image/png");
        assert_eq!(
            header_str(&resp, header::CONTENT_DISPOSITION),
            "attachment; filename=plot.png"
        );
        let png = body_bytes(resp).await;
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[tokio::test]
    async fn plot_missing_column_is_json_error() {
        let resp = app()
            .oneshot(upload("/plot/", "file", "Brightness\n10\n20"))
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        assert_eq!(header_str(&resp, header::CONTENT_TYPE), "application/json");
        let body = body_bytes(resp).await;
        assert_ne!(&body[..4.min(body.len())], b"\x89PNG");
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body["error"],
            "Columns 'Brightness' and 'True Size' are required in the dataset"
        );
    }

    #[tokio::test]
    async fn plot_header_only_is_json_error() {
        let resp = app()
            .oneshot(upload("/plot/", "file", "Brightness,True Size\n"))
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        assert_eq!(header_str(&resp, header::CONTENT_TYPE), "application/json");
        let body: serde_json::Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(body["error"], "dataset has no rows to plot");
    }

    #[tokio::test]
    async fn plot_malformed_input_is_bad_request() {
        let resp = app()
            .oneshot(upload("/plot/", "file", "Brightness,True Size\n1,2,3"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn create_dataset_defaults_to_100_rows() {
        let resp = app().oneshot(post("/create_dataset/")).await.unwrap();

        assert_eq!(resp.status(), 200);
        assert_eq!(
            header_str(&resp, header::CONTENT_DISPOSITION),
            "attachment; filename=synthetic_data.csv"
        );
        let body = body_bytes(resp).await;
        let text = String::from_utf8(body.clone()).unwrap();
        assert!(text.starts_with("Brightness,True Size\n"));

        let ds = codec::decode(&body).unwrap();
        assert_eq!(ds.len(), 100);
        assert!(ds
            .observations
            .iter()
            .all(|o| (0.0..=100.0).contains(&o.brightness) && o.true_size.is_finite()));
    }

    #[tokio::test]
    async fn create_dataset_honours_rows() {
        for rows in [MIN_REQUEST_ROWS, 250, MAX_REQUEST_ROWS] {
            let resp = app()
                .oneshot(post(&format!("/create_dataset/?rows={rows}")))
                .await
                .unwrap();
            assert_eq!(resp.status(), 200);
            let ds = codec::decode(&body_bytes(resp).await).unwrap();
            assert_eq!(ds.len() as i64, rows);
        }
    }

    #[tokio::test]
    async fn create_dataset_rejects_out_of_range() {
        for rows in [-5, 0, 9, MAX_REQUEST_ROWS + 1] {
            let resp = app()
                .oneshot(post(&format!("/create_dataset/?rows={rows}")))
                .await
                .unwrap();
            assert_eq!(resp.status(), 422, "rows = {rows}");
        }
    }

    #[tokio::test]
    async fn create_dataset_rejects_non_integer() {
        let resp = app()
            .oneshot(post("/create_dataset/?rows=many"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn concurrent_predictions_do_not_interfere() {
        let router = app();
        let a = router
            .clone()
            .oneshot(upload("/predict/", "file", "x,y\n1,0\n2,0\n3,0"));
        let b = router.oneshot(upload("/predict/", "file", "p,q\n100,0\n200,0"));
        let (a, b) = tokio::join!(a, b);

        let a = codec::decode(&body_bytes(a.unwrap()).await).unwrap();
        let b = codec::decode(&body_bytes(b.unwrap()).await).unwrap();

        let brightness = |ds: &crate::data::model::Dataset| -> Vec<f64> {
            ds.observations.iter().map(|o| o.brightness).collect()
        };
        assert_eq!(brightness(&a), vec![1.0, 2.0, 3.0]);
        assert_eq!(brightness(&b), vec![100.0, 200.0]);

        let model = ModelCoefficients::default();
        for o in a.observations.iter().chain(&b.observations) {
            let expected = model.slope * o.brightness + model.intercept;
            assert!((o.prediction.unwrap() - expected).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let state = AppState::new(ModelCoefficients::default())
            .unwrap()
            .with_max_upload_bytes(64);
        let router = build_router(Arc::new(state));
        let csv = format!("Brightness,True Size\n{}", "1,2\n".repeat(100));
        let resp = router.oneshot(upload("/predict/", "file", &csv)).await.unwrap();
        assert_eq!(resp.status(), 413);
    }
}
