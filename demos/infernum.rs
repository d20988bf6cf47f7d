use argh::FromArgs;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use std::collections::BTreeMap;

mod messages;

// defaults for the server
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

const CLASSES: [&str; 4] = ["glioma", "meningioma", "notumor", "pituitary"];

// a 1x1 transparent PNG
const PIXEL_PNG_B64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

#[derive(FromArgs)]
/// Mock inference service answering /predict and /explain with canned results.
struct InfernumArgs {
    /// the host to run the server on
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to run the server on
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,
}

struct Upload {
    file_name: Option<String>,
    bytes: Vec<u8>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await.map_err(|e| e.to_string())?;
        return Ok(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }
    Err("missing `file` field".to_string())
}

// deterministic fake classification so repeated uploads agree
fn classify(upload: &Upload) -> messages::PredictionResponse {
    let checksum = upload
        .bytes
        .iter()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(*b as u64));
    let class = CLASSES[(checksum % CLASSES.len() as u64) as usize];
    let confidence_score = 0.5 + (checksum % 50) as f64 / 100.0;

    messages::PredictionResponse {
        predicted_class: class.to_string(),
        confidence_score,
        filename: upload.file_name.clone(),
        all_classes: CLASSES.iter().map(|c| c.to_string()).collect(),
        xai: None,
    }
}

fn bad_request(error: String) -> Response {
    log::warn!("Rejecting upload: {}", error);
    (
        StatusCode::BAD_REQUEST,
        Json(messages::ErrorResponse { error }),
    )
        .into_response()
}

async fn post_predict(multipart: Multipart) -> Response {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(e) => return bad_request(e),
    };
    let response = classify(&upload);
    log::info!("Predicted {} for {} bytes", response.predicted_class, upload.bytes.len());
    (StatusCode::OK, Json(response)).into_response()
}

async fn post_explain(multipart: Multipart) -> Response {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(e) => return bad_request(e),
    };
    let mut response = classify(&upload);
    response.xai = Some(BTreeMap::from([
        ("gradcam".to_string(), PIXEL_PNG_B64.to_string()),
        ("shap".to_string(), PIXEL_PNG_B64.to_string()),
        ("lime".to_string(), PIXEL_PNG_B64.to_string()),
    ]));
    log::info!("Explained {} for {} bytes", response.predicted_class, upload.bytes.len());
    (StatusCode::OK, Json(response)).into_response()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: InfernumArgs = argh::from_env();

    // format the host and port
    let addr = format!("{}:{}", args.host, args.port);

    let app = Router::new()
        .route("/predict", post(post_predict))
        .route("/explain", post(post_explain))
        .layer(DefaultBodyLimit::max(
            infernum_lens::MAX_FILE_SIZE as usize + 64 * 1024,
        ));

    log::info!("Starting the mock inference server");
    log::info!("Listening on: {}", addr);
    log::info!("Press Ctrl+C to stop the server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
