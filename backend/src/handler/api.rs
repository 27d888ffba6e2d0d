use axum::{
    body::{Bytes, StreamBody},
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing, Json, Router,
};
use bytesize::ByteSize;
use flipfile_core::{
    config::DEFAULT_TOOL,
    tools,
    types::{ApiStatus, ErrorResp, ToolsResp, UploadResp},
};

use crate::storage::{self, Lookup};

use super::AppState;

const FILE_ID_CHARSET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

type ApiError = (StatusCode, Json<ErrorResp>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (status, Json(ErrorResp::new(detail)))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", routing::get(get_root))
        .route("/tools", routing::get(get_tools))
        .route("/upload", routing::post(post_upload))
        .route("/download/:filename", routing::get(get_download))
}

async fn get_root() -> Json<ApiStatus> {
    Json(ApiStatus {
        message: "FlipFile API".to_string(),
        status: "online".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn get_tools() -> Json<ToolsResp> {
    Json(ToolsResp {
        tools: tools::catalogue(),
    })
}

struct UploadForm {
    file: Option<(String, Bytes)>,
    tool: String,
    quality: String,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let invalid = |error: axum::extract::multipart::MultipartError| {
        tracing::warn!(%error, "failed to read multipart body");
        api_error(StatusCode::BAD_REQUEST, "Invalid multipart body")
    };

    let mut form = UploadForm {
        file: None,
        tool: DEFAULT_TOOL.to_string(),
        quality: "high".to_string(),
    };
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(invalid)?;
                if !file_name.is_empty() {
                    form.file = Some((file_name, data));
                }
            }
            "tool" => form.tool = field.text().await.map_err(invalid)?,
            "quality" => form.quality = field.text().await.map_err(invalid)?,
            _ => {}
        }
    }
    Ok(form)
}

async fn post_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResp>, ApiError> {
    let UploadForm {
        file,
        tool,
        quality,
    } = read_form(multipart).await?;
    let (original_name, data) =
        file.ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "No file provided"))?;

    let ext = storage::allowed_extension(&original_name).map_err(|ext| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("File type {ext} not allowed"),
        )
    })?;

    let file_size = data.len() as u64;
    if file_size > state.max_file_size {
        return Err(api_error(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!(
                "File too large. Max {}",
                ByteSize(state.max_file_size).to_string_as(true)
            ),
        ));
    }

    let file_id = random_string::generate(state.file_id_length, FILE_ID_CHARSET);
    let original = format!("{file_id}_original{ext}");
    let processed = format!("{file_id}_processed{ext}");

    let _permit = state.slots.acquire().await.map_err(|error| {
        tracing::error!(%error, "processing slots closed");
        api_error(StatusCode::SERVICE_UNAVAILABLE, "Server is shutting down")
    })?;

    tracing::info!(%file_id, %tool, %quality, file_size, "processing upload");

    let result: anyhow::Result<()> = async {
        state.uploads.store(&original, &data).await?;
        state.uploads.process(&original, &processed).await
    }
    .await;
    state.uploads.remove(&original).await;
    if let Err(error) = result {
        tracing::error!(error = %format!("{error:#}"), %file_id, "failed to process upload");
        state.uploads.remove(&processed).await;
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Processing error: {error}"),
        ));
    }

    Ok(Json(UploadResp::success(
        file_id,
        original_name,
        processed,
        file_size,
    )))
}

async fn get_download(
    Path(filename): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let lookup = state.uploads.load(&filename).await.map_err(|error| {
        tracing::error!(error = %format!("{error:#}"), %filename, "failed to read file");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to read file")
    })?;
    match lookup {
        Lookup::Found { file, size } => Ok((
            [
                (header::CONTENT_TYPE, mime::APPLICATION_OCTET_STREAM.to_string()),
                (header::CONTENT_LENGTH, size.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            StreamBody::new(storage::chunks(file)),
        )),
        Lookup::Missing => Err(api_error(StatusCode::NOT_FOUND, "File not found")),
        Lookup::Expired => Err(api_error(StatusCode::GONE, "File expired")),
    }
}
