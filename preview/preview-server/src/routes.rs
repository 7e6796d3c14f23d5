//! Route handlers for the preview service.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine as _;
use preview_render::{render_preview, PlannerBinding, PreviewError, RenderOptions};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Uploads larger than this are rejected outright.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

type Binding = Arc<dyn PlannerBinding>;

/// Build the service router around a planner engine.
pub fn build_router(binding: Binding) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/visualize", post(visualize))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(binding)
}

#[derive(Serialize)]
struct VisualizeResponse {
    image: String,
    meta: VisualizeMeta,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VisualizeMeta {
    layers: usize,
    selected_layer: usize,
    z_height: f64,
}

async fn visualize(State(binding): State<Binding>, multipart: Multipart) -> Response {
    let (stl, fields) = match collect_upload(multipart).await {
        Ok(parts) => parts,
        Err(err) => return error_response(&err),
    };

    let options = match parse_options(&fields) {
        Ok(options) => options,
        Err(err) => return error_response(&err),
    };

    // All awaits are done; the planner session lives entirely within
    // this synchronous stretch.
    let result = write_upload(&stl)
        .and_then(|stl_file| render_preview(binding.as_ref(), stl_file.path(), &options));

    match result {
        Ok(artifact) => {
            info!(
                layer = artifact.selected_layer,
                layers = artifact.layer_count,
                bytes = artifact.png.len(),
                "Served layer preview"
            );
            let image = format!(
                "data:image/png;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(&artifact.png)
            );
            Json(VisualizeResponse {
                image,
                meta: VisualizeMeta {
                    layers: artifact.layer_count,
                    selected_layer: artifact.selected_layer,
                    z_height: artifact.z_height,
                },
            })
            .into_response()
        }
        Err(err) => error_response(&err),
    }
}

/// Pull the STL bytes and the plain form fields out of the multipart
/// body.
async fn collect_upload(
    mut multipart: Multipart,
) -> Result<(Vec<u8>, HashMap<String, String>), PreviewError> {
    let mut stl: Option<Vec<u8>> = None;
    let mut fields = HashMap::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                return Err(PreviewError::InvalidParameter(format!(
                    "Malformed multipart body: {err}"
                )))
            }
        };

        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "stl" {
            let bytes = field.bytes().await.map_err(|err| {
                PreviewError::InvalidParameter(format!("Failed to read upload: {err}"))
            })?;
            stl = Some(bytes.to_vec());
        } else {
            let value = field.text().await.map_err(|err| {
                PreviewError::InvalidParameter(format!("Failed to read field {name}: {err}"))
            })?;
            fields.insert(name, value);
        }
    }

    let stl = stl.ok_or_else(|| {
        PreviewError::MissingInput("Missing STL upload under `stl` field".to_string())
    })?;

    Ok((stl, fields))
}

/// Translate form fields into render options, starting from defaults.
fn parse_options(fields: &HashMap<String, String>) -> Result<RenderOptions, PreviewError> {
    fn invalid<E>(_: E) -> PreviewError {
        PreviewError::InvalidParameter("Invalid numeric parameter.".to_string())
    }

    let mut options = RenderOptions::default();
    if let Some(value) = fields.get("layerHeight") {
        options.layer_height = value.trim().parse().map_err(invalid)?;
    }
    if let Some(value) = fields.get("infillSpacing") {
        options.infill_spacing = value.trim().parse().map_err(invalid)?;
    }
    if let Some(value) = fields.get("layer") {
        options.layer = value.trim().parse().map_err(invalid)?;
    }

    let flag = |name: &str, default: bool| {
        fields.get(name).map_or(default, |value| value == "true")
    };
    options.show_mesh = flag("showMesh", options.show_mesh);
    options.show_contours = flag("showContours", options.show_contours);
    options.show_infill = flag("showInfill", options.show_infill);
    options.show_raw_intersections = flag("showRawIntersections", options.show_raw_intersections);
    options.color_intersecting = flag("colorIntersections", options.color_intersecting);

    options.validate()?;
    Ok(options)
}

/// Spill the upload to a temp file so the planner can read it by path.
fn write_upload(stl: &[u8]) -> Result<tempfile::NamedTempFile, PreviewError> {
    let map_io = |source: std::io::Error| PreviewError::Io {
        path: std::env::temp_dir().join("upload.stl"),
        source,
    };

    let mut file = tempfile::Builder::new()
        .prefix("preview-upload-")
        .suffix(".stl")
        .tempfile()
        .map_err(map_io)?;
    file.write_all(stl).map_err(map_io)?;
    file.flush().map_err(map_io)?;
    Ok(file)
}

fn error_response(err: &PreviewError) -> Response {
    let status = if err.is_caller_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    warn!(%err, status = status.as_u16(), "Preview request failed");
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
