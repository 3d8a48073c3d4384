use std::{
    fs,
    hash::{DefaultHasher, Hash, Hasher},
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Form, Json, Router,
    extract::State,
    http::{Method, StatusCode},
    response::Html,
    routing::{get, post},
};
use dfa_equiv_lib::{
    config::{DfaEquivConfig, EquivalenceConfig},
    definition::DfaFields,
    report::{CheckReport, check_and_render},
};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::pages::{self, CheckForm};

const ARTIFACT_PREFIX: &str = "check-";

/// Body of `POST /api/check`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckRequest {
    pub left: DfaFields,
    pub right: DfaFields,
    /// Defaults to drawing both automata.
    #[serde(default)]
    pub render: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    #[serde(flatten)]
    pub report: CheckReport,
    pub left_image_url: Option<String>,
    pub right_image_url: Option<String>,
}

pub fn serve(config: DfaEquivConfig) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(start_server(config))
}

async fn start_server(config: DfaEquivConfig) -> anyhow::Result<()> {
    let config = Arc::new(config);

    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index_handler).post(form_handler))
        .route("/api/check", post(check_handler))
        .nest_service(
            "/images",
            ServeDir::new(config.get_render().get_output_dir()),
        )
        .with_state(Arc::clone(&config))
        .layer(cors_layer);

    let addr = format!(
        "{}:{}",
        config.get_server().get_host(),
        config.get_server().get_port()
    );
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "Serving the equivalence checker");

    axum::serve(listener, app).await?;

    Ok(())
}

fn handle_error(err: impl std::fmt::Display) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Something went wrong: {err}"),
    )
}

async fn check_handler(
    State(config): State<Arc<DfaEquivConfig>>,
    Json(request): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, (StatusCode, String)> {
    let response = tokio::task::spawn_blocking(move || handle_check(request, &config))
        .await
        .map_err(handle_error)??;

    Ok(Json(response))
}

async fn index_handler() -> Html<String> {
    Html(pages::index_page())
}

async fn form_handler(
    State(config): State<Arc<DfaEquivConfig>>,
    Form(form): Form<CheckForm>,
) -> (StatusCode, Html<String>) {
    let request = CheckRequest::from(form);
    let result = tokio::task::spawn_blocking(move || handle_check(request, &config))
        .await
        .map_err(handle_error)
        .and_then(|result| result);

    match result {
        Ok(response) => (StatusCode::OK, Html(pages::result_page(&response))),
        Err((status, message)) => (status, Html(pages::error_page(&message))),
    }
}

/// Builds both automata, checks them and renders them.
///
/// Artifacts are rendered into a private staging directory which is then
/// renamed to `check-<hash of request>`, so a published directory is always
/// complete. Only the newest `max_retained_checks` directories are kept.
///
/// Invalid definitions and automata that cannot be compared are answered
/// with `422 Unprocessable Entity`.
pub fn handle_check(
    request: CheckRequest,
    config: &DfaEquivConfig,
) -> Result<CheckResponse, (StatusCode, String)> {
    let left = request
        .left
        .build()
        .map_err(|err| unprocessable(format!("left automaton: {err}")))?;
    let right = request
        .right
        .build()
        .map_err(|err| unprocessable(format!("right automaton: {err}")))?;

    let request_config = config
        .clone()
        .with_equivalence(bounded_equivalence_config(config));

    if !request.render.unwrap_or(true) {
        let report = check_and_render(&left, &right, &request_config, false)
            .map_err(|err| unprocessable(err.to_string()))?;
        return Ok(CheckResponse {
            report,
            left_image_url: None,
            right_image_url: None,
        });
    }

    let base_dir = config.get_render().get_output_dir();
    let staging = staging_dir(base_dir).map_err(handle_error)?;
    let render_config = config
        .get_render()
        .clone()
        .with_output_dir(staging.path().to_path_buf());

    let mut report = check_and_render(
        &left,
        &right,
        &request_config.with_render(render_config),
        true,
    )
    .map_err(|err| unprocessable(err.to_string()))?;

    let artifact_dir = artifact_dir_name(&request);
    let target = base_dir.join(&artifact_dir);
    publish(staging, &target).map_err(handle_error)?;
    prune_artifacts(
        base_dir,
        *config.get_server().get_max_retained_checks(),
        &target,
    );

    report.left_image = report.left_image.and_then(|path| relocate(&path, &target));
    report.right_image = report
        .right_image
        .and_then(|path| relocate(&path, &target));

    tracing::debug!(status = ?report.status, dir = %artifact_dir, "Answered check request");

    Ok(CheckResponse {
        left_image_url: report
            .left_image
            .as_deref()
            .and_then(|path| image_url(&artifact_dir, path)),
        right_image_url: report
            .right_image
            .as_deref()
            .and_then(|path| image_url(&artifact_dir, path)),
        report,
    })
}

fn unprocessable(message: String) -> (StatusCode, String) {
    (StatusCode::UNPROCESSABLE_ENTITY, message)
}

/// The equivalence config of a request, capped by the server's product
/// state bound.
fn bounded_equivalence_config(config: &DfaEquivConfig) -> EquivalenceConfig {
    let server_max = *config.get_server().get_max_product_states();
    let max = config
        .get_equivalence()
        .get_max_product_states()
        .map_or(server_max, |max| max.min(server_max));

    config
        .get_equivalence()
        .clone()
        .with_max_product_states(Some(max))
}

fn artifact_dir_name(request: &CheckRequest) -> String {
    let mut hasher = DefaultHasher::new();
    request.hash(&mut hasher);
    format!("{ARTIFACT_PREFIX}{:016x}", hasher.finish())
}

fn staging_dir(base_dir: &Path) -> io::Result<TempDir> {
    fs::create_dir_all(base_dir)?;
    tempfile::Builder::new()
        .prefix(".staging-")
        .tempdir_in(base_dir)
}

/// Moves a finished staging directory to `target`. If an identical request
/// already published `target`, its artifacts are kept and the staging copy
/// is dropped.
fn publish(staging: TempDir, target: &Path) -> io::Result<()> {
    match fs::rename(staging.path(), target) {
        Ok(()) => {
            staging.keep();
            Ok(())
        }
        Err(_) if target.is_dir() => Ok(()),
        Err(err) => Err(err),
    }
}

/// Deletes the oldest artifact directories until at most `keep` remain.
/// `current` is never deleted.
fn prune_artifacts(base_dir: &Path, keep: usize, current: &Path) {
    let entries = match fs::read_dir(base_dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(dir = %base_dir.display(), %err, "Could not list artifact directories");
            return;
        }
    };

    let mut dirs = entries
        .filter_map(Result::ok)
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(ARTIFACT_PREFIX))
        })
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && path != current)
        .filter_map(|path| Some((fs::metadata(&path).ok()?.modified().ok()?, path)))
        .collect::<Vec<_>>();

    // newest first
    dirs.sort_by(|a, b| b.0.cmp(&a.0));

    for (_, path) in dirs.into_iter().skip(keep.saturating_sub(1)) {
        match fs::remove_dir_all(&path) {
            Ok(()) => tracing::debug!(dir = %path.display(), "Removed old artifacts"),
            // a concurrent request pruned it first
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(dir = %path.display(), %err, "Could not remove old artifacts")
            }
        }
    }
}

fn relocate(path: &Path, target: &Path) -> Option<PathBuf> {
    Some(target.join(path.file_name()?))
}

fn image_url(artifact_dir: &str, path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    Some(format!("/images/{artifact_dir}/{file_name}"))
}
