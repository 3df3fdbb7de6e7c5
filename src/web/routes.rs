use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use crate::error::DetectError;
use crate::pipeline::{self, StatusMessage};
use crate::web::display::png_data_uri;
use crate::web::page::Page;
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SampleQuery {
    pub sample: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetectForm {
    pub sample: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/detect", post(detect))
        .route("/health", get(health))
        .with_state(state)
}

async fn index(State(state): State<AppState>, Query(query): Query<SampleQuery>) -> Html<String> {
    let selected = state.resolve_sample(query.sample.as_deref());
    let page = Page::new(state.source.names(), selected);

    if let Some(err) = state.model_error() {
        return Html(page.with_model_error(err).to_html());
    }

    let page = match state.source.load(selected).map_err(|e| e.to_string()).and_then(|sample| {
        png_data_uri(&sample).map_err(|e| format!("{e:#}"))
    }) {
        Ok(uri) => page.with_original(uri),
        Err(err) => page.with_image_error(&err),
    };
    Html(page.to_html())
}

async fn detect(State(state): State<AppState>, Form(form): Form<DetectForm>) -> Html<String> {
    let selected = state.resolve_sample(Some(&form.sample)).to_string();

    let detector = match state.detector() {
        Ok(detector) => detector.clone(),
        Err(err) => {
            let page = Page::new(state.source.names(), &selected).with_model_error(err);
            return Html(page.to_html());
        }
    };

    let worker = state.clone();
    let name = form.sample.clone();
    let result = tokio::task::spawn_blocking(move || {
        let prepared = pipeline::prepare_sample(&worker.source, &name, &worker.config.preprocess)?;
        // only inference is serialised
        let detections = {
            let mut detector = detector.lock();
            pipeline::detect_prepared(&mut **detector, &prepared)?
        };
        Ok(prepared.into_outcome(&detections, &worker.renderer))
    })
    .await
    .unwrap_or_else(|e| Err(DetectError::Inference(e.to_string())));

    let page = Page::new(state.source.names(), &selected);
    let page = match result {
        Ok(outcome) => {
            match (png_data_uri(&outcome.original), png_data_uri(&outcome.rendered)) {
                (Ok(original), Ok(rendered)) => page
                    .with_original(original)
                    .with_detected(rendered, outcome.caption())
                    .with_status(outcome.status),
                (Err(e), _) | (_, Err(e)) => {
                    page.with_status(StatusMessage::Error(format!("Unable to display result: {e:#}")))
                }
            }
        }
        Err(err @ DetectError::ImageNotFound { .. }) => {
            log::warn!("{}", err);
            page.with_image_error(&err.to_string())
        }
        Err(err) => {
            log::error!("{}", err);
            page.with_status(StatusMessage::from(&err))
        }
    };
    Html(page.to_html())
}

async fn health(State(state): State<AppState>) -> (StatusCode, String) {
    match state.model_error() {
        None => (StatusCode::OK, "ok".to_string()),
        Some(err) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
    }
}
