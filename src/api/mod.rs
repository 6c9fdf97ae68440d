use axum::extract::{Path, Query};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::{Course, Entity, Professor, RecordId, Student};
use crate::services::FormController;
use crate::state::{AppState, SharedController};
use crate::validation::FormValues;

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state.clone())
        .nest(&api_path::<Student>(), entity_router(state.students))
        .nest(&api_path::<Course>(), entity_router(state.courses))
        .nest(&api_path::<Professor>(), entity_router(state.professors))
}

fn api_path<T: Entity>() -> String {
    format!("/api/{}", T::descriptor().table)
}

fn entity_router<T: Entity>(controller: SharedController<T>) -> Router {
    Router::new()
        .route("/", get(show_page::<T>))
        .route("/search", get(search::<T>))
        .route("/form", post(submit::<T>))
        .route("/form/cancel", post(cancel_edit::<T>))
        .route("/{id}/edit", post(begin_edit::<T>))
        .route("/{id}", axum::routing::delete(delete::<T>))
        .with_state(controller)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state
        .store
        .health_check()
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;
    Ok(StatusCode::OK)
}

/// The page view always comes back; a failed operation only changes the status.
fn page_response<T: Entity, R>(
    controller: &FormController<T>,
    result: Result<R, AppError>,
) -> Response {
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => e.status_code(),
    };
    (status, Json(controller.page())).into_response()
}

async fn show_page<T: Entity>(State(controller): State<SharedController<T>>) -> Response {
    let mut controller = controller.lock().await;
    let result = controller.reload().await;
    page_response(&controller, result)
}

async fn search<T: Entity>(
    State(controller): State<SharedController<T>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let mut controller = controller.lock().await;
    let result = controller.search(&params.q).await;
    page_response(&controller, result)
}

async fn submit<T: Entity>(
    State(controller): State<SharedController<T>>,
    Json(values): Json<FormValues>,
) -> Result<Response, AppError> {
    // A held lock means a save (or load) is still running on this form.
    let mut controller = controller
        .try_lock()
        .map_err(|_| AppError::SaveInProgress)?;
    let result = controller.submit(values).await;
    Ok(page_response(&controller, result))
}

async fn cancel_edit<T: Entity>(State(controller): State<SharedController<T>>) -> Response {
    let mut controller = controller.lock().await;
    controller.cancel_edit();
    page_response(&controller, Ok::<(), AppError>(()))
}

async fn begin_edit<T: Entity>(
    State(controller): State<SharedController<T>>,
    Path(id): Path<i64>,
) -> Response {
    let mut controller = controller.lock().await;
    let result = controller.edit_by_id(RecordId(id)).await;
    page_response(&controller, result)
}

async fn delete<T: Entity>(
    State(controller): State<SharedController<T>>,
    Path(id): Path<i64>,
) -> Response {
    let mut controller = controller.lock().await;
    let result = controller.delete(RecordId(id)).await;
    page_response(&controller, result)
}
