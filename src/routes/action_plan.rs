//! Action plan route handlers
//!
//! Each handler makes exactly one stored routine call through the
//! [`ActionPlanStore`](crate::db::service::ActionPlanStore) and relays the
//! outcome. Plans are never inspected here.

use crate::error::{ApiResult, AppError};
use crate::models::{
    MessageResponse, ACTION_PLAN_ADDED, ACTION_PLAN_ADDED_WITH_DETAIL, ACTION_PLAN_EDITED,
};
use crate::state::SharedState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::num::{IntErrorKind, ParseIntError};
use tracing::{debug, info};

/// Parse a path id the way the database would cast it
fn parse_id(raw: &str) -> ApiResult<i32> {
    raw.trim().parse().map_err(|e: ParseIntError| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            AppError::IdOutOfRange(raw.to_string())
        }
        _ => AppError::InvalidId(raw.to_string()),
    })
}

/// `application/json` or any `+json` media type, parameters ignored
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Turn a raw request body into an opaque plan document.
///
/// A body not declared as JSON is never parsed and counts as absent, as does an
/// empty body or a literal JSON `null`.
fn parse_plan(headers: &HeaderMap, body: &Bytes) -> ApiResult<Value> {
    if !is_json_content_type(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::MissingBody);
    }

    let plan: Value =
        serde_json::from_slice(body).map_err(|e| AppError::MalformedBody(e.to_string()))?;

    if plan.is_null() {
        return Err(AppError::MissingBody);
    }
    Ok(plan)
}

fn row_count(rows: &Value) -> usize {
    rows.as_array().map_or(0, Vec::len)
}

/// GET /listar
pub async fn list_action_plans(State(state): State<SharedState>) -> ApiResult<Json<Value>> {
    debug!("Listing all action plans");

    let plans = state.action_plans.list().await?;

    info!("Listed {} action plans", row_count(&plans));
    Ok(Json(plans))
}

/// GET /listarDetalles/:id
///
/// Responds with the stored detail document as-is, not wrapped in an envelope.
pub async fn get_action_plan_details(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    debug!("Fetching details for action plan {}", id);

    let json_output = state.action_plans.details(id).await?;

    info!("Fetched details for action plan {}", id);
    Ok(([(header::CONTENT_TYPE, "application/json")], json_output))
}

/// GET /buscar/:id
pub async fn get_action_plan(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id)?;
    debug!("Fetching action plan {}", id);

    let rows = state.action_plans.find(id).await?;

    info!("Found {} rows for action plan {}", row_count(&rows), id);
    Ok(Json(rows))
}

/// POST /agregar
pub async fn add_action_plan(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<MessageResponse>> {
    let plan = parse_plan(&headers, &body)?;
    debug!("Adding action plan");

    state.action_plans.insert(&plan).await?;

    info!("Action plan added");
    Ok(Json(MessageResponse::new(ACTION_PLAN_ADDED)))
}

/// POST /agregarConDetalle
pub async fn add_action_plan_with_detail(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<MessageResponse>> {
    let plan = parse_plan(&headers, &body)?;
    debug!("Adding action plan with details");

    state.action_plans.insert_with_detail(&plan).await?;

    info!("Action plan with details added");
    Ok(Json(MessageResponse::new(ACTION_PLAN_ADDED_WITH_DETAIL)))
}

/// POST /editar
pub async fn edit_action_plan(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<MessageResponse>> {
    let plan = parse_plan(&headers, &body)?;
    debug!("Editing action plan");

    state.action_plans.update(&plan).await?;

    info!("Action plan edited");
    Ok(Json(MessageResponse::new(ACTION_PLAN_EDITED)))
}

/// DELETE /eliminar/:id
pub async fn delete_action_plan(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id)?;
    debug!("Deleting action plan {}", id);

    let result = state.action_plans.delete(id).await?;

    info!("Delete routine returned {} rows for action plan {}", row_count(&result), id);
    Ok(Json(result))
}
