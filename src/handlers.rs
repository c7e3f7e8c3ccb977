use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::interactions;
use crate::leads::{filter_leads, search_leads, sort_leads};
use crate::metrics::{dashboard_metric_configs, derive_metrics};
use crate::models::*;
use crate::pipeline::{compute_conversion, group_by_status, leads_in_range, source_effectiveness};
use crate::scoring::score_lead;
use crate::session::{Preferences, Session};
use crate::store::CrmStore;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Leads, calls and meetings.
    pub store: CrmStore,
    /// Application configuration.
    pub config: Config,
    /// Presentation session (login flag and theme).
    pub session: RwLock<Session>,
}

impl AppState {
    pub fn new(store: CrmStore, config: Config, session: Session) -> Self {
        Self {
            store,
            config,
            session: RwLock::new(session),
        }
    }
}

/// Every `/api/v1` route. The caller adds `/health`, middleware and state.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Leads table and lead profile
        .route("/api/v1/leads", get(list_leads).post(create_lead))
        .route("/api/v1/leads/:id", get(get_lead))
        .route("/api/v1/leads/:id/status", put(update_lead_status))
        .route("/api/v1/leads/:id/timeline", get(lead_timeline))
        // Kanban board and conversion analytics
        .route("/api/v1/pipeline", get(pipeline_board))
        .route("/api/v1/conversion", get(conversion))
        .route("/api/v1/conversion/sources", get(conversion_sources))
        // Dashboard cards
        .route(
            "/api/v1/dashboard/metrics",
            get(dashboard_metrics).post(custom_metrics),
        )
        .route("/api/v1/scoring/evaluate", post(evaluate_scoring))
        // Calls and meetings
        .route("/api/v1/calls", get(list_calls))
        .route("/api/v1/calls/:id/insights", get(call_insights))
        .route("/api/v1/meetings/upcoming", get(upcoming_meetings))
        .route(
            "/api/v1/meetings/upcoming/:id/confirm",
            post(confirm_meeting),
        )
        // Session
        .route("/api/v1/session", get(get_session))
        .route("/api/v1/session/login", post(login))
        .route("/api/v1/session/logout", post(logout))
        .route("/api/v1/session/preferences", put(update_preferences))
}

/// Swagger UI and the OpenAPI file it renders.
pub fn docs_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/docs", get(serve_swagger_ui))
        .route("/api-docs/openapi.yml", get(serve_openapi_spec))
}

/// Serves the OpenAPI specification YAML file.
///
/// Reads `openapi.yml` from the working directory; 404 when it is missing.
async fn serve_openapi_spec() -> impl IntoResponse {
    match tokio::fs::read_to_string("openapi.yml").await {
        Ok(content) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/yaml")],
            content,
        )
            .into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "OpenAPI spec not found").into_response(),
    }
}

/// Serves the Swagger UI HTML page pointed at `serve_openapi_spec`.
async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>CRM API docs</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        SwaggerUIBundle({ url: "/api-docs/openapi.yml", dom_id: "#swagger-ui" });
    </script>
</body>
</html>"##;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-crm-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Resolves an optional `start`/`end` pair against the default window.
///
/// - both given: exactly that range
/// - only `end`: the default number of days ending on `end`
/// - only `start`: from `start` through today
/// - neither: the default number of days ending today
fn resolve_range(
    config: &Config,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<DateRange, AppError> {
    let today = Utc::now().date_naive();
    match (start, end) {
        (Some(start), Some(end)) => DateRange::new(start, end),
        (None, Some(end)) => DateRange::last_days(end, config.default_range_days),
        (Some(start), None) => DateRange::new(start, today),
        (None, None) => DateRange::last_days(today, config.default_range_days),
    }
}

/// Metric series hold one point per day, so their range is capped at
/// `max_range_days`.
fn check_series_range(config: &Config, range: &DateRange) -> Result<(), AppError> {
    if range.days() > i64::from(config.max_range_days) {
        return Err(AppError::BadRequest(format!(
            "date range {}..={} spans {} days, the maximum is {}",
            range.start,
            range.end,
            range.days(),
            config.max_range_days
        )));
    }
    Ok(())
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').filter(|part| !part.is_empty())
}

fn leads_filter(params: &LeadsQueryParams) -> Result<LeadsFilter, AppError> {
    let status = params
        .status
        .as_deref()
        .map(|raw| split_list(raw).map(LeadStatus::parse).collect::<Result<Vec<_>, _>>())
        .transpose()?;

    let score_range = match (params.min_score, params.max_score) {
        (None, None) => None,
        (min, max) => {
            let (min, max) = (min.unwrap_or(0), max.unwrap_or(100));
            if min > max {
                return Err(AppError::BadRequest(format!(
                    "minScore {} is greater than maxScore {}",
                    min, max
                )));
            }
            Some((min, max))
        }
    };

    let source = params
        .source
        .as_deref()
        .map(|raw| split_list(raw).map(str::to_string).collect());

    let date_range = match (params.start, params.end) {
        (Some(start), Some(end)) => Some(DateRange::new(start, end)?),
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest(
                "start and end must be given together".to_string(),
            ))
        }
    };

    Ok(LeadsFilter {
        status,
        score_range,
        source,
        date_range,
    })
}

/// GET /api/v1/leads
///
/// Leads table: filter, then free-text search, then sort.
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeadsQueryParams>,
) -> Result<Json<Vec<Lead>>, AppError> {
    tracing::info!("GET /leads - params: {:?}", params);

    let filter = leads_filter(&params)?;
    let snapshot = state.store.leads().await;

    let mut leads = filter_leads(&snapshot, &filter);
    if let Some(query) = params.q.as_deref() {
        leads = search_leads(leads, query);
    }

    let mut sort = LeadsTableSort::default();
    if let Some(field) = params.sort {
        sort.field = field;
        sort.direction = params.direction.unwrap_or(SortDirection::Asc);
    } else if let Some(direction) = params.direction {
        sort.direction = direction;
    }
    sort_leads(&mut leads, sort);

    tracing::debug!("Returning {} of {} leads", leads.len(), snapshot.len());
    Ok(Json(leads))
}

/// POST /api/v1/leads
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateLeadRequest>,
) -> Result<(StatusCode, Json<Lead>), AppError> {
    tracing::info!("POST /leads - name: {}, source: {}", request.name, request.source);

    let lead = state
        .store
        .create_lead(request, state.config.phone_region, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(lead)))
}

/// GET /api/v1/leads/:id
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Lead>, AppError> {
    Ok(Json(state.store.get_lead(&id).await?))
}

/// PUT /api/v1/leads/:id/status
pub async fn update_lead_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Lead>, AppError> {
    tracing::info!("PUT /leads/{}/status - {:?}", id, request.status);

    let status = LeadStatus::parse(&request.status)?;
    let lead = state.store.update_status(&id, status).await?;
    Ok(Json(lead))
}

/// GET /api/v1/leads/:id/timeline
pub async fn lead_timeline(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TimelineEntry>>, AppError> {
    let timeline = state
        .store
        .timeline(&id)
        .await
        .with_context(|| format!("timeline of lead {}", id))?;
    Ok(Json(timeline))
}

/// GET /api/v1/pipeline
///
/// Kanban board: one column per status, in pipeline order.
pub async fn pipeline_board(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let leads = state.store.leads().await;
    let groups = group_by_status(&leads, &LeadStatus::PIPELINE)?;

    let columns: Vec<serde_json::Value> = groups
        .iter()
        .map(|group| {
            json!({
                "status": group.status,
                "label": group.status.display_name(),
                "count": group.leads.len(),
                "leads": group.leads,
            })
        })
        .collect();

    Ok(Json(json!({
        "total": leads.len(),
        "columns": columns,
    })))
}

/// Leads in scope for conversion analytics: all leads, or those created in
/// the requested range when one is given.
async fn conversion_scope(
    state: &AppState,
    params: &RangeQueryParams,
) -> Result<Vec<Lead>, AppError> {
    let leads = state.store.leads().await;
    if params.start.is_none() && params.end.is_none() {
        return Ok(leads);
    }
    let range = resolve_range(&state.config, params.start, params.end)?;
    Ok(leads_in_range(&leads, &range))
}

/// GET /api/v1/conversion
pub async fn conversion(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeQueryParams>,
) -> Result<Json<ConversionSummary>, AppError> {
    let leads = conversion_scope(&state, &params).await?;
    Ok(Json(compute_conversion(&leads)))
}

/// GET /api/v1/conversion/sources
pub async fn conversion_sources(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeQueryParams>,
) -> Result<Json<Vec<SourceEffectiveness>>, AppError> {
    let leads = conversion_scope(&state, &params).await?;
    Ok(Json(source_effectiveness(&leads)))
}

async fn metrics_response(
    state: &AppState,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    seed: Option<u64>,
    configs: &[MetricConfig],
) -> Result<MetricsResponse, AppError> {
    let range = resolve_range(&state.config, start, end)?;
    check_series_range(&state.config, &range)?;
    let seed = seed.unwrap_or(state.config.metrics_seed);
    let leads = state.store.leads().await;

    let metrics = derive_metrics(&leads, range.start, range.end, configs, seed)?;
    Ok(MetricsResponse {
        range,
        seed,
        metrics,
    })
}

/// GET /api/v1/dashboard/metrics
///
/// The dashboard's metric cards for a date range.
pub async fn dashboard_metrics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MetricsQueryParams>,
) -> Result<Json<MetricsResponse>, AppError> {
    tracing::info!("GET /dashboard/metrics - params: {:?}", params);

    let response = metrics_response(
        &state,
        params.start,
        params.end,
        params.seed,
        &dashboard_metric_configs(),
    )
    .await?;
    Ok(Json(response))
}

/// POST /api/v1/dashboard/metrics
///
/// Same as the GET variant with caller-supplied card configs.
pub async fn custom_metrics(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MetricsRequest>,
) -> Result<Json<MetricsResponse>, AppError> {
    if request.configs.is_empty() {
        return Err(AppError::BadRequest(
            "at least one metric config is required".to_string(),
        ));
    }

    let response = metrics_response(
        &state,
        request.start,
        request.end,
        request.seed,
        &request.configs,
    )
    .await?;
    Ok(Json(response))
}

/// POST /api/v1/scoring/evaluate
///
/// Scores every lead with the given rules without changing stored scores.
pub async fn evaluate_scoring(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScoringRequest>,
) -> Result<Json<Vec<LeadScore>>, AppError> {
    let leads = state.store.leads().await;
    let scores = leads
        .iter()
        .map(|lead| LeadScore {
            lead_id: lead.id.clone(),
            current_score: lead.score,
            computed_score: score_lead(lead, &request.rules),
        })
        .collect();
    Ok(Json(scores))
}

/// GET /api/v1/calls
pub async fn list_calls(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallsQueryParams>,
) -> Result<Json<Vec<Call>>, AppError> {
    let leads = state.store.leads().await;
    let calls = interactions::search_calls(
        state.store.calls(),
        &leads,
        params.q.as_deref().unwrap_or_default(),
    );
    Ok(Json(calls))
}

/// GET /api/v1/calls/:id/insights
///
/// 404 when the call exists but has no analysis.
pub async fn call_insights(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CallInsights>, AppError> {
    let call = state.store.find_call(&id)?;
    let insights = interactions::insights_for(call).ok_or_else(|| {
        tracing::info!("Insights not available for call {}", id);
        AppError::NotFound(format!("No insights available for call {}", id))
    })?;
    Ok(Json(insights.clone()))
}

/// GET /api/v1/meetings/upcoming
pub async fn upcoming_meetings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UpcomingMeeting>>, AppError> {
    Ok(Json(state.store.upcoming_meetings().await))
}

/// POST /api/v1/meetings/upcoming/:id/confirm
pub async fn confirm_meeting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UpcomingMeeting>, AppError> {
    Ok(Json(state.store.request_meeting_confirmation(&id).await?))
}

/// GET /api/v1/session
pub async fn get_session(State(state): State<Arc<AppState>>) -> Json<Session> {
    Json(state.session.read().await.clone())
}

/// POST /api/v1/session/login
pub async fn login(State(state): State<Arc<AppState>>) -> Json<Session> {
    let mut session = state.session.write().await;
    session.login();
    Json(session.clone())
}

/// POST /api/v1/session/logout
pub async fn logout(State(state): State<Arc<AppState>>) -> Json<Session> {
    let mut session = state.session.write().await;
    session.logout();
    Json(session.clone())
}

/// PUT /api/v1/session/preferences
pub async fn update_preferences(
    State(state): State<Arc<AppState>>,
    Json(preferences): Json<Preferences>,
) -> Result<Json<Session>, AppError> {
    let mut session = state.session.write().await;
    session.set_dark_mode(preferences.dark_mode).await?;
    Ok(Json(session.clone()))
}
