use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::persistence::{
    PersistenceError, TrackerStore, items_from_yaml, items_to_yaml, read_items_csv,
    write_items_csv,
};
use crate::{
    Category, CategoryDraft, GanttChart, ItemDraft, Renovation, RenovationDraft,
    RenovationEndDates, RenovationItem, RenovationReport, Supplier, SupplierDraft, Tracker,
    TrackerError,
};

type SharedStore = Arc<dyn TrackerStore + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    tracker: Arc<RwLock<Tracker>>,
    store: Option<SharedStore>,
}

impl AppState {
    pub fn new(tracker: Tracker) -> Self {
        Self {
            tracker: Arc::new(RwLock::new(tracker)),
            store: None,
        }
    }

    /// Saves the whole tracker to `store` after every successful write.
    pub fn with_store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Runs a mutation on the blocking pool, since persisting may hit SQLite.
    async fn mutate<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Tracker) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || state.mutate_blocking(op))
            .await
            .map_err(|err| ApiError::internal(format!("mutation task failed: {err}")))?
    }

    /// Applies `op` to a copy of the tracker and swaps the copy in only once
    /// it has been persisted. A failed save leaves the served state as it was.
    fn mutate_blocking<T>(
        &self,
        op: impl FnOnce(&mut Tracker) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut guard = self.tracker.write();
        let mut next = (*guard).clone();
        let value = op(&mut next)?;
        if let Some(store) = &self.store {
            store.save_tracker(&next).map_err(|err| {
                tracing::error!(error = %err, "failed to persist tracker");
                ApiError::internal(format!("failed to persist changes: {err}"))
            })?;
        }
        *guard = next;
        Ok(value)
    }

    fn read<T>(&self, op: impl FnOnce(&Tracker) -> Result<T, ApiError>) -> Result<T, ApiError> {
        op(&self.tracker.read())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<TrackerError> for ApiError {
    fn from(value: TrackerError) -> Self {
        match value {
            TrackerError::NotFound { .. } => ApiError::NotFound(value.to_string()),
            TrackerError::Conflict(message) => ApiError::Conflict(message),
            TrackerError::Validation(err) => ApiError::Invalid(err.to_string()),
            TrackerError::Aggregation(message) => ApiError::Internal(message),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::Tracker(err) => ApiError::from(err),
            PersistenceError::InvalidData(message) => ApiError::Invalid(message),
            PersistenceError::Csv(err) => ApiError::Invalid(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct GanttQuery {
    today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct GanttResponse {
    #[serde(flatten)]
    chart: GanttChart,
    ticks: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ImportSummary {
    imported: usize,
    items: Vec<RenovationItem>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/renovations", get(list_renovations).post(create_renovation))
        .route(
            "/renovations/:id",
            get(get_renovation)
                .put(update_renovation)
                .delete(delete_renovation),
        )
        .route("/renovations/:id/items", get(list_items).post(create_item))
        .route("/renovations/:id/gantt", get(renovation_gantt))
        .route("/renovations/:id/end-date", get(renovation_end_date))
        .route("/renovations/:id/report", get(renovation_report))
        .route("/renovations/:id/export.csv", get(export_csv))
        .route("/renovations/:id/export.yaml", get(export_yaml))
        .route("/renovations/:id/import.csv", post(import_csv))
        .route("/renovations/:id/import.yaml", post(import_yaml))
        .route(
            "/items/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/suppliers/:id",
            get(get_supplier)
                .put(update_supplier)
                .delete(delete_supplier),
        )
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// ---- renovations ----

async fn list_renovations(State(state): State<AppState>) -> Result<Json<Vec<Renovation>>, ApiError> {
    let renovations = state.read(|t| Ok(t.renovations().into_iter().cloned().collect()))?;
    Ok(Json(renovations))
}

async fn get_renovation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Renovation>, ApiError> {
    let renovation = state.read(|t| Ok(t.renovation(id)?.clone()))?;
    Ok(Json(renovation))
}

async fn create_renovation(
    State(state): State<AppState>,
    Json(draft): Json<RenovationDraft>,
) -> Result<(StatusCode, Json<Renovation>), ApiError> {
    let created = state.mutate(move |t| Ok(t.create_renovation(draft)?)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_renovation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<RenovationDraft>,
) -> Result<Json<Renovation>, ApiError> {
    let updated = state.mutate(move |t| Ok(t.update_renovation(id, draft)?)).await?;
    Ok(Json(updated))
}

async fn delete_renovation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.mutate(move |t| Ok(t.delete_renovation(id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- items ----

async fn list_items(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<RenovationItem>>, ApiError> {
    let items = state.read(|t| Ok(t.items_for(id)?))?;
    Ok(Json(items))
}

async fn create_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<ItemDraft>,
) -> Result<(StatusCode, Json<RenovationItem>), ApiError> {
    let created = state.mutate(move |t| Ok(t.create_item(id, draft)?)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RenovationItem>, ApiError> {
    let item = state.read(|t| Ok(t.item(id)?.clone()))?;
    Ok(Json(item))
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<ItemDraft>,
) -> Result<Json<RenovationItem>, ApiError> {
    let updated = state.mutate(move |t| Ok(t.update_item(id, draft)?)).await?;
    Ok(Json(updated))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.mutate(move |t| Ok(t.delete_item(id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- derived views ----

async fn renovation_gantt(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<GanttQuery>,
) -> Result<Json<GanttResponse>, ApiError> {
    let chart = state.read(|t| {
        Ok(match query.today {
            Some(today) => t.gantt_at(id, today)?,
            None => t.gantt(id)?,
        })
    })?;
    let ticks = chart.tick_labels();
    Ok(Json(GanttResponse { chart, ticks }))
}

async fn renovation_end_date(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RenovationEndDates>, ApiError> {
    let dates = state.read(|t| Ok(t.end_dates(id)?))?;
    Ok(Json(dates))
}

async fn renovation_report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RenovationReport>, ApiError> {
    let report = state.read(|t| Ok(t.report(id)?))?;
    Ok(Json(report))
}

// ---- import / export ----

fn items_oldest_first(tracker: &Tracker, id: i64) -> Result<Vec<RenovationItem>, ApiError> {
    let mut items = tracker.items_for(id)?;
    items.sort_by_key(|item| item.id);
    Ok(items)
}

async fn export_csv(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let items = state.read(|t| items_oldest_first(t, id))?;
    let mut buffer = Vec::new();
    write_items_csv(&items, &mut buffer)?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], buffer).into_response())
}

async fn export_yaml(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let items = state.read(|t| items_oldest_first(t, id))?;
    let body = items_to_yaml(&items);
    Ok(([(header::CONTENT_TYPE, "application/yaml; charset=utf-8")], body).into_response())
}

async fn import_csv(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: String,
) -> Result<(StatusCode, Json<ImportSummary>), ApiError> {
    let drafts = read_items_csv(body.as_bytes())?;
    import_drafts(&state, id, drafts).await
}

async fn import_yaml(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: String,
) -> Result<(StatusCode, Json<ImportSummary>), ApiError> {
    let drafts = items_from_yaml(&body)?;
    import_drafts(&state, id, drafts).await
}

async fn import_drafts(
    state: &AppState,
    id: i64,
    drafts: Vec<ItemDraft>,
) -> Result<(StatusCode, Json<ImportSummary>), ApiError> {
    if drafts.is_empty() {
        return Err(ApiError::Invalid("request contained no items".into()));
    }
    let items = state.mutate(move |t| Ok(t.import_items(id, drafts)?)).await?;
    Ok((
        StatusCode::CREATED,
        Json(ImportSummary {
            imported: items.len(),
            items,
        }),
    ))
}

// ---- categories ----

async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = state.read(|t| Ok(t.categories().into_iter().cloned().collect()))?;
    Ok(Json(categories))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Category>, ApiError> {
    let category = state.read(|t| Ok(t.category(id)?.clone()))?;
    Ok(Json(category))
}

async fn create_category(
    State(state): State<AppState>,
    Json(draft): Json<CategoryDraft>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let created = state.mutate(move |t| Ok(t.create_category(draft)?)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<CategoryDraft>,
) -> Result<Json<Category>, ApiError> {
    let updated = state.mutate(move |t| Ok(t.update_category(id, draft)?)).await?;
    Ok(Json(updated))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.mutate(move |t| Ok(t.delete_category(id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- suppliers ----

async fn list_suppliers(State(state): State<AppState>) -> Result<Json<Vec<Supplier>>, ApiError> {
    let suppliers = state.read(|t| Ok(t.suppliers().into_iter().cloned().collect()))?;
    Ok(Json(suppliers))
}

async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Supplier>, ApiError> {
    let supplier = state.read(|t| Ok(t.supplier(id)?.clone()))?;
    Ok(Json(supplier))
}

async fn create_supplier(
    State(state): State<AppState>,
    Json(draft): Json<SupplierDraft>,
) -> Result<(StatusCode, Json<Supplier>), ApiError> {
    let created = state.mutate(move |t| Ok(t.create_supplier(draft)?)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<SupplierDraft>,
) -> Result<Json<Supplier>, ApiError> {
    let updated = state.mutate(move |t| Ok(t.update_supplier(id, draft)?)).await?;
    Ok(Json(updated))
}

async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.mutate(move |t| Ok(t.delete_supplier(id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}
