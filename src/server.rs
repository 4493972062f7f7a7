use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::access::{require_admin, ConfigIdentity, CurrentUser, IdentityProvider};
use crate::analysis::{run_gap_analysis, GapAnalysis, GapAnalysisRequest};
use crate::config::Config;
use crate::error::PlannerError;
use crate::org::assignment::{assign, unassign, AssignRequest};
use crate::org::budget::{summarize_budget, BudgetSummary};
use crate::org::repository::Repository;
use crate::org::{Collection, Personnel, Resource};
use crate::scenario::compare::compare_scenarios;
use crate::scenario::whatif::simulate_whatif;
use crate::scenario::{Scenario, ScenarioComparison, WhatIfResult};
use crate::staffing::{
    compute_recommended_staffing, FormulaVariant, InputKey, StaffingInputs, StaffingLevels,
};
use crate::store::sqlite::SqliteStore;
use crate::store::{
    create_document, delete_document, get_document, list_documents, update_document,
};

pub const USER_HEADER: &str = "x-user-id";

#[derive(Clone)]
struct ApiState {
    config: Config,
    identity: ConfigIdentity,
    db_path: PathBuf,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
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

impl From<PlannerError> for ApiError {
    fn from(error: PlannerError) -> Self {
        let status = match &error {
            PlannerError::NotFound { .. } => StatusCode::NOT_FOUND,
            PlannerError::RoleOccupied { .. } | PlannerError::FactoryMismatch { .. } => {
                StatusCode::CONFLICT
            }
            PlannerError::Forbidden { .. } => StatusCode::FORBIDDEN,
            PlannerError::Validation(_) => StatusCode::BAD_REQUEST,
            PlannerError::Io(_) | PlannerError::Database(_) | PlannerError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            warn!(error = %error, "request failed");
        }
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct RecommendResponse {
    variant: FormulaVariant,
    inputs: StaffingInputs,
    recommended: StaffingLevels,
}

#[derive(Debug, Clone, Deserialize)]
struct InputChangeRequest {
    input: String,
    to: i64,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct WhatIfRequest {
    #[serde(flatten)]
    context: GapAnalysisRequest,
    #[serde(default)]
    changes: Vec<InputChangeRequest>,
}

#[derive(Debug, Clone, Deserialize)]
struct SaveScenarioRequest {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(flatten)]
    context: GapAnalysisRequest,
}

#[derive(Debug, Clone, Deserialize)]
struct CompareRequest {
    base_id: String,
    candidate_id: String,
}

#[derive(Debug, Serialize)]
struct DeletedResponse {
    id: String,
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let state = ApiState {
        db_path: config.resolved_db_path(),
        identity: ConfigIdentity::new(&config.access),
        config,
    };
    SqliteStore::open(&state.db_path)?;

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/config", get(show_config))
        .route("/v1/staffing/recommend", post(recommend))
        .route("/v1/staffing/gap", post(gap))
        .route("/v1/staffing/whatif", post(whatif))
        .route("/v1/scenarios", get(list_scenarios).post(save_scenario))
        .route("/v1/scenarios/compare", post(compare))
        .route(
            "/v1/scenarios/:id",
            get(show_scenario).delete(delete_scenario),
        )
        .route("/v1/assignments", post(create_assignment))
        .route("/v1/assignments/:personnel_id", delete(remove_assignment))
        .route("/v1/budget", get(budget))
        .route(
            "/v1/collections/:collection",
            get(list_collection).post(create_in_collection),
        )
        .route(
            "/v1/collections/:collection/:id",
            get(show_in_collection)
                .put(update_in_collection)
                .delete(delete_in_collection),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse { status: "ok" })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config)
}

async fn recommend(
    State(state): State<ApiState>,
    Json(inputs): Json<StaffingInputs>,
) -> ApiResult<RecommendResponse> {
    let variant = state.config.staffing.variant;
    let recommended = compute_recommended_staffing(&inputs, variant);
    Ok(ok(RecommendResponse {
        variant,
        inputs,
        recommended,
    }))
}

async fn gap(
    State(state): State<ApiState>,
    Json(request): Json<GapAnalysisRequest>,
) -> ApiResult<GapAnalysis> {
    let store = open_store(&state)?;
    let analysis = run_gap_analysis(&store, &request, &state.config.staffing)?;
    Ok(ok(analysis))
}

async fn whatif(
    State(state): State<ApiState>,
    Json(request): Json<WhatIfRequest>,
) -> ApiResult<WhatIfResult> {
    let changes = parse_changes(&request.changes)?;
    let store = open_store(&state)?;
    let baseline = run_gap_analysis(&store, &request.context, &state.config.staffing)?;
    Ok(ok(simulate_whatif(
        &baseline.inputs,
        &baseline.current,
        &changes,
        state.config.staffing.variant,
    )))
}

async fn list_scenarios(State(state): State<ApiState>) -> ApiResult<Vec<Scenario>> {
    let store = open_store(&state)?;
    let mut scenarios = Repository::<Scenario>::list(&store)?;
    scenarios.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(ok(scenarios))
}

async fn save_scenario(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(request): Json<SaveScenarioRequest>,
) -> ApiResult<Scenario> {
    require_admin(acting_user(&state, &headers).as_ref(), "save scenarios")?;
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("scenario name must not be empty"));
    }
    let store = open_store(&state)?;
    let analysis = run_gap_analysis(&store, &request.context, &state.config.staffing)?;

    let mut scenario = Scenario::evaluate(
        request.name.trim(),
        analysis.inputs,
        analysis.current,
        analysis.variant,
    );
    if let Some(description) = request.description {
        scenario = scenario.with_description(description);
    }
    if let Some(factory_id) = request.context.factory_id {
        scenario = scenario.with_factory(factory_id);
    }
    let saved = Repository::<Scenario>::create(&store, scenario)?;
    info!(scenario = %saved.id, name = %saved.name, "saved scenario");
    Ok(ok(saved))
}

async fn show_scenario(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Scenario> {
    let store = open_store(&state)?;
    Ok(ok(Repository::<Scenario>::require(&store, &id)?))
}

async fn delete_scenario(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<DeletedResponse> {
    require_admin(acting_user(&state, &headers).as_ref(), "delete scenarios")?;
    let store = open_store(&state)?;
    Repository::<Scenario>::delete(&store, &id)?;
    Ok(ok(DeletedResponse { id }))
}

async fn compare(
    State(state): State<ApiState>,
    Json(request): Json<CompareRequest>,
) -> ApiResult<ScenarioComparison> {
    let store = open_store(&state)?;
    let base = Repository::<Scenario>::require(&store, &request.base_id)?;
    let candidate = Repository::<Scenario>::require(&store, &request.candidate_id)?;
    Ok(ok(compare_scenarios(&base, &candidate)))
}

async fn create_assignment(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(request): Json<AssignRequest>,
) -> ApiResult<Personnel> {
    require_admin(acting_user(&state, &headers).as_ref(), "assign personnel")?;
    let store = open_store(&state)?;
    Ok(ok(assign(&store, &store, &request)?))
}

async fn remove_assignment(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(personnel_id): Path<String>,
) -> ApiResult<Personnel> {
    require_admin(acting_user(&state, &headers).as_ref(), "unassign personnel")?;
    let store = open_store(&state)?;
    Ok(ok(unassign(&store, &personnel_id)?))
}

async fn budget(State(state): State<ApiState>) -> ApiResult<BudgetSummary> {
    let store = open_store(&state)?;
    let resources = Repository::<Resource>::list(&store)?;
    Ok(ok(summarize_budget(&resources)))
}

async fn list_collection(
    State(state): State<ApiState>,
    Path(collection): Path<String>,
) -> ApiResult<Value> {
    let collection = parse_collection(&collection)?;
    let store = open_store(&state)?;
    Ok(ok(list_documents(&store, collection)?))
}

async fn create_in_collection(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(collection): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let collection = parse_collection(&collection)?;
    require_admin(
        acting_user(&state, &headers).as_ref(),
        &format!("create {collection}"),
    )?;
    let store = open_store(&state)?;
    Ok(ok(create_document(&store, collection, body)?))
}

async fn show_in_collection(
    State(state): State<ApiState>,
    Path((collection, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let collection = parse_collection(&collection)?;
    let store = open_store(&state)?;
    Ok(ok(get_document(&store, collection, &id)?))
}

async fn update_in_collection(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path((collection, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let collection = parse_collection(&collection)?;
    require_admin(
        acting_user(&state, &headers).as_ref(),
        &format!("update {collection}"),
    )?;
    let store = open_store(&state)?;
    Ok(ok(update_document(&store, collection, &id, body)?))
}

async fn delete_in_collection(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path((collection, id)): Path<(String, String)>,
) -> ApiResult<DeletedResponse> {
    let collection = parse_collection(&collection)?;
    require_admin(
        acting_user(&state, &headers).as_ref(),
        &format!("delete {collection}"),
    )?;
    let store = open_store(&state)?;
    delete_document(&store, collection, &id)?;
    Ok(ok(DeletedResponse { id }))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

fn open_store(state: &ApiState) -> std::result::Result<SqliteStore, ApiError> {
    Ok(SqliteStore::open(&state.db_path)?)
}

fn acting_user(state: &ApiState, headers: &HeaderMap) -> Option<CurrentUser> {
    let claimed = headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok());
    state.identity.current_user(claimed)
}

fn parse_collection(raw: &str) -> std::result::Result<Collection, ApiError> {
    Collection::from_str(raw).map_err(|error| ApiError::bad_request(error.to_string()))
}

fn parse_changes(
    changes: &[InputChangeRequest],
) -> std::result::Result<Vec<(InputKey, i64)>, ApiError> {
    changes
        .iter()
        .map(|change| {
            InputKey::from_str(&change.input)
                .map(|input| (input, change.to))
                .map_err(|error| ApiError::bad_request(error.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use serde_json::json;

    use super::*;
    use crate::config::AccessConfig;
    use crate::org::Role;
    use crate::staffing::Tier;

    fn test_state(dir: &tempfile::TempDir) -> ApiState {
        let config = Config::default();
        ApiState {
            identity: ConfigIdentity::new(&AccessConfig::default()),
            db_path: dir.path().join("planner.db"),
            config,
        }
    }

    fn admin_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static("admin"));
        headers
    }

    #[tokio::test]
    async fn recommend_uses_configured_variant() {
        let dir = tempfile::tempdir().unwrap();
        let Json(response) = recommend(
            State(test_state(&dir)),
            Json(StaffingInputs::with_work_orders(1000)),
        )
        .await
        .unwrap();
        assert!(response.ok);
        assert_eq!(response.data.variant, FormulaVariant::Simple);
        assert_eq!(response.data.recommended, StaffingLevels::new(1, 2, 5));
    }

    #[tokio::test]
    async fn whatif_rejects_unknown_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let request = WhatIfRequest {
            changes: vec![InputChangeRequest {
                input: "headcount".to_string(),
                to: 5,
            }],
            ..WhatIfRequest::default()
        };
        let error = whatif(State(test_state(&dir)), Json(request))
            .await
            .unwrap_err();
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn mutations_require_an_admin() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static("viewer"));

        let error = create_in_collection(
            State(state.clone()),
            headers,
            Path("factories".to_string()),
            Json(json!({ "name": "North" })),
        )
        .await
        .unwrap_err();
        assert_eq!(error.status, StatusCode::FORBIDDEN);

        let error = delete_scenario(State(state), HeaderMap::new(), Path("s-1".to_string()))
            .await
            .unwrap_err();
        assert_eq!(error.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn assignment_conflicts_map_to_409() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        {
            let store = open_store(&state).unwrap();
            Repository::<Role>::create(
                &store,
                Role {
                    id: "r-1".to_string(),
                    title: "Lead".to_string(),
                    tier: Tier::Leadership,
                    factory_id: "f-1".to_string(),
                    department_id: None,
                    position: 0,
                },
            )
            .unwrap();
            for id in ["p-1", "p-2"] {
                Repository::<Personnel>::create(
                    &store,
                    Personnel {
                        id: id.to_string(),
                        name: id.to_string(),
                        email: String::new(),
                        role_id: None,
                        factory_id: None,
                    },
                )
                .unwrap();
            }
        }

        let request = |personnel_id: &str| AssignRequest {
            personnel_id: personnel_id.to_string(),
            role_id: "r-1".to_string(),
            factory_id: "f-1".to_string(),
        };
        let Json(assigned) = create_assignment(
            State(state.clone()),
            admin_headers(),
            Json(request("p-1")),
        )
        .await
        .unwrap();
        assert_eq!(assigned.data.role_id.as_deref(), Some("r-1"));

        let error = create_assignment(State(state.clone()), admin_headers(), Json(request("p-2")))
            .await
            .unwrap_err();
        assert_eq!(error.status, StatusCode::CONFLICT);

        let Json(analysis) = gap(
            State(state),
            Json(GapAnalysisRequest {
                inputs: Some(StaffingInputs::with_work_orders(1000)),
                factory_id: Some("f-1".to_string()),
                ..GapAnalysisRequest::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(analysis.data.current, StaffingLevels::new(1, 0, 0));
        assert_eq!(analysis.data.gap.total, 7);
    }

    #[tokio::test]
    async fn scenarios_save_compare_and_404() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let save = |name: &str, volume: i64| SaveScenarioRequest {
            name: name.to_string(),
            description: None,
            context: GapAnalysisRequest {
                inputs: Some(StaffingInputs::with_work_orders(volume)),
                current: Some(StaffingLevels::new(1, 2, 5)),
                ..GapAnalysisRequest::default()
            },
        };
        let Json(base) = save_scenario(State(state.clone()), admin_headers(), Json(save("Now", 2000)))
            .await
            .unwrap();
        let Json(candidate) = save_scenario(
            State(state.clone()),
            admin_headers(),
            Json(save("Growth", 5000)),
        )
        .await
        .unwrap();

        let Json(comparison) = compare(
            State(state.clone()),
            Json(CompareRequest {
                base_id: base.data.id.clone(),
                candidate_id: candidate.data.id.clone(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(comparison.data.net_headcount_change, 24);

        let error = show_scenario(State(state), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(error.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn storage_failures_are_server_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        assert_eq!(
            ApiError::from(PlannerError::Io(io)).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(PlannerError::Validation("bad".to_string())).status,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn unknown_collection_is_a_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let error = list_collection(State(test_state(&dir)), Path("widgets".to_string()))
            .await
            .unwrap_err();
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
    }
}
