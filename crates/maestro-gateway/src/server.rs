use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use maestro_core::MaestroError;
use maestro_orchestrator::Orchestrator;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared application state.
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

/// The orchestrator's HTTP gateway.
pub struct GatewayServer;

impl GatewayServer {
    pub fn build(orchestrator: Arc<Orchestrator>) -> Router {
        let state = Arc::new(AppState { orchestrator });

        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_handler))
            .route("/agents", get(list_agents_handler))
            .route("/task", post(task_handler))
            .route("/task/async", post(task_async_handler))
            .route("/discover", post(discover_handler))
            .route("/responses/{user_id}", get(responses_handler))
            .route("/.well-known/agent.json", get(agent_card_handler))
            .with_state(state)
    }
}

#[derive(Debug, Deserialize)]
struct TaskRequest {
    task: String,
    #[serde(default = "default_user_id")]
    user_id: String,
    #[serde(default)]
    preferred_agent: Option<String>,
}

fn default_user_id() -> String {
    "anonymous".to_string()
}

#[derive(Debug, Deserialize)]
struct ResponsesQuery {
    #[serde(default = "default_max_messages")]
    max_messages: usize,
}

fn default_max_messages() -> usize {
    10
}

/// Map an orchestration error to an HTTP status.
fn error_status(err: &MaestroError) -> StatusCode {
    match err {
        MaestroError::NoAgentsAvailable | MaestroError::QueueUnavailable => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        MaestroError::NoSuitableAgent => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: MaestroError) -> (StatusCode, Json<serde_json::Value>) {
    warn!(kind = err.kind(), error = %err, "Request failed");
    (
        error_status(&err),
        Json(json!({ "error": err.kind(), "detail": err.to_string() })),
    )
}

async fn root_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "service": "maestro",
        "status": "running",
        "protocol": "a2a",
        "discovered_agents": state.orchestrator.registry().names().await,
        "capabilities": ["agent_discovery", "request_routing", "async_queueing"],
    }))
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "agents_discovered": state.orchestrator.registry().len().await,
        "queue_connected": state.orchestrator.queue_available(),
    }))
}

async fn list_agents_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let agents = state.orchestrator.list_agents().await;
    Json(json!({
        "total_agents": agents.len(),
        "agents": agents,
    }))
}

async fn task_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TaskRequest>,
) -> impl IntoResponse {
    info!(user_id = %req.user_id, task = %req.task, "New task");

    match state
        .orchestrator
        .execute_sync(&req.task, &req.user_id, req.preferred_agent.as_deref())
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "result": outcome.result,
                "agent_used": outcome.agent_used,
                "orchestrator": "maestro",
            })),
        ),
        Err(e) => error_response(e),
    }
}

async fn task_async_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TaskRequest>,
) -> impl IntoResponse {
    info!(user_id = %req.user_id, task = %req.task, "Queueing task");

    match state
        .orchestrator
        .execute_async(&req.task, &req.user_id, req.preferred_agent.as_deref())
        .await
    {
        Ok(message_id) => (
            StatusCode::OK,
            Json(json!({
                "status": "queued",
                "message_id": message_id,
                "queue": maestro_core::TASK_QUEUE,
            })),
        ),
        Err(e) => error_response(e),
    }
}

async fn discover_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let agent_count = state.orchestrator.discover().await;
    Json(json!({
        "status": "discovery_complete",
        "agents_found": agent_count,
        "agents": state.orchestrator.registry().names().await,
    }))
}

async fn responses_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<ResponsesQuery>,
) -> impl IntoResponse {
    match state
        .orchestrator
        .fetch_responses(&user_id, query.max_messages)
        .await
    {
        Ok(responses) => (
            StatusCode::OK,
            Json(json!({
                "total": responses.len(),
                "user_id": user_id,
                "responses": responses,
            })),
        ),
        Err(e) => error_response(e),
    }
}

/// The orchestrator's own agent card, for discovery by other systems.
async fn agent_card_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "name": "maestro",
        "description": "Multi-agent orchestrator that discovers and routes to specialized agents over the A2A protocol",
        "capabilities": {
            "skills": [
                {
                    "id": "agent_discovery",
                    "name": "Agent Discovery",
                    "description": "Discover available agents and their capabilities via well-known cards",
                    "examples": ["List available agents", "What agents are available?"]
                },
                {
                    "id": "request_routing",
                    "name": "Request Routing",
                    "description": "Route user requests to the most appropriate specialized agent",
                    "examples": ["Plan a trip to Paris", "Convert 500 USD to EUR"]
                }
            ],
            "protocols": ["a2a", "http", "queue"],
            "discovered_agents": state.orchestrator.registry().names().await,
        },
        "protocol": "a2a",
    }))
}

