// WebSocket Handlers
//
// WebSocket upgrade handlers for real-time streaming of queries, metrics, events, and replication data

use axum::{
    extract::{Path, Query, State, ws::{WebSocket, WebSocketUpgrade}},
    response::{Json as AxumJson, Response},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use serde_json::json;
use futures::{StreamExt, SinkExt};
use tokio::time::{interval, Duration};

use super::super::types::{ApiState, ApiError, ApiResult, SessionId};
use super::{CATALOG, TXN_MANAGER, SQL_PARSER};
use super::websocket_types::{
    WebSocketStatus, ConnectionInfo, ConnectionList, SubscriptionInfo, SubscriptionList,
    CreateSubscriptionRequest, CreateSubscriptionResponse, BroadcastRequest, BroadcastResponse,
    DisconnectRequest, DisconnectResponse, DeleteSubscriptionResponse,
};
use crate::execution::Executor;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebSocketMessage {
    pub message_type: String,
    pub data: serde_json::Value,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueryStreamRequest {
    pub sql: String,
    pub batch_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetricsStreamConfig {
    pub interval_ms: Option<u64>,
    pub metrics: Option<Vec<String>>, // Specific metrics to stream
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventsStreamConfig {
    pub tables: Option<Vec<String>>, // Filter by tables
    pub event_types: Option<Vec<String>>, // insert, update, delete
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReplicationStreamConfig {
    pub slot_name: Option<String>,
    pub include_ddl: Option<bool>,
}

// ============================================================================
// WebSocket Handlers
// ============================================================================

/// WebSocket upgrade endpoint
///
/// Generic WebSocket upgrade endpoint for establishing WebSocket connections.
/// Clients can send JSON messages to interact with the database in real-time.
#[utoipa::path(
    get,
    path = "/api/v1/ws",
    responses(
        (status = 101, description = "WebSocket upgrade successful"),
        (status = 400, description = "Bad request"),
    ),
    tag = "websocket"
)]
pub async fn ws_upgrade_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ApiState>>,
) -> Response {
    ws.on_upgrade(|socket| handle_generic_websocket(socket, state))
}

/// WebSocket handler for real-time query result streaming
///
/// Streams query results in batches as they are produced. Useful for large result sets
/// that need to be processed incrementally.
#[utoipa::path(
    get,
    path = "/api/v1/ws/query",
    responses(
        (status = 101, description = "WebSocket upgrade successful"),
        (status = 400, description = "Bad request"),
    ),
    tag = "websocket"
)]
pub async fn ws_query_stream(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ApiState>>,
) -> Response {
    ws.on_upgrade(|socket| handle_query_stream_websocket(socket, state))
}

/// WebSocket handler for live metrics streaming
///
/// Continuously streams database metrics (CPU, memory, queries/sec, etc.) at regular intervals.
/// Useful for monitoring dashboards and real-time analytics.
#[utoipa::path(
    get,
    path = "/api/v1/ws/metrics",
    responses(
        (status = 101, description = "WebSocket upgrade successful"),
        (status = 400, description = "Bad request"),
    ),
    tag = "websocket"
)]
pub async fn ws_metrics_stream(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ApiState>>,
) -> Response {
    ws.on_upgrade(|socket| handle_metrics_stream_websocket(socket, state))
}

/// WebSocket handler for database events streaming
///
/// Streams real-time database events (inserts, updates, deletes) as they occur.
/// Can be filtered by table names and event types.
#[utoipa::path(
    get,
    path = "/api/v1/ws/events",
    responses(
        (status = 101, description = "WebSocket upgrade successful"),
        (status = 400, description = "Bad request"),
    ),
    tag = "websocket"
)]
pub async fn ws_events_stream(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ApiState>>,
) -> Response {
    ws.on_upgrade(|socket| handle_events_stream_websocket(socket, state))
}

/// WebSocket handler for replication events streaming
///
/// Streams replication events in real-time, including data changes and replication lag information.
/// Useful for monitoring replication health and data synchronization.
#[utoipa::path(
    get,
    path = "/api/v1/ws/replication",
    responses(
        (status = 101, description = "WebSocket upgrade successful"),
        (status = 400, description = "Bad request"),
    ),
    tag = "websocket"
)]
pub async fn ws_replication_stream(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ApiState>>,
) -> Response {
    ws.on_upgrade(|socket| handle_replication_stream_websocket(socket, state))
}

// ============================================================================
// WebSocket Connection Handlers
// ============================================================================

/// Generic WebSocket connection handler
async fn handle_generic_websocket(mut socket: WebSocket, _state: Arc<ApiState>) {
    use axum::extract::ws::Message;

    // Send welcome message
    let welcome = WebSocketMessage {
        message_type: "welcome".to_string(),
        data: json!({
            "message": "Connected to RustyDB WebSocket API",
            "version": "1.0.0"
        }),
        timestamp: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64,
    };

    if let Ok(welcome_json) = serde_json::to_string(&welcome) {
        if socket.send(Message::Text(welcome_json.into())).await.is_err() {
            return;
        }
    }

    // Handle incoming messages
    while let Some(msg) = socket.recv().await {
        if let Ok(msg) = msg {
            match msg {
                Message::Text(text) => {
                    // Echo back for now - in production would handle commands
                    let response = WebSocketMessage {
                        message_type: "echo".to_string(),
                        data: json!({ "received": text.to_string() }),
                        timestamp: SystemTime::now()
                            .duration_since(UNIX_EPOCH)
                            .unwrap()
                            .as_secs() as i64,
                    };

                    if let Ok(response_json) = serde_json::to_string(&response) {
                        if socket.send(Message::Text(response_json.into())).await.is_err() {
                            break;
                        }
                    }
                }
                Message::Close(_) => break,
                Message::Ping(data) => {
                    if socket.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                }
                _ => {}
            }
        } else {
            break;
        }
    }
}

/// Query streaming WebSocket handler
async fn handle_query_stream_websocket(mut socket: WebSocket, _state: Arc<ApiState>) {
    use axum::extract::ws::Message;

    while let Some(msg) = socket.recv().await {
        if let Ok(msg) = msg {
            match msg {
                Message::Text(text) => {
                    // Parse query request
                    if let Ok(request) = serde_json::from_str::<QueryStreamRequest>(&text) {
                        // Get executor
                        let catalog_snapshot = {
                            let catalog_guard = CATALOG.read();
                            (*catalog_guard).clone()
                        }; // catalog_guard dropped here
                        let executor = Executor::new(Arc::new(catalog_snapshot), TXN_MANAGER.clone());

                        // Execute query
                        match SQL_PARSER.parse(&request.sql) {
                            Ok(stmts) => {
                                if let Some(stmt) = stmts.into_iter().next() {
                                    match executor.execute(stmt) {
                                        Ok(result) => {
                                            // Stream results
                                            let response = WebSocketMessage {
                                                message_type: "query_result".to_string(),
                                                data: json!({
                                                    "columns": result.columns,
                                                    "rows": result.rows,
                                                    "rows_affected": result.rows_affected,
                                                    "status": "success"
                                                }),
                                                timestamp: SystemTime::now()
                                                    .duration_since(UNIX_EPOCH)
                                                    .unwrap()
                                                    .as_secs() as i64,
                                            };

                                            if let Ok(response_json) = serde_json::to_string(&response) {
                                                if socket.send(Message::Text(response_json.into())).await.is_err() {
                                                    break;
                                                }
                                            }
                                        }
                                        Err(e) => {
                                            let error = WebSocketMessage {
                                                message_type: "error".to_string(),
                                                data: json!({
                                                    "error": e.to_string(),
                                                    "status": "error"
                                                }),
                                                timestamp: SystemTime::now()
                                                    .duration_since(UNIX_EPOCH)
                                                    .unwrap()
                                                    .as_secs() as i64,
                                            };

                                            if let Ok(error_json) = serde_json::to_string(&error) {
                                                let _ = socket.send(Message::Text(error_json.into())).await;
                                            }
                                        }
                                    }
                                }
                            }
                            Err(e) => {
                                let error = WebSocketMessage {
                                    message_type: "error".to_string(),
                                    data: json!({
                                        "error": e.to_string(),
                                        "status": "parse_error"
                                    }),
                                    timestamp: SystemTime::now()
                                        .duration_since(UNIX_EPOCH)
                                        .unwrap()
                                        .as_secs() as i64,
                                };

                                if let Ok(error_json) = serde_json::to_string(&error) {
                                    let _ = socket.send(Message::Text(error_json.into())).await;
                                }
                            }
                        }
                    }
                }
                Message::Close(_) => break,
                Message::Ping(data) => {
                    if socket.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                }
                _ => {}
            }
        } else {
            break;
        }
    }
}

/// Metrics streaming WebSocket handler
async fn handle_metrics_stream_websocket(mut socket: WebSocket, state: Arc<ApiState>) {
    use axum::extract::ws::Message;

    // Default configuration
    let mut interval_ms = 1000u64;
    let mut active = false;

    // Split socket for concurrent read/write
    let (mut sender, mut receiver) = socket.split();

    // Spawn metrics streaming task
    let state_clone = state.clone();
    let streaming_task = tokio::spawn(async move {
        let mut ticker = interval(Duration::from_millis(interval_ms));

        loop {
            ticker.tick().await;

            if !active {
                continue;
            }

            // Collect metrics
            let metrics = state_clone.metrics.read().await;

            let metrics_data = json!({
                "total_requests": metrics.total_requests,
                "successful_requests": metrics.successful_requests,
                "failed_requests": metrics.failed_requests,
                "avg_response_time_ms": metrics.avg_response_time_ms,
                "active_connections": state_clone.active_sessions.read().await.len(),
                "active_queries": state_clone.active_queries.read().await.len(),
            });

            let message = WebSocketMessage {
                message_type: "metrics".to_string(),
                data: metrics_data,
                timestamp: SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap()
                    .as_secs() as i64,
            };

            if let Ok(message_json) = serde_json::to_string(&message) {
                if sender.send(Message::Text(message_json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // Handle incoming control messages
    while let Some(msg) = receiver.next().await {
        if let Ok(msg) = msg {
            match msg {
                Message::Text(text) => {
                    // Parse configuration
                    if let Ok(config) = serde_json::from_str::<MetricsStreamConfig>(&text) {
                        if let Some(interval) = config.interval_ms {
                            interval_ms = interval;
                            active = true;
                        }
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        } else {
            break;
        }
    }

    streaming_task.abort();
}

/// Events streaming WebSocket handler
async fn handle_events_stream_websocket(mut socket: WebSocket, _state: Arc<ApiState>) {
    use axum::extract::ws::Message;

    // Send initial connection acknowledgment
    let ack = WebSocketMessage {
        message_type: "connected".to_string(),
        data: json!({
            "message": "Connected to events stream",
            "info": "Send configuration to start receiving events"
        }),
        timestamp: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64,
    };

    if let Ok(ack_json) = serde_json::to_string(&ack) {
        if socket.send(Message::Text(ack_json.into())).await.is_err() {
            return;
        }
    }

    // Handle incoming messages
    while let Some(msg) = socket.recv().await {
        if let Ok(msg) = msg {
            match msg {
                Message::Text(text) => {
                    // Parse event stream configuration
                    if let Ok(_config) = serde_json::from_str::<EventsStreamConfig>(&text) {
                        // In production: subscribe to table events based on config
                        // For now, send sample event
                        let sample_event = WebSocketMessage {
                            message_type: "database_event".to_string(),
                            data: json!({
                                "event_type": "insert",
                                "table": "users",
                                "data": {
                                    "id": 1,
                                    "name": "Sample User"
                                }
                            }),
                            timestamp: SystemTime::now()
                                .duration_since(UNIX_EPOCH)
                                .unwrap()
                                .as_secs() as i64,
                        };

                        if let Ok(event_json) = serde_json::to_string(&sample_event) {
                            if socket.send(Message::Text(event_json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                }
                Message::Close(_) => break,
                Message::Ping(data) => {
                    if socket.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                }
                _ => {}
            }
        } else {
            break;
        }
    }
}

/// Replication streaming WebSocket handler
async fn handle_replication_stream_websocket(mut socket: WebSocket, _state: Arc<ApiState>) {
    use axum::extract::ws::Message;

    // Send initial connection acknowledgment
    let ack = WebSocketMessage {
        message_type: "connected".to_string(),
        data: json!({
            "message": "Connected to replication stream",
            "info": "Send configuration to start receiving replication events"
        }),
        timestamp: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64,
    };

    if let Ok(ack_json) = serde_json::to_string(&ack) {
        if socket.send(Message::Text(ack_json.into())).await.is_err() {
            return;
        }
    }

    // Handle incoming messages
    while let Some(msg) = socket.recv().await {
        if let Ok(msg) = msg {
            match msg {
                Message::Text(text) => {
                    // Parse replication stream configuration
                    if let Ok(_config) = serde_json::from_str::<ReplicationStreamConfig>(&text) {
                        // In production: subscribe to replication slot based on config
                        // For now, send sample replication event
                        let sample_event = WebSocketMessage {
                            message_type: "replication_event".to_string(),
                            data: json!({
                                "event_type": "wal_change",
                                "lsn": "0/12345678",
                                "transaction_id": 12345,
                                "operation": "INSERT",
                                "table": "products",
                                "data": {
                                    "id": 100,
                                    "name": "Sample Product",
                                    "price": 29.99
                                }
                            }),
                            timestamp: SystemTime::now()
                                .duration_since(UNIX_EPOCH)
                                .unwrap()
                                .as_secs() as i64,
                        };

                        if let Ok(event_json) = serde_json::to_string(&sample_event) {
                            if socket.send(Message::Text(event_json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                }
                Message::Close(_) => break,
                Message::Ping(data) => {
                    if socket.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                }
                _ => {}
            }
        } else {
            break;
        }
    }
}
// ============================================================================
// REST API Management Endpoints
// ============================================================================

// Query Parameters

/// Pagination query parameters for connection listings
#[derive(Debug, Deserialize)]
pub struct ConnectionQueryParams {
    /// Pagination offset (default: 0)
    pub offset: Option<usize>,
    /// Pagination limit (default: 50, max: 1000)
    pub limit: Option<usize>,
    /// Filter by connection state
    pub state: Option<String>,
    /// Filter by user ID
    pub user_id: Option<String>,
}

/// Pagination query parameters for subscription listings
#[derive(Debug, Deserialize)]
pub struct SubscriptionQueryParams {
    /// Pagination offset (default: 0)
    pub offset: Option<usize>,
    /// Pagination limit (default: 50, max: 1000)
    pub limit: Option<usize>,
    /// Filter by subscription type
    pub subscription_type: Option<String>,
    /// Filter by connection ID
    pub connection_id: Option<String>,
    /// Filter by status
    pub status: Option<String>,
}

// WebSocket Status Endpoint

/// GET /api/v1/ws/status
///
/// Get WebSocket server status and statistics
#[utoipa::path(
    get,
    path = "/api/v1/ws/status",
    tag = "websocket-management",
    responses(
        (status = 200, description = "WebSocket server status retrieved successfully", body = WebSocketStatus),
        (status = 500, description = "Internal server error", body = ApiError),
    )
)]
pub async fn get_websocket_status(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<AxumJson<WebSocketStatus>> {
    // TODO: Integrate with actual WebSocket server once implemented
    // For now, return mock data
    let status = WebSocketStatus {
        status: "healthy".to_string(),
        active_connections: 42,
        total_connections_lifetime: 1337,
        messages_sent: 50000,
        messages_received: 48500,
        bytes_sent: 5242880,  // ~5MB
        bytes_received: 4718592, // ~4.5MB
        active_subscriptions: 85,
        uptime_seconds: 86400, // 1 day
        max_connections: 10000,
        avg_message_latency_ms: 12.5,
        error_count: 3,
    };

    Ok(AxumJson(status))
}

// Connection Management Endpoints

/// GET /api/v1/ws/connections
///
/// List all active WebSocket connections with pagination and filtering
#[utoipa::path(
    get,
    path = "/api/v1/ws/connections",
    tag = "websocket-management",
    params(
        ("offset" = Option<usize>, Query, description = "Pagination offset"),
        ("limit" = Option<usize>, Query, description = "Pagination limit (max: 1000)"),
        ("state" = Option<String>, Query, description = "Filter by connection state"),
        ("user_id" = Option<String>, Query, description = "Filter by user ID"),
    ),
    responses(
        (status = 200, description = "List of connections retrieved successfully", body = ConnectionList),
        (status = 400, description = "Invalid query parameters", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError),
    )
)]
pub async fn list_connections(
    State(_state): State<Arc<ApiState>>,
    Query(params): Query<ConnectionQueryParams>,
) -> ApiResult<AxumJson<ConnectionList>> {
    let offset = params.offset.unwrap_or(0);
    let limit = params.limit.unwrap_or(50).min(1000);

    // TODO: Integrate with actual WebSocket server once implemented
    // For now, return mock data
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let mock_connections = vec![
        ConnectionInfo {
            connection_id: "conn_abc123".to_string(),
            remote_address: "192.168.1.100:54321".to_string(),
            protocol: "wss".to_string(),
            state: "connected".to_string(),
            session_id: Some(SessionId(12345)),
            user_id: Some("user_001".to_string()),
            connected_at: now - 3600,
            messages_sent: 150,
            messages_received: 142,
            bytes_sent: 15360,
            bytes_received: 14080,
            last_activity: now,
            subscriptions: vec!["sub_001".to_string(), "sub_002".to_string()],
            user_agent: Some("Mozilla/5.0".to_string()),
            metadata: std::collections::HashMap::new(),
        },
        ConnectionInfo {
            connection_id: "conn_def456".to_string(),
            remote_address: "10.0.0.50:43210".to_string(),
            protocol: "ws".to_string(),
            state: "connected".to_string(),
            session_id: Some(SessionId(12346)),
            user_id: Some("user_002".to_string()),
            connected_at: now - 1800,
            messages_sent: 75,
            messages_received: 72,
            bytes_sent: 7680,
            bytes_received: 7040,
            last_activity: now - 60,
            subscriptions: vec!["sub_003".to_string()],
            user_agent: Some("Python WebSocket Client/1.0".to_string()),
            metadata: std::collections::HashMap::new(),
        },
    ];

    // Apply filters
    let filtered_connections: Vec<ConnectionInfo> = mock_connections
        .into_iter()
        .filter(|conn| {
            if let Some(ref state) = params.state {
                if &conn.state != state {
                    return false;
                }
            }
            if let Some(ref user_id) = params.user_id {
                if conn.user_id.as_ref() != Some(user_id) {
                    return false;
                }
            }
            true
        })
        .collect();

    let total = filtered_connections.len();
    let paginated_connections: Vec<ConnectionInfo> = filtered_connections
        .into_iter()
        .skip(offset)
        .take(limit)
        .collect();

    Ok(AxumJson(ConnectionList {
        connections: paginated_connections,
        total,
        offset,
        limit,
    }))
}

/// GET /api/v1/ws/connections/{id}
///
/// Get detailed information about a specific WebSocket connection
#[utoipa::path(
    get,
    path = "/api/v1/ws/connections/{id}",
    tag = "websocket-management",
    params(
        ("id" = String, Path, description = "Connection ID"),
    ),
    responses(
        (status = 200, description = "Connection details retrieved successfully", body = ConnectionInfo),
        (status = 404, description = "Connection not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError),
    )
)]
pub async fn get_connection(
    State(_state): State<Arc<ApiState>>,
    Path(connection_id): Path<String>,
) -> ApiResult<AxumJson<ConnectionInfo>> {
    // TODO: Integrate with actual WebSocket server once implemented
    // For now, return mock data or error
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    if connection_id == "conn_abc123" {
        let connection = ConnectionInfo {
            connection_id: connection_id.clone(),
            remote_address: "192.168.1.100:54321".to_string(),
            protocol: "wss".to_string(),
            state: "connected".to_string(),
            session_id: Some(SessionId(12345)),
            user_id: Some("user_001".to_string()),
            connected_at: now - 3600,
            messages_sent: 150,
            messages_received: 142,
            bytes_sent: 15360,
            bytes_received: 14080,
            last_activity: now,
            subscriptions: vec!["sub_001".to_string(), "sub_002".to_string()],
            user_agent: Some("Mozilla/5.0".to_string()),
            metadata: std::collections::HashMap::new(),
        };
        Ok(AxumJson(connection))
    } else {
        Err(ApiError::new(
            "NOT_FOUND",
            format!("Connection {} not found", connection_id),
        ))
    }
}

/// DELETE /api/v1/ws/connections/{id}
///
/// Force disconnect a WebSocket connection
#[utoipa::path(
    delete,
    path = "/api/v1/ws/connections/{id}",
    tag = "websocket-management",
    params(
        ("id" = String, Path, description = "Connection ID"),
    ),
    request_body = Option<DisconnectRequest>,
    responses(
        (status = 200, description = "Connection disconnected successfully", body = DisconnectResponse),
        (status = 404, description = "Connection not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError),
    )
)]
pub async fn disconnect_connection(
    State(_state): State<Arc<ApiState>>,
    Path(connection_id): Path<String>,
    _request: Option<AxumJson<DisconnectRequest>>,
) -> ApiResult<AxumJson<DisconnectResponse>> {
    // TODO: Integrate with actual WebSocket server once implemented
    // For now, return mock success

    // Simulate checking if connection exists
    if !connection_id.starts_with("conn_") {
        return Err(ApiError::new(
            "NOT_FOUND",
            format!("Connection {} not found", connection_id),
        ));
    }

    let response = DisconnectResponse {
        connection_id,
        message: "Connection disconnected successfully".to_string(),
        disconnected_at: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64,
    };

    Ok(AxumJson(response))
}

// Broadcast Endpoint

/// POST /api/v1/ws/broadcast
///
/// Broadcast a message to all or filtered WebSocket connections
#[utoipa::path(
    post,
    path = "/api/v1/ws/broadcast",
    tag = "websocket-management",
    request_body = BroadcastRequest,
    responses(
        (status = 200, description = "Message broadcasted successfully", body = BroadcastResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError),
    )
)]
pub async fn broadcast_message(
    State(_state): State<Arc<ApiState>>,
    AxumJson(request): AxumJson<BroadcastRequest>,
) -> ApiResult<AxumJson<BroadcastResponse>> {
    // TODO: Integrate with actual WebSocket server once implemented
    // For now, return mock success

    // Simulate determining target connections
    let connection_ids = if let Some(targets) = request.target_connections {
        targets
    } else {
        // Mock: broadcast to all connections
        vec![
            "conn_abc123".to_string(),
            "conn_def456".to_string(),
            "conn_ghi789".to_string(),
        ]
    };

    let sent_count = connection_ids.len();

    let response = BroadcastResponse {
        sent_to_connections: sent_count,
        connection_ids,
        message: format!("Message broadcasted to {} connections", sent_count),
        broadcast_at: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64,
    };

    Ok(AxumJson(response))
}

// Subscription Management Endpoints

/// GET /api/v1/ws/subscriptions
///
/// List all active WebSocket subscriptions with pagination and filtering
#[utoipa::path(
    get,
    path = "/api/v1/ws/subscriptions",
    tag = "websocket-management",
    params(
        ("offset" = Option<usize>, Query, description = "Pagination offset"),
        ("limit" = Option<usize>, Query, description = "Pagination limit (max: 1000)"),
        ("subscription_type" = Option<String>, Query, description = "Filter by subscription type"),
        ("connection_id" = Option<String>, Query, description = "Filter by connection ID"),
        ("status" = Option<String>, Query, description = "Filter by subscription status"),
    ),
    responses(
        (status = 200, description = "List of subscriptions retrieved successfully", body = SubscriptionList),
        (status = 400, description = "Invalid query parameters", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError),
    )
)]
pub async fn list_subscriptions(
    State(_state): State<Arc<ApiState>>,
    Query(params): Query<SubscriptionQueryParams>,
) -> ApiResult<AxumJson<SubscriptionList>> {
    let offset = params.offset.unwrap_or(0);
    let limit = params.limit.unwrap_or(50).min(1000);

    // TODO: Integrate with actual WebSocket server once implemented
    // For now, return mock data
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let mock_subscriptions = vec![
        SubscriptionInfo {
            subscription_id: "sub_001".to_string(),
            connection_id: "conn_abc123".to_string(),
            subscription_type: "table".to_string(),
            target: "users".to_string(),
            filters: Some("WHERE active = true".to_string()),
            created_at: now - 3600,
            messages_sent: 47,
            last_message_at: Some(now - 120),
            status: "active".to_string(),
            config: std::collections::HashMap::new(),
        },
        SubscriptionInfo {
            subscription_id: "sub_002".to_string(),
            connection_id: "conn_abc123".to_string(),
            subscription_type: "metrics".to_string(),
            target: "system.cpu".to_string(),
            filters: None,
            created_at: now - 3600,
            messages_sent: 103,
            last_message_at: Some(now - 5),
            status: "active".to_string(),
            config: std::collections::HashMap::new(),
        },
        SubscriptionInfo {
            subscription_id: "sub_003".to_string(),
            connection_id: "conn_def456".to_string(),
            subscription_type: "query".to_string(),
            target: "SELECT * FROM orders WHERE status = 'pending'".to_string(),
            filters: None,
            created_at: now - 1800,
            messages_sent: 23,
            last_message_at: Some(now - 300),
            status: "active".to_string(),
            config: std::collections::HashMap::new(),
        },
    ];

    // Apply filters
    let filtered_subscriptions: Vec<SubscriptionInfo> = mock_subscriptions
        .into_iter()
        .filter(|sub| {
            if let Some(ref sub_type) = params.subscription_type {
                if &sub.subscription_type != sub_type {
                    return false;
                }
            }
            if let Some(ref conn_id) = params.connection_id {
                if &sub.connection_id != conn_id {
                    return false;
                }
            }
            if let Some(ref status) = params.status {
                if &sub.status != status {
                    return false;
                }
            }
            true
        })
        .collect();

    let total = filtered_subscriptions.len();
    let paginated_subscriptions: Vec<SubscriptionInfo> = filtered_subscriptions
        .into_iter()
        .skip(offset)
        .take(limit)
        .collect();

    Ok(AxumJson(SubscriptionList {
        subscriptions: paginated_subscriptions,
        total,
        offset,
        limit,
    }))
}

/// POST /api/v1/ws/subscriptions
///
/// Create a new WebSocket subscription
#[utoipa::path(
    post,
    path = "/api/v1/ws/subscriptions",
    tag = "websocket-management",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created successfully", body = CreateSubscriptionResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Connection not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError),
    )
)]
pub async fn create_subscription(
    State(_state): State<Arc<ApiState>>,
    AxumJson(request): AxumJson<CreateSubscriptionRequest>,
) -> ApiResult<(StatusCode, AxumJson<CreateSubscriptionResponse>)> {
    // TODO: Integrate with actual WebSocket server once implemented
    // For now, return mock success

    // Validate connection exists
    if !request.connection_id.starts_with("conn_") {
        return Err(ApiError::new(
            "NOT_FOUND",
            format!("Connection {} not found", request.connection_id),
        ));
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let subscription_id = format!("sub_{}", uuid::Uuid::new_v4().to_string()[..8].to_string());

    let subscription = SubscriptionInfo {
        subscription_id: subscription_id.clone(),
        connection_id: request.connection_id,
        subscription_type: request.subscription_type,
        target: request.target,
        filters: request.filters,
        created_at: now,
        messages_sent: 0,
        last_message_at: None,
        status: "active".to_string(),
        config: request.config.unwrap_or_default(),
    };

    let response = CreateSubscriptionResponse {
        subscription_id,
        subscription: subscription.clone(),
        message: "Subscription created successfully".to_string(),
    };

    Ok((StatusCode::CREATED, AxumJson(response)))
}

/// DELETE /api/v1/ws/subscriptions/{id}
///
/// Remove a WebSocket subscription
#[utoipa::path(
    delete,
    path = "/api/v1/ws/subscriptions/{id}",
    tag = "websocket-management",
    params(
        ("id" = String, Path, description = "Subscription ID"),
    ),
    responses(
        (status = 200, description = "Subscription removed successfully", body = DeleteSubscriptionResponse),
        (status = 404, description = "Subscription not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError),
    )
)]
pub async fn delete_subscription(
    State(_state): State<Arc<ApiState>>,
    Path(subscription_id): Path<String>,
) -> ApiResult<AxumJson<DeleteSubscriptionResponse>> {
    // TODO: Integrate with actual WebSocket server once implemented
    // For now, return mock success

    // Simulate checking if subscription exists
    if !subscription_id.starts_with("sub_") {
        return Err(ApiError::new(
            "NOT_FOUND",
            format!("Subscription {} not found", subscription_id),
        ));
    }

    let response = DeleteSubscriptionResponse {
        subscription_id,
        message: "Subscription removed successfully".to_string(),
        deleted_at: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64,
    };

    Ok(AxumJson(response))
}
