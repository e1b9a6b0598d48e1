// Network Management Handlers
//
// Handler functions for network and cluster networking operations

use axum::{
    extract::{Path, State},
    response::Json as AxumJson,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use utoipa::ToSchema;
use parking_lot::RwLock;

use super::super::types::*;

// ============================================================================
// Network-specific Types
// ============================================================================

/// Overall network status
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NetworkStatus {
    pub status: String, // healthy, degraded, unhealthy
    pub active_connections: usize,
    pub total_connections_lifetime: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub errors: u64,
    pub uptime_seconds: u64,
}

/// Active connection information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NetworkConnectionInfo {
    pub connection_id: String,
    pub remote_address: String,
    pub local_address: String,
    pub protocol: String, // tcp, websocket
    pub state: String, // established, closing, closed
    pub session_id: Option<SessionId>,
    pub connected_at: i64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub last_activity: i64,
}

/// Protocol configuration
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProtocolConfig {
    pub protocol_version: String,
    pub max_packet_size: usize,
    pub compression_enabled: bool,
    pub encryption_enabled: bool,
    pub keep_alive_interval_secs: u64,
    pub timeout_secs: u64,
}

/// Update protocol settings request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateProtocolRequest {
    pub max_packet_size: Option<usize>,
    pub compression_enabled: Option<bool>,
    pub keep_alive_interval_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
}

/// Cluster status
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClusterStatus {
    pub cluster_id: String,
    pub status: String, // healthy, degraded, unhealthy
    pub node_count: usize,
    pub healthy_nodes: usize,
    pub leader_node_id: Option<String>,
    pub consensus_algorithm: String,
    pub replication_factor: usize,
}

/// Cluster node details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClusterNode {
    pub node_id: String,
    pub address: String,
    pub port: u16,
    pub role: String, // leader, follower, candidate
    pub status: String, // healthy, degraded, unhealthy, offline
    pub version: String,
    pub uptime_seconds: u64,
    pub last_heartbeat: i64,
    pub cpu_usage: f64,
    pub memory_usage_mb: u64,
    pub disk_usage_percent: f64,
    pub connections: usize,
}

/// Add node to cluster request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddClusterNodeRequest {
    pub node_id: String,
    pub address: String,
    pub port: u16,
    pub role: Option<String>,
}

/// Load balancer statistics
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoadBalancerStats {
    pub algorithm: String, // round_robin, least_connections, weighted
    pub total_requests: u64,
    pub requests_per_second: f64,
    pub backend_pools: Vec<BackendPool>,
}

/// Backend pool information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BackendPool {
    pub pool_id: String,
    pub backends: Vec<Backend>,
    pub active_requests: u64,
    pub total_requests: u64,
}

/// Backend server information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Backend {
    pub backend_id: String,
    pub address: String,
    pub weight: u32,
    pub active: bool,
    pub health_status: String,
    pub active_connections: usize,
    pub total_requests: u64,
    pub failed_requests: u64,
    pub avg_response_time_ms: f64,
}

/// Load balancer configuration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoadBalancerConfig {
    pub algorithm: String,
    pub health_check_interval_secs: u64,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

/// Circuit breaker status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CircuitBreakerStatus {
    pub name: String,
    pub state: String, // closed, open, half_open
    pub failure_count: u64,
    pub success_count: u64,
    pub last_failure: Option<i64>,
    pub last_state_change: i64,
    pub failure_threshold: u32,
    pub timeout_secs: u64,
}

// ============================================================================
// Lazy-initialized network state
// ============================================================================

lazy_static::lazy_static! {
    static ref CONNECTIONS: Arc<RwLock<HashMap<String, NetworkConnectionInfo>>> = {
        let mut conns = HashMap::new();
        conns.insert("conn_1".to_string(), NetworkConnectionInfo {
            connection_id: "conn_1".to_string(),
            remote_address: "192.168.1.100:45678".to_string(),
            local_address: "0.0.0.0:5432".to_string(),
            protocol: "tcp".to_string(),
            state: "established".to_string(),
            session_id: Some(SessionId(1001)),
            connected_at: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64 - 1800,
            bytes_sent: 1_500_000,
            bytes_received: 800_000,
            last_activity: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64 - 5,
        });
        Arc::new(RwLock::new(conns))
    };

    static ref PROTOCOL_CONFIG: Arc<RwLock<ProtocolConfig>> = Arc::new(RwLock::new(ProtocolConfig {
        protocol_version: "1.0".to_string(),
        max_packet_size: 1_048_576,
        compression_enabled: true,
        encryption_enabled: true,
        keep_alive_interval_secs: 30,
        timeout_secs: 300,
    }));

    static ref CLUSTER_NODES: Arc<RwLock<HashMap<String, ClusterNode>>> = {
        let mut nodes = HashMap::new();
        nodes.insert("node1".to_string(), ClusterNode {
            node_id: "node1".to_string(),
            address: "192.168.1.10".to_string(),
            port: 5432,
            role: "leader".to_string(),
            status: "healthy".to_string(),
            version: "1.0.0".to_string(),
            uptime_seconds: 86400,
            last_heartbeat: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64,
            cpu_usage: 45.5,
            memory_usage_mb: 2048,
            disk_usage_percent: 60.0,
            connections: 50,
        });
        Arc::new(RwLock::new(nodes))
    };

    static ref CIRCUIT_BREAKERS: Arc<RwLock<HashMap<String, CircuitBreakerStatus>>> = {
        let mut breakers = HashMap::new();
        breakers.insert("database".to_string(), CircuitBreakerStatus {
            name: "database".to_string(),
            state: "closed".to_string(),
            failure_count: 2,
            success_count: 9998,
            last_failure: Some(SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64 - 3600),
            last_state_change: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64 - 3600,
            failure_threshold: 5,
            timeout_secs: 60,
        });
        Arc::new(RwLock::new(breakers))
    };

    static ref TOTAL_CONNECTIONS: Arc<RwLock<u64>> = Arc::new(RwLock::new(1000));
    static ref TOTAL_BYTES_SENT: Arc<RwLock<u64>> = Arc::new(RwLock::new(1_000_000_000));
    static ref TOTAL_BYTES_RECEIVED: Arc<RwLock<u64>> = Arc::new(RwLock::new(500_000_000));
}

// ============================================================================
// Handler Functions
// ============================================================================

/// Get overall network status
#[utoipa::path(
    get,
    path = "/api/v1/network/status",
    tag = "network",
    responses(
        (status = 200, description = "Network status", body = NetworkStatus),
    )
)]
pub async fn get_network_status(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<AxumJson<NetworkStatus>> {
    let connections = CONNECTIONS.read();
    let total_conns = TOTAL_CONNECTIONS.read();
    let bytes_sent = TOTAL_BYTES_SENT.read();
    let bytes_received = TOTAL_BYTES_RECEIVED.read();

    let status = NetworkStatus {
        status: "healthy".to_string(),
        active_connections: connections.len(),
        total_connections_lifetime: *total_conns,
        bytes_sent: *bytes_sent,
        bytes_received: *bytes_received,
        errors: 0,
        uptime_seconds: 86400,
    };

    Ok(AxumJson(status))
}

/// Get active connections
#[utoipa::path(
    get,
    path = "/api/v1/network/connections",
    tag = "network",
    responses(
        (status = 200, description = "Active connections", body = Vec<NetworkConnectionInfo>),
    )
)]
pub async fn get_connections(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<AxumJson<Vec<NetworkConnectionInfo>>> {
    let connections = CONNECTIONS.read();
    let conn_list: Vec<NetworkConnectionInfo> = connections.values().cloned().collect();
    Ok(AxumJson(conn_list))
}

/// Get connection details
#[utoipa::path(
    get,
    path = "/api/v1/network/connections/{id}",
    tag = "network",
    params(
        ("id" = String, Path, description = "Connection ID")
    ),
    responses(
        (status = 200, description = "Connection details", body = NetworkConnectionInfo),
        (status = 404, description = "Connection not found", body = ApiError),
    )
)]
pub async fn get_connection(
    State(_state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<AxumJson<NetworkConnectionInfo>> {
    let connections = CONNECTIONS.read();

    if let Some(conn) = connections.get(&id) {
        Ok(AxumJson(conn.clone()))
    } else {
        Err(ApiError::new("NOT_FOUND", format!("Connection {} not found", id)))
    }
}

/// Kill a connection
#[utoipa::path(
    delete,
    path = "/api/v1/network/connections/{id}",
    tag = "network",
    params(
        ("id" = String, Path, description = "Connection ID")
    ),
    responses(
        (status = 204, description = "Connection killed"),
        (status = 404, description = "Connection not found", body = ApiError),
    )
)]
pub async fn kill_connection(
    State(_state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut connections = CONNECTIONS.write();

    if connections.remove(&id).is_some() {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::new("NOT_FOUND", format!("Connection {} not found", id)))
    }
}

/// Get protocol configuration
#[utoipa::path(
    get,
    path = "/api/v1/network/protocols",
    tag = "network",
    responses(
        (status = 200, description = "Protocol configuration", body = ProtocolConfig),
    )
)]
pub async fn get_protocols(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<AxumJson<ProtocolConfig>> {
    let config = PROTOCOL_CONFIG.read();
    Ok(AxumJson(config.clone()))
}

/// Update protocol settings
#[utoipa::path(
    put,
    path = "/api/v1/network/protocols",
    tag = "network",
    request_body = UpdateProtocolRequest,
    responses(
        (status = 200, description = "Protocol settings updated", body = ProtocolConfig),
    )
)]
pub async fn update_protocols(
    State(_state): State<Arc<ApiState>>,
    AxumJson(request): AxumJson<UpdateProtocolRequest>,
) -> ApiResult<AxumJson<ProtocolConfig>> {
    let mut config = PROTOCOL_CONFIG.write();

    if let Some(max_packet_size) = request.max_packet_size {
        config.max_packet_size = max_packet_size;
    }
    if let Some(compression) = request.compression_enabled {
        config.compression_enabled = compression;
    }
    if let Some(keep_alive) = request.keep_alive_interval_secs {
        config.keep_alive_interval_secs = keep_alive;
    }
    if let Some(timeout) = request.timeout_secs {
        config.timeout_secs = timeout;
    }

    Ok(AxumJson(config.clone()))
}

/// Get cluster status
#[utoipa::path(
    get,
    path = "/api/v1/network/cluster/status",
    tag = "network",
    responses(
        (status = 200, description = "Cluster status", body = ClusterStatus),
    )
)]
pub async fn get_cluster_status(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<AxumJson<ClusterStatus>> {
    let nodes = CLUSTER_NODES.read();
    let healthy_count = nodes.values().filter(|n| n.status == "healthy").count();
    let leader = nodes.values().find(|n| n.role == "leader").map(|n| n.node_id.clone());

    let status = ClusterStatus {
        cluster_id: "cluster-main".to_string(),
        status: "healthy".to_string(),
        node_count: nodes.len(),
        healthy_nodes: healthy_count,
        leader_node_id: leader,
        consensus_algorithm: "raft".to_string(),
        replication_factor: 3,
    };

    Ok(AxumJson(status))
}

/// List cluster nodes
#[utoipa::path(
    get,
    path = "/api/v1/network/cluster/nodes",
    tag = "network",
    responses(
        (status = 200, description = "Cluster nodes", body = Vec<ClusterNode>),
    )
)]
pub async fn get_cluster_nodes(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<AxumJson<Vec<ClusterNode>>> {
    let nodes = CLUSTER_NODES.read();
    let node_list: Vec<ClusterNode> = nodes.values().cloned().collect();
    Ok(AxumJson(node_list))
}

/// Add node to cluster
#[utoipa::path(
    post,
    path = "/api/v1/network/cluster/nodes",
    tag = "network",
    request_body = AddClusterNodeRequest,
    responses(
        (status = 201, description = "Node added", body = ClusterNode),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn add_cluster_node(
    State(_state): State<Arc<ApiState>>,
    AxumJson(request): AxumJson<AddClusterNodeRequest>,
) -> ApiResult<(StatusCode, AxumJson<ClusterNode>)> {
    let mut nodes = CLUSTER_NODES.write();

    let node = ClusterNode {
        node_id: request.node_id.clone(),
        address: request.address,
        port: request.port,
        role: request.role.unwrap_or_else(|| "follower".to_string()),
        status: "healthy".to_string(),
        version: "1.0.0".to_string(),
        uptime_seconds: 0,
        last_heartbeat: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64,
        cpu_usage: 0.0,
        memory_usage_mb: 0,
        disk_usage_percent: 0.0,
        connections: 0,
    };

    nodes.insert(request.node_id, node.clone());

    Ok((StatusCode::CREATED, AxumJson(node)))
}

/// Remove node from cluster
#[utoipa::path(
    delete,
    path = "/api/v1/network/cluster/nodes/{id}",
    tag = "network",
    params(
        ("id" = String, Path, description = "Node ID")
    ),
    responses(
        (status = 204, description = "Node removed"),
        (status = 404, description = "Node not found", body = ApiError),
    )
)]
pub async fn remove_cluster_node(
    State(_state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut nodes = CLUSTER_NODES.write();

    if nodes.remove(&id).is_some() {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::new("NOT_FOUND", format!("Node {} not found", id)))
    }
}

/// Get load balancer stats
#[utoipa::path(
    get,
    path = "/api/v1/network/loadbalancer",
    tag = "network",
    responses(
        (status = 200, description = "Load balancer statistics", body = LoadBalancerStats),
    )
)]
pub async fn get_loadbalancer_stats(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<AxumJson<LoadBalancerStats>> {
    let stats = LoadBalancerStats {
        algorithm: "round_robin".to_string(),
        total_requests: 1_000_000,
        requests_per_second: 1500.0,
        backend_pools: vec![
            BackendPool {
                pool_id: "pool1".to_string(),
                backends: vec![
                    Backend {
                        backend_id: "backend1".to_string(),
                        address: "192.168.1.10:5432".to_string(),
                        weight: 100,
                        active: true,
                        health_status: "healthy".to_string(),
                        active_connections: 50,
                        total_requests: 500_000,
                        failed_requests: 10,
                        avg_response_time_ms: 12.5,
                    },
                ],
                active_requests: 150,
                total_requests: 500_000,
            },
        ],
    };

    Ok(AxumJson(stats))
}

/// Configure load balancer
#[utoipa::path(
    put,
    path = "/api/v1/network/loadbalancer/config",
    tag = "network",
    request_body = LoadBalancerConfig,
    responses(
        (status = 200, description = "Load balancer configured"),
    )
)]
pub async fn configure_loadbalancer(
    State(_state): State<Arc<ApiState>>,
    AxumJson(_config): AxumJson<LoadBalancerConfig>,
) -> ApiResult<AxumJson<serde_json::Value>> {
    // In a real implementation, this would update the load balancer configuration
    Ok(AxumJson(json!({
        "status": "updated",
        "timestamp": SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
    })))
}

/// Get circuit breaker status
#[utoipa::path(
    get,
    path = "/api/v1/network/circuit-breakers",
    tag = "network",
    responses(
        (status = 200, description = "Circuit breaker status", body = Vec<CircuitBreakerStatus>),
    )
)]
pub async fn get_circuit_breakers(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<AxumJson<Vec<CircuitBreakerStatus>>> {
    let breakers = CIRCUIT_BREAKERS.read();
    let breaker_list: Vec<CircuitBreakerStatus> = breakers.values().cloned().collect();
    Ok(AxumJson(breaker_list))
}
