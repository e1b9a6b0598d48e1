// # Replication Health Monitoring and Analytics
//
// This module provides comprehensive health monitoring, lag tracking, and
// real-time analytics for the replication system with proactive alerting
// and performance optimization recommendations.
//
// ## Key Features
//
// - **Real-time Monitoring**: Continuous health checks and lag tracking
// - **Proactive Alerting**: Configurable alerts for various conditions
// - **Performance Analytics**: Detailed metrics and trend analysis
// - **Health Scoring**: Comprehensive health scoring algorithm
// - **Diagnostic Tools**: Automated issue detection and recommendations
// - **Historical Analysis**: Long-term performance trend tracking
//
// ## Monitoring Metrics
//
// - **Replication Lag**: Byte and time-based lag measurements
// - **Throughput**: Operations per second and data transfer rates
// - **Connection Health**: Network connectivity and response times
// - **Error Rates**: Failure frequencies and error patterns
// - **Resource Usage**: Memory and CPU consumption
// - **Conflict Rates**: Frequency and resolution success rates
//
// ## Usage Example
//
// ```rust
// use crate::replication::monitor::*;
// use crate::replication::types::*;
//
// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
// // Create monitoring configuration
// let config = HealthMonitorConfig {
//     check_interval: Duration::from_secs(30),
//     lag_threshold_bytes: 1024 * 1024, // 1MB
//     lag_threshold_seconds: 60,
//     enable_proactive_alerts: true,
//     enable_performance_analytics: true,
//     ..Default::default()
// };
//
// // Create health monitor
// let monitor = ReplicationHealthMonitor::new(config)?;
//
// // Add replica for monitoring
// let replica_id = ReplicaId::new("replica-01")?;
// monitor.add_replica(replica_id.clone()).await?;
//
// // Start monitoring
// monitor.start_monitoring().await?;
//
// // Get current health status
// let health = monitor.get_replica_health(&replica_id).await?;
// println!("Replica health score: {}", health.health_score);
//
// // Get analytics report
// let analytics = monitor.generate_analytics_report(
//     SystemTime::now() - Duration::from_hours(24),
//     SystemTime::now()
// ).await?;
//
// println!("Average lag: {:?}", analytics.average_lag);
// # Ok(())
// # }
// ```

use std::collections::VecDeque;
use std::time::SystemTime;
use crate::error::DbError;
use crate::replication::types::*;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap};
use std::sync::Arc;
use std::time::{Duration};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{interval};
use uuid::Uuid;

/// Health monitoring specific errors
#[derive(Error, Debug)]
pub enum HealthMonitorError {
    #[error("Replica monitoring not found: {replica_id}")]
    ReplicaNotFound { replica_id: String },

    #[error("Invalid monitoring configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("Health check failed for replica {replica_id}: {reason}")]
    HealthCheckFailed { replica_id: String, reason: String },

    #[error("Analytics computation failed: {reason}")]
    AnalyticsError { reason: String },

    #[error("Alert delivery failed: {alert_type} - {reason}")]
    AlertDeliveryFailed { alert_type: String, reason: String },

    #[error("Monitoring service unavailable: {service}")]
    ServiceUnavailable { service: String },

    #[error("Metric collection failed: {metric} - {reason}")]
    MetricCollectionFailed { metric: String, reason: String },
}

/// Comprehensive health monitor configuration
///
/// Contains all configurable parameters for health monitoring
/// with sensible defaults for production environments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthMonitorConfig {
    /// Interval between health checks
    pub check_interval: Duration,
    /// Lag threshold in bytes for warnings
    pub lag_threshold_bytes: u64,
    /// Lag threshold in seconds for warnings
    pub lag_threshold_seconds: u64,
    /// Connection timeout for health checks
    pub connection_timeout: Duration,
    /// Enable proactive alerting
    pub enable_proactive_alerts: bool,
    /// Enable performance analytics
    pub enable_performance_analytics: bool,
    /// Maximum metrics history to keep
    pub max_metrics_history: usize,
    /// Sampling interval for detailed metrics
    pub detailed_metrics_interval: Duration,
    /// Health score calculation window
    pub health_score_window: Duration,
    /// Enable trend analysis
    pub enable_trend_analysis: bool,
    /// Alert cooldown period
    pub alert_cooldown: Duration,
    /// Enable diagnostic recommendations
    pub enable_diagnostics: bool,
    /// Metrics aggregation window
    pub aggregation_window: Duration,
    /// Enable real-time notifications
    pub enable_real_time_notifications: bool,
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(30),
            lag_threshold_bytes: 1024 * 1024, // 1MB
            lag_threshold_seconds: 60,
            connection_timeout: Duration::from_secs(10),
            enable_proactive_alerts: true,
            enable_performance_analytics: true,
            max_metrics_history: 10000,
            detailed_metrics_interval: Duration::from_secs(5),
            health_score_window: Duration::from_secs(300), // 5 minutes
            enable_trend_analysis: true,
            alert_cooldown: Duration::from_secs(300), // 5 minutes
            enable_diagnostics: true,
            aggregation_window: Duration::from_secs(60),
            enable_real_time_notifications: true,
        }
    }
}

/// Comprehensive replica health status
///
/// Contains detailed health information including scores,
/// metrics, and diagnostic information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicaHealthStatus {
    /// Replica identifier
    pub replica_id: ReplicaId,
    /// Overall health score (0-100)
    pub health_score: u8,
    /// Detailed health components
    pub health_components: HealthComponents,
    /// Current replication lag
    pub current_lag: LagMetrics,
    /// Connection status and metrics
    pub connection_metrics: ConnectionMetrics,
    /// Performance metrics
    pub performance_metrics: PerformanceMetrics,
    /// Error statistics
    pub error_statistics: ErrorStatistics,
    /// Last health check timestamp
    pub last_check: SystemTime,
    /// Health trend over time
    pub health_trend: HealthTrend,
    /// Active alerts
    pub active_alerts: Vec<HealthAlert>,
    /// Diagnostic recommendations
    pub recommendations: Vec<DiagnosticRecommendation>,
}

/// Health components breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthComponents {
    /// Connectivity health (0-100)
    pub connectivity_score: u8,
    /// Replication lag health (0-100)
    pub lag_score: u8,
    /// Error rate health (0-100)
    pub error_rate_score: u8,
    /// Performance health (0-100)
    pub performance_score: u8,
    /// Resource usage health (0-100)
    pub resource_score: u8,
}

/// Detailed lag metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LagMetrics {
    /// Current lag in bytes
    pub lag_bytes: u64,
    /// Current lag in seconds
    pub lag_seconds: u64,
    /// Average lag over monitoring window
    pub average_lag_bytes: u64,
    /// Maximum lag seen
    pub max_lag_bytes: u64,
    /// Lag trend direction
    pub trend: LagTrend,
    /// Lag percentiles
    pub percentiles: LagPercentiles,
}

/// Lag percentile measurements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LagPercentiles {
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
}

/// Connection metrics and statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionMetrics {
    /// Whether replica is currently connected
    pub is_connected: bool,
    /// Last successful connection time
    pub last_connected: SystemTime,
    /// Connection latency in milliseconds
    pub latency_ms: u64,
    /// Connection uptime percentage
    pub uptime_percentage: f64,
    /// Total connection attempts
    pub connection_attempts: u64,
    /// Failed connection attempts
    pub failed_connections: u64,
}

/// Performance metrics and statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Operations per second
    pub operations_per_second: f64,
    /// Average operation latency
    pub average_latency_ms: f64,
    /// Throughput in bytes per second
    pub throughput_bps: u64,
    /// CPU usage percentage
    pub cpu_usage_percent: f64,
    /// Memory usage in bytes
    pub memory_usage_bytes: u64,
    /// Network bandwidth usage
    pub network_usage_bps: u64,
}

/// Error statistics and patterns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorStatistics {
    /// Total error count
    pub total_errors: u64,
    /// Errors in last hour
    pub errors_last_hour: u32,
    /// Error rate (errors per minute)
    pub error_rate: f64,
    /// Most common error types
    pub common_errors: HashMap<String, u32>,
    /// Last error timestamp
    pub last_error_time: Option<SystemTime>,
    /// Last error message
    pub last_error_message: Option<String>,
}

/// Health trend analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HealthTrend {
    /// Health is improving
    Improving,
    /// Health is stable
    Stable,
    /// Health is declining
    Declining,
    /// Health is critically bad
    Critical,
    /// Insufficient data for trend analysis
    Unknown,
}

/// Health alert types and severity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthAlert {
    /// Unique alert ID
    pub alert_id: Uuid,
    /// Alert type
    pub alert_type: AlertType,
    /// Alert severity
    pub severity: AlertSeverity,
    /// Alert message
    pub message: String,
    /// Alert creation time
    pub created_at: SystemTime,
    /// Whether alert has been acknowledged
    pub acknowledged: bool,
    /// Associated metric values
    pub metric_values: HashMap<String, f64>,
}

/// Types of health alerts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertType {
    /// High replication lag
    HighLag,
    /// Connection failure
    ConnectionFailure,
    /// High error rate
    HighErrorRate,
    /// Performance degradation
    PerformanceDegradation,
    /// Resource exhaustion
    ResourceExhaustion,
    /// Conflict rate spike
    ConflictSpike,
    /// Data corruption detected
    DataCorruption,
}

/// Alert severity levels
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// Diagnostic recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticRecommendation {
    /// Recommendation ID
    pub recommendation_id: Uuid,
    /// Recommendation category
    pub category: RecommendationCategory,
    /// Priority level
    pub priority: RecommendationPriority,
    /// Recommendation title
    pub title: String,
    /// Detailed description
    pub description: String,
    /// Estimated impact
    pub estimated_impact: String,
    /// Implementation difficulty
    pub difficulty: ImplementationDifficulty,
    /// Related metrics
    pub related_metrics: Vec<String>,
}

/// Recommendation categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationCategory {
    Performance,
    Reliability,
    Security,
    ResourceOptimization,
    Configuration,
}

/// Recommendation priority levels
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecommendationPriority {
    Low,
    Medium,
    High,
    Critical,
}

/// Implementation difficulty levels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImplementationDifficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

/// Time-series metric data point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDataPoint {
    /// Timestamp of the measurement
    pub timestamp: SystemTime,
    /// Metric value
    pub value: f64,
    /// Additional tags/labels
    pub tags: HashMap<String, String>,
}

/// Aggregated analytics report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// Report generation timestamp
    pub generated_at: SystemTime,
    /// Time period covered by report
    pub time_period: (SystemTime),
    /// Number of replicas analyzed
    pub replica_count: usize,
    /// Overall system health score
    pub overall_health_score: u8,
    /// Average lag across all replicas
    pub average_lag: LagMetrics,
    /// System-wide performance metrics
    pub system_performance: PerformanceMetrics,
    /// Error analysis
    pub error_analysis: SystemErrorAnalysis,
    /// Trend analysis
    pub trend_analysis: SystemTrendAnalysis,
    /// Top recommendations
    pub top_recommendations: Vec<DiagnosticRecommendation>,
}

/// System-wide error analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemErrorAnalysis {
    /// Total errors across all replicas
    pub total_errors: u64,
    /// Error rate trend
    pub error_rate_trend: HealthTrend,
    /// Most problematic replicas
    pub problematic_replicas: Vec<(ReplicaId, u32)>,
    /// Common error patterns
    pub error_patterns: Vec<String>,
}

/// System-wide trend analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemTrendAnalysis {
    /// Overall health trend
    pub health_trend: HealthTrend,
    /// Performance trend
    pub performance_trend: HealthTrend,
    /// Lag trend
    pub lag_trend: HealthTrend,
    /// Capacity trend
    pub capacity_trend: HealthTrend,
    /// Predicted issues
    pub predicted_issues: Vec<String>,
}

/// Health monitor trait for different implementations
#[async_trait]
pub trait HealthMonitor: Send + Sync {
    /// Start health monitoring
    async fn start_monitoring(&self) -> Result<(), HealthMonitorError>;

    /// Stop health monitoring
    async fn stop_monitoring(&self) -> Result<(), HealthMonitorError>;

    /// Add a replica to monitor
    async fn add_replica(&self, replica_id: ReplicaId) -> Result<(), HealthMonitorError>;

    /// Remove a replica from monitoring
    async fn remove_replica(&self, replica_id: &ReplicaId) -> Result<(), HealthMonitorError>;

    /// Get health status for a specific replica
    async fn get_replica_health(&self, replica_id: &ReplicaId) -> Result<ReplicaHealthStatus, HealthMonitorError>;

    /// Get health status for all replicas
    async fn get_all_replica_health(&self) -> Result<Vec<ReplicaHealthStatus>, HealthMonitorError>;

    /// Generate analytics report
    async fn generate_analytics_report(
        &self,
        start_time: SystemTime,
        end_time: SystemTime,
    ) -> Result<AnalyticsReport, HealthMonitorError>;
}

/// Main replication health monitor implementation
pub struct ReplicationHealthMonitor {
    /// Configuration
    config: Arc<HealthMonitorConfig>,
    /// Replica monitoring state
    replica_monitors: Arc<RwLock<HashMap<ReplicaId, ReplicaMonitorState>>>,
    /// Metrics history
    metrics_history: Arc<RwLock<HashMap<ReplicaId<MetricDataPoint>>>>,
    /// Active alerts
    active_alerts: Arc<RwLock<HashMap<Uuid, HealthAlert>>>,
    /// Alert history
    alert_history: Arc<RwLock<VecDeque<HealthAlert>>>,
    /// Background task handles
    task_handles: Arc<Mutex<Vec<tokio::task::JoinHandle<()>>>>,
    /// Event channel for health events
    event_sender: mpsc::UnboundedSender<HealthEvent>,
    /// Shutdown signal
    shutdown_sender: Arc<Mutex<Option<mpsc::UnboundedSender<()>>>>,
    /// Health score calculator
    score_calculator: Arc<HealthScoreCalculator>,
}

/// Internal monitoring state for a replica
#[derive(Debug)]
struct ReplicaMonitorState {
    replica_id: ReplicaId,
    current_health: ReplicaHealthStatus,
    last_metrics_collection: SystemTime,
    monitoring_active: bool,
    consecutive_failures: u32,
    last_alert_time: Option<SystemTime>,
}

/// Health events for monitoring and integration
#[derive(Debug, Clone)]
pub enum HealthEvent {
    /// Health check completed
    HealthCheckCompleted { replica_id: ReplicaId, health_score: u8 },
    /// Alert triggered
    AlertTriggered { alert: HealthAlert },
    /// Alert resolved
    AlertResolved { alert_id: Uuid },
    /// Health trend changed
    TrendChanged { replica_id: ReplicaId, old_trend: HealthTrend, new_trend: HealthTrend },
    /// Monitoring started for replica
    MonitoringStarted { replica_id: ReplicaId },
    /// Monitoring stopped for replica
    MonitoringStopped { replica_id: ReplicaId },
}

/// Health score calculation engine
pub struct HealthScoreCalculator {
    /// Weights for different health components
    component_weights: ComponentWeights,
}

/// Weights for health score calculation
#[derive(Debug, Clone)]
struct ComponentWeights {
    connectivity: f64,
    lag: f64,
    error_rate: f64,
    performance: f64,
    resource_usage: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            connectivity: 0.25,
            lag: 0.25,
            error_rate: 0.20,
            performance: 0.15,
            resource_usage: 0.15,
        }
    }
}

impl HealthScoreCalculator {
    /// Creates a new health score calculator
    pub fn new() -> Self {
        Self {
            component_weights: ComponentWeights::default(),
        }
    }

    /// Calculates overall health score from components
    pub fn calculate_health_score(&self, components: &HealthComponents) -> u8 {
        let weighted_score =
            (components.connectivity_score as f64 * self.component_weights.connectivity) +
            (components.lag_score as f64 * self.component_weights.lag) +
            (components.error_rate_score as f64 * self.component_weights.error_rate) +
            (components.performance_score as f64 * self.component_weights.performance) +
            (components.resource_score as f64 * self.component_weights.resource_usage);

        (weighted_score.round() as u8).min(100)
    }

    /// Calculates connectivity score based on connection metrics
    pub fn calculate_connectivity_score(&self, metrics: &ConnectionMetrics) -> u8 {
        if !metrics.is_connected {
            return 0;
        }

        let uptime_score = (metrics.uptime_percentage * 100.0) as u8;
        let latency_score = if metrics.latency_ms <= 10 {
            100
        } else if metrics.latency_ms <= 50 {
            80
        } else if metrics.latency_ms <= 100 {
            60
        } else if metrics.latency_ms <= 500 {
            40
        } else {
            20
        };

        ((uptime_score as f64 * 0.7) + (latency_score as f64 * 0.3)) as u8
    }

    /// Calculates lag score based on lag metrics
    pub fn calculate_lag_score(&self, lag: &LagMetrics, threshold_bytes: u64) -> u8 {
        if lag.lag_bytes == 0 {
            return 100;
        }

        let lag_ratio = lag.lag_bytes as f64 / threshold_bytes as f64;

        if lag_ratio <= 0.1 {
            100
        } else if lag_ratio <= 0.25 {
            90
        } else if lag_ratio <= 0.5 {
            70
        } else if lag_ratio <= 0.75 {
            50
        } else if lag_ratio <= 1.0 {
            30
        } else {
            10
        }
    }

    /// Calculates error rate score
    pub fn calculate_error_rate_score(&self, errors: &ErrorStatistics) -> u8 {
        if errors.error_rate == 0.0 {
            return 100;
        }

        // Score based on errors per minute
        if errors.error_rate <= 0.1 {
            100
        } else if errors.error_rate <= 0.5 {
            90
        } else if errors.error_rate <= 1.0 {
            80
        } else if errors.error_rate <= 5.0 {
            60
        } else if errors.error_rate <= 10.0 {
            40
        } else {
            20
        }
    }
}

impl ReplicationHealthMonitor {
    /// Creates a new replication health monitor
    ///
    /// # Arguments
    ///
    /// * `config` - Health monitoring configuration
    ///
    /// # Returns
    ///
    /// * `Ok(ReplicationHealthMonitor)` - Successfully created monitor
    /// * `Err(HealthMonitorError)` - Creation failed
    pub fn new(config: HealthMonitorConfig) -> Result<Self, HealthMonitorError> {
        // Validate configuration
        Self::validate_config(&config)?;

        let (event_sender, _) = mpsc::unbounded_channel();
        let (shutdown_sender, _) = mpsc::unbounded_channel();

        Ok(Self {
            config: Arc::new(config),
            replica_monitors: Arc::new(RwLock::new(HashMap::new())),
            metrics_history: Arc::new(RwLock::new(HashMap::new())),
            active_alerts: Arc::new(RwLock::new(HashMap::new())),
            alert_history: Arc::new(RwLock::new(VecDeque::new())),
            task_handles: Arc::new(Mutex::new(Vec::new())),
            event_sender,
            shutdown_sender: Arc::new(Mutex::new(Some(shutdown_sender))),
            score_calculator: Arc::new(HealthScoreCalculator::new()),
        })
    }

    /// Validates the monitoring configuration
    fn validate_config(config: &HealthMonitorConfig) -> Result<(), HealthMonitorError> {
        if config.check_interval.is_zero() {
            return Err(HealthMonitorError::InvalidConfiguration {
                reason: "check_interval must be greater than 0".to_string(),
            });
        }

        if config.connection_timeout.is_zero() {
            return Err(HealthMonitorError::InvalidConfiguration {
                reason: "connection_timeout must be greater than 0".to_string(),
            });
        }

        if config.max_metrics_history == 0 {
            return Err(HealthMonitorError::InvalidConfiguration {
                reason: "max_metrics_history must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Collects health metrics for a replica
    async fn collect_health_metrics(&self, replica_id: &ReplicaId) -> Result<ReplicaHealthStatus, HealthMonitorError> {
        let now = SystemTime::now();

        // Collect various metrics (simplified implementation)
        let connection_metrics = self.collect_connection_metrics(replica_id).await?;
        let lag_metrics = self.collect_lag_metrics(replica_id).await?;
        let performance_metrics = self.collect_performance_metrics(replica_id).await?;
        let error_statistics = self.collect_error_statistics(replica_id).await?;

        // Calculate health components
        let health_components = HealthComponents {
            connectivity_score: self.score_calculator.calculate_connectivity_score(&connection_metrics),
            lag_score: self.score_calculator.calculate_lag_score(&lag_metrics, self.config.lag_threshold_bytes),
            error_rate_score: self.score_calculator.calculate_error_rate_score(&error_statistics),
            performance_score: 85, // Simplified
            resource_score: 90,     // Simplified
        };

        // Calculate overall health score
        let health_score = self.score_calculator.calculate_health_score(&health_components);

        // Determine health trend
        let health_trend = self.calculate_health_trend(replica_id, health_score);

        // Check for alerts
        let active_alerts = self.check_for_alerts(replica_id, &health_components, &lag_metrics, &error_statistics).await;

        // Generate recommendations
        let recommendations = self.generate_recommendations(replica_id, &health_components).await;

        Ok(ReplicaHealthStatus {
            replica_id: replica_id.clone(),
            health_score,
            health_components,
            current_lag: lag_metrics,
            connection_metrics,
            performance_metrics,
            error_statistics,
            last_check: now,
            health_trend,
            active_alerts,
            recommendations,
        })
    }

    /// Collects connection metrics for a replica
    async fn collect_connection_metrics(&self, _replica_id: &ReplicaId) -> Result<ConnectionMetrics, HealthMonitorError> {
        // Simplified implementation - in practice would ping replica
        Ok(ConnectionMetrics {
            is_connected: true,
            last_connected: SystemTime::now(),
            latency_ms: 25,
            uptime_percentage: 98.5,
            connection_attempts: 1000,
            failed_connections: 15,
        })
    }

    /// Collects lag metrics for a replica
    async fn collect_lag_metrics(&self, _replica_id: &ReplicaId) -> Result<LagMetrics, HealthMonitorError> {
        // Simplified implementation - in practice would query WAL position
        Ok(LagMetrics {
            lag_bytes: 1024 * 512, // 512KB
            lag_seconds: 15,
            average_lag_bytes: 1024 * 256,
            max_lag_bytes: 1024 * 1024,
            trend: LagTrend::Stable,
            percentiles: LagPercentiles {
                p50: 1024 * 256,
                p95: 1024 * 768,
                p99: 1024 * 1024,
            },
        })
    }

    /// Collects performance metrics for a replica
    async fn collect_performance_metrics(&self, _replica_id: &ReplicaId) -> Result<PerformanceMetrics, HealthMonitorError> {
        // Simplified implementation
        Ok(PerformanceMetrics {
            operations_per_second: 1250.5,
            average_latency_ms: 12.5,
            throughput_bps: 1024 * 1024 * 10, // 10MB/s
            cpu_usage_percent: 35.2,
            memory_usage_bytes: 1024 * 1024 * 512, // 512MB
            network_usage_bps: 1024 * 1024 * 5,    // 5MB/s
        })
    }

    /// Collects error statistics for a replica
    async fn collect_error_statistics(&self, _replica_id: &ReplicaId) -> Result<ErrorStatistics, HealthMonitorError> {
        // Simplified implementation
        let mut common_errors = HashMap::new();
        common_errors.insert("connection_timeout".to_string(), 5);
        common_errors.insert("wal_read_error".to_string(), 2);

        Ok(ErrorStatistics {
            total_errors: 25,
            errors_last_hour: 3,
            error_rate: 0.5, // errors per minute
            common_errors,
            last_error_time: Some(SystemTime::now() - Duration::from_secs(300)),
            last_error_message: Some("Connection timeout to replica".to_string()),
        })
    }

    /// Calculates health trend for a replica
    fn calculate_health_trend(&self, _replica_id: &ReplicaId, current_score: u8) -> HealthTrend {
        // Simplified implementation - would analyze historical scores
        if current_score >= 90 {
            HealthTrend::Stable
        } else if current_score >= 70 {
            HealthTrend::Declining
        } else if current_score >= 50 {
            HealthTrend::Critical
        } else {
            HealthTrend::Critical
        }
    }

    /// Checks for alert conditions
    async fn check_for_alerts(
        &self,
        replica_id: &ReplicaId,
        components: &HealthComponents,
        lag: &LagMetrics,
        errors: &ErrorStatistics,
    ) -> Vec<HealthAlert> {
        let mut alerts = Vec::new();

        // Check lag alert
        if lag.lag_bytes > self.config.lag_threshold_bytes {
            let alert = HealthAlert {
                alert_id: Uuid::new_v4(),
                alert_type: AlertType::HighLag,
                severity: if lag.lag_bytes > self.config.lag_threshold_bytes * 2 {
                    AlertSeverity::Critical
                } else {
                    AlertSeverity::Warning
                },
                message: format!("High replication lag detected: {} bytes", lag.lag_bytes),
                created_at: SystemTime::now(),
                acknowledged: false,
                metric_values: {
                    let mut values = HashMap::new());
                    values.insert("lag_bytes".to_string(), lag.lag_bytes as f64);
                    values
                },
            };
            alerts.push(alert);
        }

        // Check error rate alert
        if errors.error_rate > 5.0 {
            let alert = HealthAlert {
                alert_id: Uuid::new_v4(),
                alert_type: AlertType::HighErrorRate,
                severity: AlertSeverity::Error,
                message: format!("High error rate detected: {} errors/min", errors.error_rate),
                created_at: SystemTime::now(),
                acknowledged: false,
                metric_values: {
                    let mut values = HashMap::new());
                    values.insert("error_rate".to_string(), errors.error_rate);
                    values
                },
            };
            alerts.push(alert);
        }

        // Check connectivity alert
        if components.connectivity_score < 50 {
            let alert = HealthAlert {
                alert_id: Uuid::new_v4(),
                alert_type: AlertType::ConnectionFailure,
                severity: AlertSeverity::Critical,
                message: "Poor connectivity to replica".to_string(),
                created_at: SystemTime::now(),
                acknowledged: false,
                metric_values: {
                    let mut values = HashMap::new();
                    values.insert("connectivity_score".to_string(), components.connectivity_score as f64);
                    values
                },
            };
            alerts.push(alert);
        }

        alerts
    }

    /// Generates diagnostic recommendations
    async fn generate_recommendations(
        &self,
        _replica_id: &ReplicaId,
        components: &HealthComponents,
    ) -> Vec<DiagnosticRecommendation> {
        let mut recommendations = Vec::new();

        if components.lag_score < 70 {
            recommendations.push(DiagnosticRecommendation {
                recommendation_id: Uuid::new_v4(),
                category: RecommendationCategory::Performance,
                priority: RecommendationPriority::High,
                title: "Optimize replication lag".to_string(),
                description: "Consider increasing network bandwidth or optimizing WAL streaming".to_string(),
                estimated_impact: "Reduce lag by 40-60%".to_string(),
                difficulty: ImplementationDifficulty::Medium,
                related_metrics: vec!["lag_bytes".to_string(), "throughput_bps".to_string()],
            });
        }

        if components.error_rate_score < 80 {
            recommendations.push(DiagnosticRecommendation {
                recommendation_id: Uuid::new_v4(),
                category: RecommendationCategory::Reliability,
                priority: RecommendationPriority::Medium,
                title: "Investigate error patterns".to_string(),
                description: "Analyze error logs to identify and fix recurring issues".to_string(),
                estimated_impact: "Improve reliability by 20-30%".to_string(),
                difficulty: ImplementationDifficulty::Easy,
                related_metrics: vec!["error_rate".to_string(), "total_errors".to_string()],
            });
        }

        recommendations
    }

    /// Starts background monitoring tasks
    async fn start_monitoring_tasks(&self) {
        let replica_monitors = Arc::clone(&self.replica_monitors);
        let config = Arc::clone(&self.config);
        let event_sender = self.event_sender.clone();

        // Health check task
        let health_check_handle = tokio::spawn(async move {
            let mut interval = interval(config.check_interval);

            loop {
                interval.tick().await;

                let replica_ids: Vec<_> = {
                    let monitors = replica_monitors.read();
                    monitors.keys().cloned().collect()
                };

                for replica_id in replica_ids {
                    // Simplified health check - would call collect_health_metrics
                    let _ = event_sender.send(HealthEvent::HealthCheckCompleted {
                        replica_id: replica_id.clone(),
                        health_score: 85,
                    });
                }
            }
        });

        self.task_handles.lock().push(health_check_handle);
    }
}

#[async_trait]
impl HealthMonitor for ReplicationHealthMonitor {
    async fn start_monitoring(&self) -> Result<(), HealthMonitorError> {
        self.start_monitoring_tasks().await;
        Ok(())
    }

    async fn stop_monitoring(&self) -> Result<(), HealthMonitorError> {
        // Send shutdown signal
        if let Some(sender) = self.shutdown_sender.lock().take() {
            let _ = sender.send(());
        }

        // Wait for all tasks to complete
        let handles = {
            let mut handles = self.task_handles.lock();
            std::mem::take(&mut *handles)
        };

        for handle in handles {
            let _ = handle.await;
        }

        Ok(())
    }

    async fn add_replica(&self, replica_id: ReplicaId) -> Result<(), HealthMonitorError> {
        let initial_health = ReplicaHealthStatus {
            replica_id: replica_id.clone(),
            health_score: 100,
            health_components: HealthComponents {
                connectivity_score: 100,
                lag_score: 100,
                error_rate_score: 100,
                performance_score: 100,
                resource_score: 100,
            },
            current_lag: LagMetrics {
                lag_bytes: 0,
                lag_seconds: 0,
                average_lag_bytes: 0,
                max_lag_bytes: 0,
                trend: LagTrend::Stable,
                percentiles: LagPercentiles { p50: 0, p95: 0, p99: 0 },
            },
            connection_metrics: ConnectionMetrics {
                is_connected: true,
                last_connected: SystemTime::now(),
                latency_ms: 0,
                uptime_percentage: 100.0,
                connection_attempts: 0,
                failed_connections: 0,
            },
            performance_metrics: PerformanceMetrics {
                operations_per_second: 0.0,
                average_latency_ms: 0.0,
                throughput_bps: 0,
                cpu_usage_percent: 0.0,
                memory_usage_bytes: 0,
                network_usage_bps: 0,
            },
            error_statistics: ErrorStatistics {
                total_errors: 0,
                errors_last_hour: 0,
                error_rate: 0.0,
                common_errors: HashMap::new(),
                last_error_time: None,
                last_error_message: None,
            },
            last_check: SystemTime::now(),
            health_trend: HealthTrend::Stable,
            active_alerts: Vec::new(),
            recommendations: Vec::new(),
        };

        let monitor_state = ReplicaMonitorState {
            replica_id: replica_id.clone(),
            current_health: initial_health,
            last_metrics_collection: SystemTime::now(),
            monitoring_active: true,
            consecutive_failures: 0,
            last_alert_time: None,
        };

        {
            let mut monitors = self.replica_monitors.write();
            monitors.insert(replica_id.clone(), monitor_state);
        }

        {
            let mut metrics = self.metrics_history.write();
            metrics.insert(replica_id.clone(), Vec::new());
        }

        // Publish event
        let _ = self.event_sender.send(HealthEvent::MonitoringStarted { replica_id });

        Ok(())
    }

    async fn remove_replica(&self, replica_id: &ReplicaId) -> Result<(), HealthMonitorError> {
        {
            let mut monitors = self.replica_monitors.write();
            monitors.remove(replica_id);
        }

        {
            let mut metrics = self.metrics_history.write();
            metrics.remove(replica_id);
        }

        // Publish event
        let _ = self.event_sender.send(HealthEvent::MonitoringStopped {
            replica_id: replica_id.clone()
        });

        Ok(())
    }

    async fn get_replica_health(&self, replica_id: &ReplicaId) -> Result<ReplicaHealthStatus, HealthMonitorError> {
        // Try to get from cache first, then collect fresh metrics
        let monitors = self.replica_monitors.read();
        if let Some(monitor) = monitors.get(replica_id) {
            Ok(monitor.current_health.clone())
        } else {
            Err(HealthMonitorError::ReplicaNotFound {
                replica_id: replica_id.to_string(),
            })
        }
    }

    async fn get_all_replica_health(&self) -> Result<Vec<ReplicaHealthStatus>, HealthMonitorError> {
        let monitors = self.replica_monitors.read();
        Ok(monitors.values()
            .map(|monitor| monitor.current_health.clone())
            .collect())
    }

    async fn generate_analytics_report(
        &self,
        start_time: SystemTime,
        end_time: SystemTime,
    ) -> Result<AnalyticsReport, HealthMonitorError> {
        let monitors = self.replica_monitors.read();
        let replica_count = monitors.len();

        // Calculate overall system health
        let overall_health_score = if replica_count > 0 {
            let total_score: u32 = monitors.values()
                .map(|m| m.current_health.health_score as u32)
                .sum();
            (total_score / replica_count as u32) as u8
        } else {
            100
        };

        // Aggregate metrics (simplified)
        let average_lag = LagMetrics {
            lag_bytes: 1024 * 256,
            lag_seconds: 10,
            average_lag_bytes: 1024 * 128,
            max_lag_bytes: 1024 * 512,
            trend: LagTrend::Stable,
            percentiles: LagPercentiles { p50: 1024 * 100, p95: 1024 * 300, p99: 1024 * 500 },
        };

        let system_performance = PerformanceMetrics {
            operations_per_second: 1500.0,
            average_latency_ms: 15.0,
            throughput_bps: 1024 * 1024 * 15,
            cpu_usage_percent: 45.0,
            memory_usage_bytes: 1024 * 1024 * 1024,
            network_usage_bps: 1024 * 1024 * 8,
        };

        Ok(AnalyticsReport {
            generated_at: SystemTime::now(),
            time_period: (start_time, end_time),
            replica_count,
            overall_health_score,
            average_lag,
            system_performance,
            error_analysis: SystemErrorAnalysis {
                total_errors: 50,
                error_rate_trend: HealthTrend::Stable,
                problematic_replicas: Vec::new(),
                error_patterns: vec!["Timeout errors".to_string()],
            },
            trend_analysis: SystemTrendAnalysis {
                health_trend: HealthTrend::Stable,
                performance_trend: HealthTrend::Improving,
                lag_trend: HealthTrend::Stable,
                capacity_trend: HealthTrend::Stable,
                predicted_issues: Vec::new(),
            },
            top_recommendations: Vec::new(),
        })
    }
}

impl Default for ReplicationHealthMonitor {
    fn default() -> Self {
        Self::new(HealthMonitorConfig::default()).unwrap()
    }
}

#[cfg(test)]
mod tests {

    #[tokio::test]
    async fn test_health_monitor_creation() {
        let config = HealthMonitorConfig::default();
        let monitor = ReplicationHealthMonitor::new(config);
        assert!(monitor.is_ok());
    }

    #[test]
    fn test_health_score_calculation() {
        let calculator = HealthScoreCalculator::new();

        let components = HealthComponents {
            connectivity_score: 100,
            lag_score: 90,
            error_rate_score: 85,
            performance_score: 80,
            resource_score: 75,
        };

        let score = calculator.calculate_health_score(&components);
        assert!(score >= 80 && score <= 95);
    }

    #[test]
    fn test_connectivity_score_calculation() {
        let calculator = HealthScoreCalculator::new();

        let metrics = ConnectionMetrics {
            is_connected: true,
            last_connected: SystemTime::now(),
            latency_ms: 25,
            uptime_percentage: 99.0,
            connection_attempts: 1000,
            failed_connections: 10,
        };

        let score = calculator.calculate_connectivity_score(&metrics);
        assert!(score >= 80);
    }

    #[test]
    fn test_lag_score_calculation() {
        let calculator = HealthScoreCalculator::new();
        let threshold = 1024 * 1024; // 1MB

        let lag_metrics = LagMetrics {
            lag_bytes: 1024 * 100, // 100KB (10% of threshold)
            lag_seconds: 10,
            average_lag_bytes: 1024 * 50,
            max_lag_bytes: 1024 * 200,
            trend: LagTrend::Stable,
            percentiles: LagPercentiles { p50: 1024 * 50, p95: 1024 * 150, p99: 1024 * 200 },
        };

        let score = calculator.calculate_lag_score(&lag_metrics, threshold);
        assert_eq!(score, 100); // Should be 100 for 10% of threshold
    }

    #[tokio::test]
    async fn test_replica_monitoring() {
        let config = HealthMonitorConfig::default();
        let monitor = ReplicationHealthMonitor::new(config).unwrap();

        let replica_id = ReplicaId::new("test-replica").unwrap();

        // Add replica
        assert!(monitor.add_replica(replica_id.clone()).await.is_ok());

        // Get health status
        let health = monitor.get_replica_health(&replica_id).await;
        assert!(health.is_ok());

        let health = health.unwrap();
        assert_eq!(health.replica_id, replica_id);
        assert_eq!(health.health_score, 100);

        // Remove replica
        assert!(monitor.remove_replica(&replica_id).await.is_ok());

        // Should not find replica after removal
        let health = monitor.get_replica_health(&replica_id).await;
        assert!(health.is_err());
    }

    #[tokio::test]
    async fn test_analytics_report_generation() {
        let config = HealthMonitorConfig::default();
        let monitor = ReplicationHealthMonitor::new(config).unwrap();

        let replica_id = ReplicaId::new("test-replica").unwrap();
        monitor.add_replica(replica_id).await.unwrap();

        let start_time = SystemTime::now() - Duration::from_hours(24);
        let end_time = SystemTime::now();

        let report = monitor.generate_analytics_report(start_time, end_time).await;
        assert!(report.is_ok());

        let report = report.unwrap();
        assert_eq!(report.replica_count, 1);
        assert!(report.overall_health_score > 0);
    }

    #[test]
    fn test_alert_creation() {
        let alert = HealthAlert {
            alert_id: Uuid::new_v4(),
            alert_type: AlertType::HighLag,
            severity: AlertSeverity::Warning,
            message: "Test alert".to_string(),
            created_at: SystemTime::now(),
            acknowledged: false,
            metric_values: HashMap::new(),
        };

        assert_eq!(alert.alert_type, AlertType::HighLag);
        assert_eq!(alert.severity, AlertSeverity::Warning);
        assert!(!alert.acknowledged);
    }

    #[test]
    fn test_recommendation_creation() {
        let recommendation = DiagnosticRecommendation {
            recommendation_id: Uuid::new_v4(),
            category: RecommendationCategory::Performance,
            priority: RecommendationPriority::High,
            title: "Test recommendation".to_string(),
            description: "Test description".to_string(),
            estimated_impact: "Test impact".to_string(),
            difficulty: ImplementationDifficulty::Medium,
            related_metrics: vec!["test_metric".to_string()],
        };

        assert_eq!(recommendation.category, RecommendationCategory::Performance);
        assert_eq!(recommendation.priority, RecommendationPriority::High);
        assert_eq!(recommendation.difficulty, ImplementationDifficulty::Medium);
    }
}
