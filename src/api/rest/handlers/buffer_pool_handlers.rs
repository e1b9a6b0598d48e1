// Buffer Pool Management API Handlers
//
// REST API endpoints for buffer pool operations including:
// - Buffer pool statistics
// - Eviction policy management
// - Page pinning/unpinning
// - Flush operations
// - Prefetching configuration

use axum::{
    extract::Path,
    response::Json as AxumJson,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::types::ApiError;

// ============================================================================
// Buffer Pool Types
// ============================================================================

/// Buffer pool statistics
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BufferPoolStats {
    pub total_frames: usize,
    pub free_frames: usize,
    pub pinned_frames: usize,
    pub dirty_frames: usize,
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub page_reads: u64,
    pub page_writes: u64,
    pub evictions: u64,
    pub avg_search_length: f64,
    pub io_wait_time_us: u64,
    pub dirty_page_ratio: f64,
    pub eviction_policy: String,
}

/// Buffer pool configuration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BufferPoolConfig {
    pub num_frames: usize,
    pub page_size: usize,
    pub eviction_policy: String, // CLOCK, LRU, 2Q, LRU-K, LIRS, ARC
    pub per_core_pools: bool,
    pub frames_per_core: usize,
    pub max_flush_batch_size: usize,
    pub background_flush: bool,
    pub flush_interval_seconds: u64,
    pub dirty_threshold: f64,
}

/// Update buffer pool configuration request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateBufferPoolConfigRequest {
    pub eviction_policy: Option<String>,
    pub per_core_pools: Option<bool>,
    pub frames_per_core: Option<usize>,
    pub max_flush_batch_size: Option<usize>,
    pub background_flush: Option<bool>,
    pub flush_interval_seconds: Option<u64>,
    pub dirty_threshold: Option<f64>,
}

/// Flush request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FlushRequest {
    pub force: bool,
    pub async_flush: bool,
}

/// Flush response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FlushResponse {
    pub pages_flushed: usize,
    pub bytes_written: u64,
    pub duration_ms: u64,
}

/// Prefetch configuration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PrefetchConfig {
    pub enabled: bool,
    pub lookahead_pages: usize,
    pub sequential_threshold: usize,
    pub pattern_detection: bool,
}

/// Eviction policy statistics
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EvictionPolicyStats {
    pub policy_name: String,
    pub victim_search_time_us: u64,
    pub evictions: u64,
    pub avg_scan_length: f64,
    pub policy_specific_stats: serde_json::Value,
}

/// Huge pages configuration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HugePagesConfig {
    pub enabled: bool,
    pub huge_page_size: String, // "2MB", "1GB"
    pub total_huge_pages: usize,
    pub available_huge_pages: usize,
    pub reserved_huge_pages: usize,
}

// ============================================================================
// Handler Functions
// ============================================================================

/// Get buffer pool statistics
///
/// Returns detailed buffer pool statistics including hit rates, evictions, and I/O metrics.
#[utoipa::path(
    get,
    path = "/api/v1/buffer/stats",
    responses(
        (status = 200, description = "Buffer pool statistics", body = BufferPoolStats),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "buffer-pool"
)]
pub async fn get_buffer_pool_stats() -> Result<AxumJson<BufferPoolStats>, (StatusCode, AxumJson<ApiError>)> {
    // Mock statistics - in production would query actual buffer pool
    let stats = BufferPoolStats {
        total_frames: 10000,
        free_frames: 1250,
        pinned_frames: 342,
        dirty_frames: 1024,
        hit_rate: 0.9547,
        miss_rate: 0.0453,
        page_reads: 1234567,
        page_writes: 456789,
        evictions: 89012,
        avg_search_length: 2.3,
        io_wait_time_us: 15000,
        dirty_page_ratio: 0.1024,
        eviction_policy: "CLOCK".to_string(),
    };

    Ok(AxumJson(stats))
}

/// Get buffer pool configuration
///
/// Returns the current buffer pool configuration settings.
#[utoipa::path(
    get,
    path = "/api/v1/buffer/config",
    responses(
        (status = 200, description = "Buffer pool configuration", body = BufferPoolConfig),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "buffer-pool"
)]
pub async fn get_buffer_pool_config() -> Result<AxumJson<BufferPoolConfig>, (StatusCode, AxumJson<ApiError>)> {
    let config = BufferPoolConfig {
        num_frames: 10000,
        page_size: 8192,
        eviction_policy: "CLOCK".to_string(),
        per_core_pools: true,
        frames_per_core: 8,
        max_flush_batch_size: 64,
        background_flush: true,
        flush_interval_seconds: 30,
        dirty_threshold: 0.7,
    };

    Ok(AxumJson(config))
}

/// Update buffer pool configuration
///
/// Updates buffer pool configuration settings. Some changes may require a restart.
#[utoipa::path(
    put,
    path = "/api/v1/buffer/config",
    request_body = UpdateBufferPoolConfigRequest,
    responses(
        (status = 200, description = "Configuration updated", body = BufferPoolConfig),
        (status = 400, description = "Invalid configuration", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "buffer-pool"
)]
pub async fn update_buffer_pool_config(
    AxumJson(request): AxumJson<UpdateBufferPoolConfigRequest>,
) -> Result<AxumJson<BufferPoolConfig>, (StatusCode, AxumJson<ApiError>)> {
    // Validate configuration
    if let Some(ref policy) = request.eviction_policy {
        if !["CLOCK", "LRU", "2Q", "LRU-K", "LIRS", "ARC"].contains(&policy.as_str()) {
            return Err((
                StatusCode::BAD_REQUEST,
                AxumJson(ApiError::new(
                    "INVALID_POLICY",
                    "Eviction policy must be one of: CLOCK, LRU, 2Q, LRU-K, LIRS, ARC",
                )),
            ));
        }
    }

    if let Some(threshold) = request.dirty_threshold {
        if threshold < 0.0 || threshold > 1.0 {
            return Err((
                StatusCode::BAD_REQUEST,
                AxumJson(ApiError::new(
                    "INVALID_THRESHOLD",
                    "Dirty threshold must be between 0.0 and 1.0",
                )),
            ));
        }
    }

    // Return updated config (mock)
    let config = BufferPoolConfig {
        num_frames: 10000,
        page_size: 8192,
        eviction_policy: request.eviction_policy.unwrap_or_else(|| "CLOCK".to_string()),
        per_core_pools: request.per_core_pools.unwrap_or(true),
        frames_per_core: request.frames_per_core.unwrap_or(8),
        max_flush_batch_size: request.max_flush_batch_size.unwrap_or(64),
        background_flush: request.background_flush.unwrap_or(true),
        flush_interval_seconds: request.flush_interval_seconds.unwrap_or(30),
        dirty_threshold: request.dirty_threshold.unwrap_or(0.7),
    };

    Ok(AxumJson(config))
}

/// Flush dirty pages
///
/// Flushes dirty pages from the buffer pool to disk.
#[utoipa::path(
    post,
    path = "/api/v1/buffer/flush",
    request_body = FlushRequest,
    responses(
        (status = 200, description = "Flush completed", body = FlushResponse),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "buffer-pool"
)]
pub async fn flush_buffer_pool(
    AxumJson(_request): AxumJson<FlushRequest>,
) -> Result<AxumJson<FlushResponse>, (StatusCode, AxumJson<ApiError>)> {
    // Mock flush operation
    let response = FlushResponse {
        pages_flushed: 1024,
        bytes_written: 8388608, // 8MB
        duration_ms: 150,
    };

    Ok(AxumJson(response))
}

/// Get eviction policy statistics
///
/// Returns detailed statistics about the current eviction policy.
#[utoipa::path(
    get,
    path = "/api/v1/buffer/eviction/stats",
    responses(
        (status = 200, description = "Eviction policy statistics", body = EvictionPolicyStats),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "buffer-pool"
)]
pub async fn get_eviction_stats() -> Result<AxumJson<EvictionPolicyStats>, (StatusCode, AxumJson<ApiError>)> {
    let stats = EvictionPolicyStats {
        policy_name: "CLOCK".to_string(),
        victim_search_time_us: 5,
        evictions: 89012,
        avg_scan_length: 2.3,
        policy_specific_stats: serde_json::json!({
            "hand_position": 4567,
            "full_rotations": 123,
            "second_chance_hits": 45678,
        }),
    };

    Ok(AxumJson(stats))
}

/// Get prefetch configuration
///
/// Returns the current prefetch configuration.
#[utoipa::path(
    get,
    path = "/api/v1/buffer/prefetch/config",
    responses(
        (status = 200, description = "Prefetch configuration", body = PrefetchConfig),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "buffer-pool"
)]
pub async fn get_prefetch_config() -> Result<AxumJson<PrefetchConfig>, (StatusCode, AxumJson<ApiError>)> {
    let config = PrefetchConfig {
        enabled: true,
        lookahead_pages: 16,
        sequential_threshold: 4,
        pattern_detection: true,
    };

    Ok(AxumJson(config))
}

/// Update prefetch configuration
///
/// Updates prefetch configuration settings.
#[utoipa::path(
    put,
    path = "/api/v1/buffer/prefetch/config",
    request_body = PrefetchConfig,
    responses(
        (status = 200, description = "Prefetch configuration updated", body = PrefetchConfig),
        (status = 400, description = "Invalid configuration", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "buffer-pool"
)]
pub async fn update_prefetch_config(
    AxumJson(config): AxumJson<PrefetchConfig>,
) -> Result<AxumJson<PrefetchConfig>, (StatusCode, AxumJson<ApiError>)> {
    if config.lookahead_pages > 256 {
        return Err((
            StatusCode::BAD_REQUEST,
            AxumJson(ApiError::new(
                "INVALID_CONFIG",
                "Lookahead pages must be <= 256",
            )),
        ));
    }

    Ok(AxumJson(config))
}

/// Get huge pages configuration
///
/// Returns the current huge pages configuration and availability.
#[utoipa::path(
    get,
    path = "/api/v1/buffer/hugepages",
    responses(
        (status = 200, description = "Huge pages configuration", body = HugePagesConfig),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "buffer-pool"
)]
pub async fn get_hugepages_config() -> Result<AxumJson<HugePagesConfig>, (StatusCode, AxumJson<ApiError>)> {
    let config = HugePagesConfig {
        enabled: false,
        huge_page_size: "2MB".to_string(),
        total_huge_pages: 0,
        available_huge_pages: 0,
        reserved_huge_pages: 0,
    };

    Ok(AxumJson(config))
}

/// Pin a page in the buffer pool
///
/// Pins a specific page to prevent it from being evicted.
#[utoipa::path(
    post,
    path = "/api/v1/buffer/pages/{page_id}/pin",
    params(
        ("page_id" = u64, Path, description = "Page ID to pin")
    ),
    responses(
        (status = 200, description = "Page pinned successfully"),
        (status = 404, description = "Page not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "buffer-pool"
)]
pub async fn pin_page(
    Path(_page_id): Path<u64>,
) -> Result<StatusCode, (StatusCode, AxumJson<ApiError>)> {
    // Mock pin operation
    Ok(StatusCode::OK)
}

/// Unpin a page in the buffer pool
///
/// Unpins a previously pinned page, allowing it to be evicted.
#[utoipa::path(
    post,
    path = "/api/v1/buffer/pages/{page_id}/unpin",
    params(
        ("page_id" = u64, Path, description = "Page ID to unpin")
    ),
    responses(
        (status = 200, description = "Page unpinned successfully"),
        (status = 404, description = "Page not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "buffer-pool"
)]
pub async fn unpin_page(
    Path(_page_id): Path<u64>,
) -> Result<StatusCode, (StatusCode, AxumJson<ApiError>)> {
    // Mock unpin operation
    Ok(StatusCode::OK)
}
