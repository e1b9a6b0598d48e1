// GraphQL Query Execution Subscriptions
//
// Real-time GraphQL subscriptions for query execution monitoring

use async_graphql::{
    Context, Enum, Object, SimpleObject, Subscription,
};
use futures_util::{stream::Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use super::types::*;
use super::models::RowType;
use super::GraphQLEngine;

// ============================================================================
// Query Execution Subscriptions
// ============================================================================

pub struct QueryExecutionSubscription;

#[Subscription]
impl QueryExecutionSubscription {
    /// Subscribe to query progress updates
    ///
    /// Streams real-time progress updates for a running query including:
    /// - Rows scanned
    /// - Percentage complete
    /// - Current operation
    /// - Time elapsed and estimated remaining
    async fn query_progress<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        query_id: String,
    ) -> impl Stream<Item = QueryProgressUpdate> + 'ctx {
        let engine = ctx.data::<Arc<GraphQLEngine>>().unwrap().clone();
        let (tx, rx) = broadcast::channel(1000);

        // Register subscription
        engine.register_query_progress_subscription(&query_id, tx).await;

        BroadcastStream::new(rx).filter_map(|result| async move {
            result.ok()
        })
    }

    /// Subscribe to execution plan updates
    ///
    /// Streams execution plan node updates as the query executes,
    /// including estimated vs. actual costs and row counts
    async fn execution_plan_stream<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        query_id: String,
    ) -> impl Stream<Item = ExecutionPlanNode> + 'ctx {
        let engine = ctx.data::<Arc<GraphQLEngine>>().unwrap().clone();
        let (tx, rx) = broadcast::channel(1000);

        // Register subscription
        engine.register_execution_plan_subscription(&query_id, tx).await;

        BroadcastStream::new(rx).filter_map(|result| async move {
            result.ok()
        })
    }

    /// Subscribe to result set chunks
    ///
    /// Streams query results in manageable chunks for large result sets
    async fn result_chunks<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        query_id: String,
        chunk_size: Option<i32>,
    ) -> impl Stream<Item = ResultChunk> + 'ctx {
        let engine = ctx.data::<Arc<GraphQLEngine>>().unwrap().clone();
        let size = chunk_size.unwrap_or(1000);

        async_stream::stream! {
            match engine.stream_query_results(&query_id, size as usize).await {
                Ok(mut stream) => {
                    while let Some(chunk) = stream.next().await {
                        yield chunk;
                    }
                }
                Err(_) => {}
            }
        }
    }

    /// Subscribe to optimizer hint events
    ///
    /// Streams optimizer hint application events and their effects
    async fn optimizer_hints<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        query_id: String,
    ) -> impl Stream<Item = OptimizerHintEvent> + 'ctx {
        let engine = ctx.data::<Arc<GraphQLEngine>>().unwrap().clone();
        let (tx, rx) = broadcast::channel(100);

        engine.register_optimizer_hint_subscription(&query_id, tx).await;

        BroadcastStream::new(rx).filter_map(|result| async move {
            result.ok()
        })
    }

    /// Subscribe to plan change events
    ///
    /// Streams events when the query optimizer changes the execution plan
    async fn plan_changes<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        query_id: String,
    ) -> impl Stream<Item = PlanChangeEvent> + 'ctx {
        let engine = ctx.data::<Arc<GraphQLEngine>>().unwrap().clone();
        let (tx, rx) = broadcast::channel(100);

        engine.register_plan_change_subscription(&query_id, tx).await;

        BroadcastStream::new(rx).filter_map(|result| async move {
            result.ok()
        })
    }

    /// Subscribe to CTE evaluation events
    ///
    /// Streams Common Table Expression evaluation progress
    async fn cte_evaluation<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        query_id: String,
    ) -> impl Stream<Item = CteEvaluationEvent> + 'ctx {
        let engine = ctx.data::<Arc<GraphQLEngine>>().unwrap().clone();
        let (tx, rx) = broadcast::channel(100);

        engine.register_cte_evaluation_subscription(&query_id, tx).await;

        BroadcastStream::new(rx).filter_map(|result| async move {
            result.ok()
        })
    }

    /// Subscribe to parallel worker events
    ///
    /// Streams parallel execution worker progress and status
    async fn parallel_workers<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        query_id: String,
    ) -> impl Stream<Item = ParallelWorkerEvent> + 'ctx {
        let engine = ctx.data::<Arc<GraphQLEngine>>().unwrap().clone();
        let (tx, rx) = broadcast::channel(1000);

        engine.register_parallel_worker_subscription(&query_id, tx).await;

        BroadcastStream::new(rx).filter_map(|result| async move {
            result.ok()
        })
    }

    /// Subscribe to adaptive optimization events
    ///
    /// Streams adaptive execution corrections and plan adjustments
    async fn adaptive_optimization<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        query_id: String,
    ) -> impl Stream<Item = AdaptiveOptimizationEvent> + 'ctx {
        let engine = ctx.data::<Arc<GraphQLEngine>>().unwrap().clone();
        let (tx, rx) = broadcast::channel(100);

        engine.register_adaptive_optimization_subscription(&query_id, tx).await;

        BroadcastStream::new(rx).filter_map(|result| async move {
            result.ok()
        })
    }

    /// Subscribe to query cost estimates
    ///
    /// Streams query optimizer cost estimates at regular intervals
    async fn cost_estimates<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        interval_seconds: Option<i32>,
    ) -> impl Stream<Item = CostEstimate> + 'ctx {
        let engine = ctx.data::<Arc<GraphQLEngine>>().unwrap().clone();
        let interval = Duration::from_secs(interval_seconds.unwrap_or(5) as u64);

        async_stream::stream! {
            let mut interval_timer = tokio::time::interval(interval);
            loop {
                interval_timer.tick().await;

                match engine.get_active_query_costs().await {
                    Ok(estimates) => {
                        for estimate in estimates {
                            yield estimate;
                        }
                    }
                    Err(_) => continue,
                }
            }
        }
    }

    /// Subscribe to query compilation events
    ///
    /// Streams query parsing, planning, and optimization events
    async fn query_compilation<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        query_id: String,
    ) -> impl Stream<Item = QueryCompilationEvent> + 'ctx {
        let engine = ctx.data::<Arc<GraphQLEngine>>().unwrap().clone();
        let (tx, rx) = broadcast::channel(100);

        engine.register_query_compilation_subscription(&query_id, tx).await;

        BroadcastStream::new(rx).filter_map(|result| async move {
            result.ok()
        })
    }
}

// ============================================================================
// Event Types
// ============================================================================

/// Query progress update
#[derive(Clone, Debug)]
pub struct QueryProgressUpdate {
    pub query_id: String,
    pub rows_scanned: BigInt,
    pub rows_returned: BigInt,
    pub percentage_complete: f64,
    pub current_operation: String,
    pub elapsed_ms: BigInt,
    pub estimated_remaining_ms: Option<BigInt>,
    pub timestamp: DateTime,
}

#[Object]
impl QueryProgressUpdate {
    async fn query_id(&self) -> &str {
        &self.query_id
    }

    async fn rows_scanned(&self) -> &BigInt {
        &self.rows_scanned
    }

    async fn rows_returned(&self) -> &BigInt {
        &self.rows_returned
    }

    async fn percentage_complete(&self) -> f64 {
        self.percentage_complete
    }

    async fn current_operation(&self) -> &str {
        &self.current_operation
    }

    async fn elapsed_ms(&self) -> &BigInt {
        &self.elapsed_ms
    }

    async fn estimated_remaining_ms(&self) -> &Option<BigInt> {
        &self.estimated_remaining_ms
    }

    async fn timestamp(&self) -> &DateTime {
        &self.timestamp
    }
}

/// Execution plan node
#[derive(Clone, Debug)]
pub struct ExecutionPlanNode {
    pub query_id: String,
    pub node_type: String,
    pub node_index: i32,
    pub total_nodes: i32,
    pub estimated_cost: f64,
    pub estimated_rows: BigInt,
    pub actual_rows: Option<BigInt>,
    pub actual_time_ms: Option<f64>,
    pub details: String,
    pub timestamp: DateTime,
}

#[Object]
impl ExecutionPlanNode {
    async fn query_id(&self) -> &str {
        &self.query_id
    }

    async fn node_type(&self) -> &str {
        &self.node_type
    }

    async fn node_index(&self) -> i32 {
        self.node_index
    }

    async fn total_nodes(&self) -> i32 {
        self.total_nodes
    }

    async fn estimated_cost(&self) -> f64 {
        self.estimated_cost
    }

    async fn estimated_rows(&self) -> &BigInt {
        &self.estimated_rows
    }

    async fn actual_rows(&self) -> &Option<BigInt> {
        &self.actual_rows
    }

    async fn actual_time_ms(&self) -> Option<f64> {
        self.actual_time_ms
    }

    async fn details(&self) -> &str {
        &self.details
    }

    async fn timestamp(&self) -> &DateTime {
        &self.timestamp
    }
}

/// Result chunk
#[derive(SimpleObject, Clone, Debug)]
pub struct ResultChunk {
    pub query_id: String,
    pub chunk_index: i32,
    pub total_chunks: Option<i32>,
    pub rows: Vec<RowType>,
    pub has_more: bool,
    pub timestamp: DateTime,
}

/// Optimizer hint event
#[derive(Clone, Debug)]
pub struct OptimizerHintEvent {
    pub query_id: String,
    pub hint: String,
    pub applied: bool,
    pub effect: String,
    pub timestamp: DateTime,
}

#[Object]
impl OptimizerHintEvent {
    async fn query_id(&self) -> &str {
        &self.query_id
    }

    async fn hint(&self) -> &str {
        &self.hint
    }

    async fn applied(&self) -> bool {
        self.applied
    }

    async fn effect(&self) -> &str {
        &self.effect
    }

    async fn timestamp(&self) -> &DateTime {
        &self.timestamp
    }
}

/// Plan change event
#[derive(Clone, Debug)]
pub struct PlanChangeEvent {
    pub query_id: String,
    pub reason: String,
    pub old_plan_cost: f64,
    pub new_plan_cost: f64,
    pub plan_diff: String,
    pub timestamp: DateTime,
}

#[Object]
impl PlanChangeEvent {
    async fn query_id(&self) -> &str {
        &self.query_id
    }

    async fn reason(&self) -> &str {
        &self.reason
    }

    async fn old_plan_cost(&self) -> f64 {
        self.old_plan_cost
    }

    async fn new_plan_cost(&self) -> f64 {
        self.new_plan_cost
    }

    async fn plan_diff(&self) -> &str {
        &self.plan_diff
    }

    async fn timestamp(&self) -> &DateTime {
        &self.timestamp
    }
}

/// CTE evaluation event
#[derive(Clone, Debug)]
pub struct CteEvaluationEvent {
    pub query_id: String,
    pub cte_name: String,
    pub evaluation_type: CteEvaluationType,
    pub rows_produced: BigInt,
    pub evaluation_time_ms: f64,
    pub iterations: Option<i32>,
    pub timestamp: DateTime,
}

#[Object]
impl CteEvaluationEvent {
    async fn query_id(&self) -> &str {
        &self.query_id
    }

    async fn cte_name(&self) -> &str {
        &self.cte_name
    }

    async fn evaluation_type(&self) -> CteEvaluationType {
        self.evaluation_type
    }

    async fn rows_produced(&self) -> &BigInt {
        &self.rows_produced
    }

    async fn evaluation_time_ms(&self) -> f64 {
        self.evaluation_time_ms
    }

    async fn iterations(&self) -> Option<i32> {
        self.iterations
    }

    async fn timestamp(&self) -> &DateTime {
        &self.timestamp
    }
}

/// CTE evaluation type
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum CteEvaluationType {
    Materialized,
    Recursive,
    Inline,
}

/// Parallel worker event
#[derive(Clone, Debug)]
pub struct ParallelWorkerEvent {
    pub query_id: String,
    pub worker_id: i32,
    pub event_type: WorkerEventType,
    pub rows_processed: BigInt,
    pub data_partition: String,
    pub timestamp: DateTime,
}

#[Object]
impl ParallelWorkerEvent {
    async fn query_id(&self) -> &str {
        &self.query_id
    }

    async fn worker_id(&self) -> i32 {
        self.worker_id
    }

    async fn event_type(&self) -> WorkerEventType {
        self.event_type
    }

    async fn rows_processed(&self) -> &BigInt {
        &self.rows_processed
    }

    async fn data_partition(&self) -> &str {
        &self.data_partition
    }

    async fn timestamp(&self) -> &DateTime {
        &self.timestamp
    }
}

/// Worker event type
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum WorkerEventType {
    Started,
    Progress,
    Completed,
    Failed,
}

/// Adaptive optimization event
#[derive(Clone, Debug)]
pub struct AdaptiveOptimizationEvent {
    pub query_id: String,
    pub correction_type: String,
    pub detected_issue: String,
    pub action_taken: String,
    pub performance_impact: f64,
    pub timestamp: DateTime,
}

#[Object]
impl AdaptiveOptimizationEvent {
    async fn query_id(&self) -> &str {
        &self.query_id
    }

    async fn correction_type(&self) -> &str {
        &self.correction_type
    }

    async fn detected_issue(&self) -> &str {
        &self.detected_issue
    }

    async fn action_taken(&self) -> &str {
        &self.action_taken
    }

    async fn performance_impact(&self) -> f64 {
        self.performance_impact
    }

    async fn timestamp(&self) -> &DateTime {
        &self.timestamp
    }
}

/// Cost estimate
#[derive(SimpleObject, Clone, Debug)]
pub struct CostEstimate {
    pub query_id: String,
    pub total_cost: f64,
    pub cpu_cost: f64,
    pub io_cost: f64,
    pub network_cost: Option<f64>,
    pub estimated_time_ms: f64,
    pub timestamp: DateTime,
}

/// Query compilation event
#[derive(Clone, Debug)]
pub struct QueryCompilationEvent {
    pub query_id: String,
    pub phase: CompilationPhase,
    pub status: CompilationStatus,
    pub message: Option<String>,
    pub elapsed_ms: f64,
    pub timestamp: DateTime,
}

#[Object]
impl QueryCompilationEvent {
    async fn query_id(&self) -> &str {
        &self.query_id
    }

    async fn phase(&self) -> CompilationPhase {
        self.phase
    }

    async fn status(&self) -> CompilationStatus {
        self.status
    }

    async fn message(&self) -> &Option<String> {
        &self.message
    }

    async fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    async fn timestamp(&self) -> &DateTime {
        &self.timestamp
    }
}

/// Compilation phase
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum CompilationPhase {
    Parsing,
    Validation,
    Planning,
    Optimization,
    CodeGeneration,
}

/// Compilation status
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum CompilationStatus {
    Started,
    InProgress,
    Completed,
    Failed,
}
