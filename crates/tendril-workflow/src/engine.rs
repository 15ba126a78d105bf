//! Workflow engine: lifecycle tracking and sequential step execution.
//!
//! The engine owns an active-workflow map keyed by id. Distinct workflow
//! instances may execute concurrently; a single instance must not be
//! executed concurrently with itself. Terminal workflows are always
//! evicted from the map, so status queries for them report not-found.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tendril_core::{WorkflowError, WorkflowResult};
use uuid::Uuid;

use crate::context::WorkflowContext;
use crate::step::WorkflowStep;

/// Lifecycle state of a workflow instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowStatus::Pending => "PENDING",
            WorkflowStatus::Running => "RUNNING",
            WorkflowStatus::Completed => "COMPLETED",
            WorkflowStatus::Failed => "FAILED",
            WorkflowStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", name)
    }
}

/// Unique workflow instance identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkflowId(Uuid);

impl WorkflowId {
    /// Generate a fresh id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WorkflowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type StatusCallback = Arc<dyn Fn(WorkflowStatus) + Send + Sync>;
type StartCallback = Arc<dyn Fn() + Send + Sync>;
type CompleteCallback = Arc<dyn Fn(&WorkflowExecutionResult) + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&WorkflowError) + Send + Sync>;

/// Optional lifecycle observers for one workflow instance.
#[derive(Clone, Default)]
pub struct WorkflowCallbacks {
    pub on_start: Option<StartCallback>,
    pub on_complete: Option<CompleteCallback>,
    pub on_error: Option<ErrorCallback>,
    pub on_status_change: Option<StatusCallback>,
}

/// A workflow instance: named step sequence plus its seed context.
pub struct Workflow {
    pub(crate) id: WorkflowId,
    pub(crate) name: String,
    pub(crate) steps: Vec<Arc<dyn WorkflowStep>>,
    pub(crate) context: WorkflowContext,
    pub(crate) callbacks: WorkflowCallbacks,
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("steps", &self.steps.len())
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl Workflow {
    /// Start building a workflow.
    pub fn builder() -> crate::builder::WorkflowBuilder {
        crate::builder::WorkflowBuilder::new()
    }

    pub fn id(&self) -> WorkflowId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of steps in declaration order.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

/// The outcome of one workflow execution.
#[derive(Debug, Clone)]
pub struct WorkflowExecutionResult {
    pub workflow_id: WorkflowId,
    pub status: WorkflowStatus,
    /// Context as of the last successfully executed step
    pub context: WorkflowContext,
    /// Names of steps that executed successfully, in order
    pub completed_steps: Vec<String>,
}

/// A failed execution: the structured error plus the partial result.
///
/// The partial result keeps the completed-step list and the last good
/// context so callers can reconcile by hand (the engine never invokes
/// rollback hooks itself).
#[derive(Debug)]
pub struct WorkflowFailure {
    pub result: WorkflowExecutionResult,
    pub error: WorkflowError,
}

impl fmt::Display for WorkflowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Workflow {} failed after {} step(s): {}",
            self.result.workflow_id,
            self.result.completed_steps.len(),
            self.error
        )
    }
}

impl std::error::Error for WorkflowFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Bookkeeping entry for a workflow that is currently registered.
#[derive(Clone)]
struct ActiveWorkflow {
    status: Arc<Mutex<WorkflowStatus>>,
    on_status_change: Option<StatusCallback>,
}

impl ActiveWorkflow {
    fn transition(&self, id: WorkflowId, next: WorkflowStatus) {
        let mut status = self.status.lock().expect("workflow status lock");
        let previous = *status;
        *status = next;
        drop(status);

        tracing::info!(
            workflow_id = %id,
            from = %previous,
            to = %next,
            "Workflow status changed"
        );
        if let Some(callback) = &self.on_status_change {
            callback(next);
        }
    }

    fn current(&self) -> WorkflowStatus {
        *self.status.lock().expect("workflow status lock")
    }
}

/// Engine executing workflows and tracking their lifecycle.
///
/// Plain value, cheap to clone; clones share the same active-workflow map.
#[derive(Clone, Default)]
pub struct WorkflowEngine {
    active: Arc<RwLock<HashMap<WorkflowId, ActiveWorkflow>>>,
}

impl WorkflowEngine {
    pub fn new() -> Self {
        Self {
            active: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Execute a workflow's steps strictly in order.
    ///
    /// On success returns a COMPLETED result. On the first validation or
    /// execution failure the workflow transitions to FAILED, remaining
    /// steps are skipped, and the error is returned together with the
    /// partial result. The instance is evicted from the active map on
    /// every path, including cancellation mid-run.
    pub async fn execute_workflow(
        &self,
        workflow: Workflow,
    ) -> Result<WorkflowExecutionResult, WorkflowFailure> {
        let id = workflow.id;
        let entry = ActiveWorkflow {
            status: Arc::new(Mutex::new(WorkflowStatus::Pending)),
            on_status_change: workflow.callbacks.on_status_change.clone(),
        };
        {
            let mut active = self.active.write().expect("active workflow lock");
            active.insert(id, entry.clone());
        }
        // Eviction must happen on every exit path below.
        let guard = EvictionGuard {
            engine: self,
            id,
        };

        tracing::info!(workflow_id = %id, name = %workflow.name, steps = workflow.steps.len(), "Executing workflow");
        entry.transition(id, WorkflowStatus::Running);
        if let Some(on_start) = &workflow.callbacks.on_start {
            on_start();
        }

        let mut context = workflow.context.clone();
        let mut completed_steps = Vec::with_capacity(workflow.steps.len());

        for step in &workflow.steps {
            let step_name = step.name().to_string();
            tracing::debug!(workflow_id = %id, step = %step_name, "Running step");

            match step.validate(&context).await {
                Ok(true) => {}
                Ok(false) => {
                    let error = WorkflowError::StepValidationFailed { step: step_name };
                    return Err(self.fail(&workflow, &entry, guard, context, completed_steps, error));
                }
                Err(cause) => {
                    let error = WorkflowError::StepFailed {
                        step: step_name,
                        cause: cause.to_string(),
                    };
                    return Err(self.fail(&workflow, &entry, guard, context, completed_steps, error));
                }
            }

            match step.execute(context.clone()).await {
                Ok(next_context) => {
                    context = next_context;
                    completed_steps.push(step_name);
                }
                Err(cause) => {
                    let error = WorkflowError::StepFailed {
                        step: step_name,
                        cause: cause.to_string(),
                    };
                    return Err(self.fail(&workflow, &entry, guard, context, completed_steps, error));
                }
            }
        }

        entry.transition(id, WorkflowStatus::Completed);
        let result = WorkflowExecutionResult {
            workflow_id: id,
            status: WorkflowStatus::Completed,
            context,
            completed_steps,
        };
        if let Some(on_complete) = &workflow.callbacks.on_complete {
            on_complete(&result);
        }
        drop(guard);
        Ok(result)
    }

    /// Mark a running workflow as paused.
    ///
    /// Advisory only: the marker does not interrupt a step loop already
    /// in flight. Callers poll status between their own invocations.
    pub fn pause_workflow(&self, id: WorkflowId) -> WorkflowResult<()> {
        let entry = self.lookup(id)?;
        entry.transition(id, WorkflowStatus::Pending);
        Ok(())
    }

    /// Mark a paused workflow as running again.
    pub fn resume_workflow(&self, id: WorkflowId) -> WorkflowResult<()> {
        let entry = self.lookup(id)?;
        entry.transition(id, WorkflowStatus::Running);
        Ok(())
    }

    /// Cancel a workflow and evict it immediately.
    ///
    /// Subsequent status queries for the id report not-found. An
    /// in-flight step loop is not interrupted.
    pub fn cancel_workflow(&self, id: WorkflowId) -> WorkflowResult<()> {
        let entry = self.lookup(id)?;
        entry.transition(id, WorkflowStatus::Cancelled);
        self.evict(id);
        Ok(())
    }

    /// Current status of an active workflow.
    pub fn workflow_status(&self, id: WorkflowId) -> WorkflowResult<WorkflowStatus> {
        Ok(self.lookup(id)?.current())
    }

    /// Number of currently registered workflow instances.
    pub fn active_count(&self) -> usize {
        self.active.read().expect("active workflow lock").len()
    }

    fn lookup(&self, id: WorkflowId) -> WorkflowResult<ActiveWorkflow> {
        let active = self.active.read().expect("active workflow lock");
        active.get(&id).cloned().ok_or(WorkflowError::NotFound {
            workflow_id: id.to_string(),
        })
    }

    fn evict(&self, id: WorkflowId) {
        let mut active = self.active.write().expect("active workflow lock");
        active.remove(&id);
    }

    fn fail(
        &self,
        workflow: &Workflow,
        entry: &ActiveWorkflow,
        guard: EvictionGuard<'_>,
        context: WorkflowContext,
        completed_steps: Vec<String>,
        error: WorkflowError,
    ) -> WorkflowFailure {
        tracing::error!(
            workflow_id = %workflow.id,
            step = error.step_name().unwrap_or("<none>"),
            "Workflow failed: {}",
            error
        );
        entry.transition(workflow.id, WorkflowStatus::Failed);
        if let Some(on_error) = &workflow.callbacks.on_error {
            on_error(&error);
        }
        drop(guard);
        WorkflowFailure {
            result: WorkflowExecutionResult {
                workflow_id: workflow.id,
                status: WorkflowStatus::Failed,
                context,
                completed_steps,
            },
            error,
        }
    }
}

/// Removes a workflow from the active map when dropped.
struct EvictionGuard<'a> {
    engine: &'a WorkflowEngine,
    id: WorkflowId,
}

impl Drop for EvictionGuard<'_> {
    fn drop(&mut self) {
        self.engine.evict(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use serde_json::json;

    use crate::step::FnStep;

    fn tagging_step(name: &'static str) -> Arc<dyn WorkflowStep> {
        FnStep::new(name, move |mut context: WorkflowContext| async move {
            context.insert(name, json!("done"))?;
            Ok(context)
        })
        .shared()
    }

    #[tokio::test]
    async fn all_steps_succeed_yields_completed() {
        let engine = WorkflowEngine::new();
        let workflow = Workflow::builder()
            .with_name("pipeline")
            .with_step(tagging_step("extract"))
            .with_step(tagging_step("transform"))
            .with_step(tagging_step("load"))
            .build()
            .unwrap();

        let result = engine.execute_workflow(workflow).await.unwrap();

        assert_eq!(result.status, WorkflowStatus::Completed);
        assert_eq!(result.completed_steps, vec!["extract", "transform", "load"]);
        assert!(result.context.contains("load"));
        assert_eq!(engine.active_count(), 0);
    }

    #[tokio::test]
    async fn failed_validation_keeps_partial_progress() {
        let engine = WorkflowEngine::new();
        let rolled_back = Arc::new(AtomicU32::new(0));
        let rolled_back_clone = Arc::clone(&rolled_back);

        let blocked = FnStep::new("blocked", |context| async move { Ok(context) })
            .with_validate(|_context: &WorkflowContext| async { Ok(false) })
            .with_rollback(move |_context: &WorkflowContext| {
                let rolled_back = Arc::clone(&rolled_back_clone);
                async move {
                    rolled_back.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .shared();

        let workflow = Workflow::builder()
            .with_name("pipeline")
            .with_step(tagging_step("first"))
            .with_step(blocked)
            .with_step(tagging_step("never"))
            .build()
            .unwrap();

        let failure = engine.execute_workflow(workflow).await.unwrap_err();

        assert_eq!(failure.result.status, WorkflowStatus::Failed);
        assert_eq!(failure.result.completed_steps, vec!["first"]);
        // The first step's context mutation survives into the failure.
        assert!(failure.result.context.contains("first"));
        assert!(!failure.result.context.contains("never"));
        assert_eq!(failure.error.code(), "STEP_VALIDATION_FAILED");
        // Rollback hooks are never auto-invoked.
        assert_eq!(rolled_back.load(Ordering::SeqCst), 0);
        assert_eq!(engine.active_count(), 0);
    }

    #[tokio::test]
    async fn step_execution_error_fails_the_workflow() {
        let engine = WorkflowEngine::new();
        let fragile = FnStep::new("fragile", |_context: WorkflowContext| async {
            Err("backend unavailable".into())
        })
        .shared();

        let workflow = Workflow::builder()
            .with_name("pipeline")
            .with_step(fragile)
            .build()
            .unwrap();

        let failure = engine.execute_workflow(workflow).await.unwrap_err();
        assert_eq!(failure.error.step_name(), Some("fragile"));
        assert!(failure.error.to_string().contains("backend unavailable"));
    }

    #[tokio::test]
    async fn status_transitions_fire_callbacks() {
        let engine = WorkflowEngine::new();
        let transitions = Arc::new(Mutex::new(Vec::new()));
        let transitions_clone = Arc::clone(&transitions);

        let workflow = Workflow::builder()
            .with_name("observed")
            .with_step(tagging_step("only"))
            .on_status_change(move |status| {
                transitions_clone
                    .lock()
                    .expect("transitions lock")
                    .push(status);
            })
            .build()
            .unwrap();

        engine.execute_workflow(workflow).await.unwrap();

        assert_eq!(
            *transitions.lock().unwrap(),
            vec![WorkflowStatus::Running, WorkflowStatus::Completed]
        );
    }

    #[tokio::test]
    async fn terminal_workflows_are_not_queryable() {
        let engine = WorkflowEngine::new();
        let workflow = Workflow::builder()
            .with_name("transient")
            .with_step(tagging_step("only"))
            .build()
            .unwrap();
        let id = workflow.id();

        engine.execute_workflow(workflow).await.unwrap();

        let err = engine.workflow_status(id).unwrap_err();
        assert_eq!(err.code(), "WORKFLOW_NOT_FOUND");
        assert!(engine.pause_workflow(id).is_err());
        assert!(engine.cancel_workflow(id).is_err());
    }

    #[tokio::test]
    async fn cancel_evicts_immediately() {
        let engine = WorkflowEngine::new();
        let workflow = Workflow::builder()
            .with_name("doomed")
            .with_step(tagging_step("only"))
            .build()
            .unwrap();
        let id = workflow.id();

        // Register without executing by driving execute_workflow part way
        // is not possible from outside, so cancel is exercised against a
        // freshly registered instance via the engine's own insert path.
        let cancelled = Arc::new(Mutex::new(Vec::new()));
        let cancelled_clone = Arc::clone(&cancelled);
        let entry = ActiveWorkflow {
            status: Arc::new(Mutex::new(WorkflowStatus::Pending)),
            on_status_change: Some(Arc::new(move |status| {
                cancelled_clone.lock().expect("cancel lock").push(status);
            })),
        };
        engine
            .active
            .write()
            .expect("active workflow lock")
            .insert(id, entry);

        engine.cancel_workflow(id).unwrap();

        assert_eq!(*cancelled.lock().unwrap(), vec![WorkflowStatus::Cancelled]);
        assert_eq!(engine.active_count(), 0);
        assert!(engine.workflow_status(id).is_err());

        drop(workflow);
    }

    #[tokio::test]
    async fn pause_and_resume_toggle_status() {
        let engine = WorkflowEngine::new();
        let id = WorkflowId::new();
        let entry = ActiveWorkflow {
            status: Arc::new(Mutex::new(WorkflowStatus::Running)),
            on_status_change: None,
        };
        engine
            .active
            .write()
            .expect("active workflow lock")
            .insert(id, entry);

        engine.pause_workflow(id).unwrap();
        assert_eq!(engine.workflow_status(id).unwrap(), WorkflowStatus::Pending);

        engine.resume_workflow(id).unwrap();
        assert_eq!(engine.workflow_status(id).unwrap(), WorkflowStatus::Running);
    }
}
