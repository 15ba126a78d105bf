//! Workflow step contract.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::WorkflowContext;

/// Boxed error type produced by step hooks.
///
/// Steps may fail with arbitrary errors; the engine wraps them into a
/// typed step failure with the original message preserved.
pub type StepError = Box<dyn std::error::Error + Send + Sync>;

/// One unit of work inside a workflow.
///
/// Steps run strictly in declaration order. `execute` receives the current
/// context and returns the context the next step sees.
#[async_trait]
pub trait WorkflowStep: Send + Sync {
    /// The step's name, recorded in `completed_steps` on success.
    fn name(&self) -> &str;

    /// Precondition check run before `execute`.
    ///
    /// Returning `Ok(false)` fails the workflow with a validation error
    /// and skips the remaining steps.
    async fn validate(&self, context: &WorkflowContext) -> Result<bool, StepError> {
        let _ = context;
        Ok(true)
    }

    /// Run the step, producing the context for the next step.
    async fn execute(&self, context: WorkflowContext) -> Result<WorkflowContext, StepError>;

    /// Undo this step's side effects.
    ///
    /// The engine never invokes this hook itself, not even when a later
    /// step fails. It is a contract field for callers that reconcile
    /// partially-completed workflows by hand, using the failure's
    /// `completed_steps` list.
    async fn rollback(&self, context: &WorkflowContext) -> Result<(), StepError> {
        let _ = context;
        Ok(())
    }
}

type ExecuteFn = Box<
    dyn Fn(WorkflowContext) -> Pin<Box<dyn Future<Output = Result<WorkflowContext, StepError>> + Send>>
        + Send
        + Sync,
>;
type ValidateFn = Box<
    dyn Fn(&WorkflowContext) -> Pin<Box<dyn Future<Output = Result<bool, StepError>> + Send>>
        + Send
        + Sync,
>;
type RollbackFn = Box<
    dyn Fn(&WorkflowContext) -> Pin<Box<dyn Future<Output = Result<(), StepError>> + Send>>
        + Send
        + Sync,
>;

/// Closure adapter implementing [`WorkflowStep`].
pub struct FnStep {
    name: String,
    execute: ExecuteFn,
    validate: Option<ValidateFn>,
    rollback: Option<RollbackFn>,
}

impl FnStep {
    /// Create a step from a name and an async execute closure.
    pub fn new<F, Fut>(name: impl Into<String>, execute: F) -> Self
    where
        F: Fn(WorkflowContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<WorkflowContext, StepError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            execute: Box::new(move |context| Box::pin(execute(context))),
            validate: None,
            rollback: None,
        }
    }

    /// Attach a validation hook using the builder pattern.
    pub fn with_validate<F, Fut>(mut self, validate: F) -> Self
    where
        F: Fn(&WorkflowContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, StepError>> + Send + 'static,
    {
        self.validate = Some(Box::new(move |context| Box::pin(validate(context))));
        self
    }

    /// Attach a rollback hook using the builder pattern.
    pub fn with_rollback<F, Fut>(mut self, rollback: F) -> Self
    where
        F: Fn(&WorkflowContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), StepError>> + Send + 'static,
    {
        self.rollback = Some(Box::new(move |context| Box::pin(rollback(context))));
        self
    }

    /// Wrap the step for registration with a workflow builder.
    pub fn shared(self) -> Arc<dyn WorkflowStep> {
        Arc::new(self)
    }
}

#[async_trait]
impl WorkflowStep for FnStep {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(&self, context: &WorkflowContext) -> Result<bool, StepError> {
        match &self.validate {
            Some(validate) => validate(context).await,
            None => Ok(true),
        }
    }

    async fn execute(&self, context: WorkflowContext) -> Result<WorkflowContext, StepError> {
        (self.execute)(context).await
    }

    async fn rollback(&self, context: &WorkflowContext) -> Result<(), StepError> {
        match &self.rollback {
            Some(rollback) => rollback(context).await,
            None => Ok(()),
        }
    }
}
