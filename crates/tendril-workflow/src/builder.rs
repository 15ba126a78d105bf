//! Fluent workflow construction.

use std::sync::Arc;

use serde_json::Value;
use tendril_core::{WorkflowError, WorkflowResult};

use crate::context::WorkflowContext;
use crate::engine::{Workflow, WorkflowCallbacks, WorkflowExecutionResult, WorkflowId, WorkflowStatus};
use crate::step::WorkflowStep;

/// Builder assembling a [`Workflow`] instance.
///
/// A name is required; everything else is optional. The built workflow
/// starts in PENDING with a freshly generated id.
#[derive(Default)]
pub struct WorkflowBuilder {
    name: Option<String>,
    steps: Vec<Arc<dyn WorkflowStep>>,
    context: WorkflowContext,
    callbacks: WorkflowCallbacks,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the workflow's name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a step. Steps execute in the order they are added.
    pub fn with_step(mut self, step: Arc<dyn WorkflowStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Replace the seed context.
    pub fn with_context(mut self, context: WorkflowContext) -> Self {
        self.context = context;
        self
    }

    /// Seed a single context value, validating the key.
    pub fn with_context_value(
        mut self,
        key: &str,
        value: impl Into<Value>,
    ) -> WorkflowResult<Self> {
        self.context
            .insert(key, value)
            .map_err(|reason| WorkflowError::InvalidContextKey { reason })?;
        Ok(self)
    }

    /// Observe the start of execution.
    pub fn on_start(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.callbacks.on_start = Some(Arc::new(callback));
        self
    }

    /// Observe successful completion.
    pub fn on_complete(
        mut self,
        callback: impl Fn(&WorkflowExecutionResult) + Send + Sync + 'static,
    ) -> Self {
        self.callbacks.on_complete = Some(Arc::new(callback));
        self
    }

    /// Observe the first failure.
    pub fn on_error(
        mut self,
        callback: impl Fn(&WorkflowError) + Send + Sync + 'static,
    ) -> Self {
        self.callbacks.on_error = Some(Arc::new(callback));
        self
    }

    /// Observe every status transition.
    pub fn on_status_change(
        mut self,
        callback: impl Fn(WorkflowStatus) + Send + Sync + 'static,
    ) -> Self {
        self.callbacks.on_status_change = Some(Arc::new(callback));
        self
    }

    /// Build the workflow.
    pub fn build(self) -> WorkflowResult<Workflow> {
        let name = self.name.ok_or(WorkflowError::MissingName)?;
        Ok(Workflow {
            id: WorkflowId::new(),
            name,
            steps: self.steps,
            context: self.context,
            callbacks: self.callbacks,
        })
    }
}
