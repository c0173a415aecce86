//! Action contract and registry.
//!
//! Actions are the system's polymorphism boundary: new capabilities are
//! added by implementing [`Action`] and registering it under an
//! [`ActionKind`], never by modifying the execution engine. The registry is
//! built explicitly at process start and passed by reference; there is no
//! global mutable state.

pub mod add_tag;
pub mod ai_response;
pub mod assign_user;
pub mod generate_report;
pub mod notify;
pub mod update_listing;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::event::AutomationEvent;
use crate::domain::models::workflow::{ActionConfig, ActionKind, Workflow};
use crate::domain::ports::{
    LocationStore, Notifier, ReportGenerator, ResponseStore, ReviewStore, UserStore,
};
use crate::services::ai_responder::AiResponder;

pub use add_tag::AddTagAction;
pub use ai_response::AiResponseAction;
pub use assign_user::AssignUserAction;
pub use generate_report::GenerateReportAction;
pub use notify::NotifyAction;
pub use update_listing::UpdateListingAction;

/// Shared collaborator handles available to every action.
pub struct ActionServices {
    pub reviews: Arc<dyn ReviewStore>,
    pub locations: Arc<dyn LocationStore>,
    pub users: Arc<dyn UserStore>,
    pub responses: Arc<dyn ResponseStore>,
    pub notifier: Arc<dyn Notifier>,
    pub reports: Arc<dyn ReportGenerator>,
    pub responder: Arc<AiResponder>,
}

/// Per-invocation context handed to an action by the execution engine.
///
/// `data` is the triggering event's snapshot merged with the serialized
/// workflow and the execution id; actions read it to find the entities they
/// act on.
pub struct ActionContext {
    pub workflow: Workflow,
    pub execution_id: Uuid,
    pub event: AutomationEvent,
    pub data: serde_json::Value,
    pub services: Arc<ActionServices>,
}

impl ActionContext {
    /// The review this run is acting on, from the event hint or the merged
    /// context data.
    pub fn review_id(&self) -> Option<Uuid> {
        self.event.review_id.or_else(|| {
            self.data
                .get("review_id")
                .and_then(|v| v.as_str())
                .and_then(|s| Uuid::parse_str(s).ok())
        })
    }

    pub fn location_id(&self) -> Option<Uuid> {
        self.event.location_id.or_else(|| {
            self.data
                .get("location_id")
                .and_then(|v| v.as_str())
                .and_then(|s| Uuid::parse_str(s).ok())
        })
    }
}

/// Human-readable description of an action for operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    /// Summary of the expected configuration shape.
    pub config_summary: &'static str,
}

/// A pluggable unit of side-effecting work performed during an execution.
#[async_trait]
pub trait Action: Send + Sync {
    fn kind(&self) -> ActionKind;

    fn descriptor(&self) -> ActionDescriptor;

    /// Semantic validation of a configuration at workflow-save time.
    /// Returns human-readable problems; empty means valid.
    fn validate(&self, config: &ActionConfig) -> Vec<String>;

    /// Execute with the given configuration and context. The returned value
    /// is the action-specific result payload recorded on the execution.
    async fn execute(
        &self,
        config: &ActionConfig,
        ctx: &ActionContext,
    ) -> DomainResult<serde_json::Value>;
}

/// Rejects a configuration variant that does not belong to this action.
/// The engine dispatches by the config's own kind, but a direct caller can
/// still hand the wrong variant over.
pub(crate) fn wrong_config(kind: ActionKind) -> DomainError {
    DomainError::InvalidActionConfig {
        kind: kind.as_str().to_string(),
        reason: "configuration variant does not match action type".to_string(),
    }
}

/// Maps action kinds to implementations. Built once at startup.
pub struct ActionRegistry {
    actions: HashMap<ActionKind, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self { actions: HashMap::new() }
    }

    /// Registry with all built-in actions.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(AddTagAction));
        registry.register(Arc::new(AssignUserAction));
        registry.register(Arc::new(NotifyAction));
        registry.register(Arc::new(GenerateReportAction));
        registry.register(Arc::new(UpdateListingAction));
        registry.register(Arc::new(AiResponseAction));
        registry
    }

    pub fn register(&mut self, action: Arc<dyn Action>) {
        self.actions.insert(action.kind(), action);
    }

    /// Resolve an implementation. An unregistered kind is a configuration
    /// error for the calling action invocation.
    pub fn resolve(&self, kind: ActionKind) -> DomainResult<Arc<dyn Action>> {
        self.actions
            .get(&kind)
            .cloned()
            .ok_or_else(|| DomainError::UnknownAction(kind.as_str().to_string()))
    }

    pub fn kinds(&self) -> Vec<ActionKind> {
        self.actions.keys().copied().collect()
    }

    /// Validate one configuration against its registered implementation.
    pub fn validate(&self, config: &ActionConfig) -> DomainResult<Vec<String>> {
        Ok(self.resolve(config.kind())?.validate(config))
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_covers_all_kinds() {
        let registry = ActionRegistry::builtin();
        for kind in [
            ActionKind::AddTag,
            ActionKind::AssignUser,
            ActionKind::Notify,
            ActionKind::GenerateReport,
            ActionKind::UpdateListing,
            ActionKind::AiResponse,
        ] {
            assert!(registry.resolve(kind).is_ok(), "missing {kind}");
        }
    }

    #[test]
    fn test_empty_registry_resolve_fails() {
        let registry = ActionRegistry::new();
        assert!(matches!(
            registry.resolve(ActionKind::AddTag),
            Err(DomainError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_validate_flags_empty_tags() {
        let registry = ActionRegistry::builtin();
        let problems = registry
            .validate(&ActionConfig::AddTag { tags: vec![] })
            .unwrap();
        assert!(!problems.is_empty());
    }
}
