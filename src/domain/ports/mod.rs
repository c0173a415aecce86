//! Port traits: the engine's contracts with persistence and external
//! collaborators.

pub mod chat_client;
pub mod drafter;
pub mod execution_repository;
pub mod notifier;
pub mod report_generator;
pub mod stores;
pub mod workflow_repository;

pub use chat_client::{ChatClient, ChatError, ChatRequest};
pub use drafter::{DraftParams, ResponseDrafter};
pub use execution_repository::{ExecutionFilters, ExecutionRepository, LogFilters, LogRepository};
pub use notifier::Notifier;
pub use report_generator::{ReportGenerator, ReportHandle, ReportSpec};
pub use stores::{LocationStore, ResponseStore, ReviewStore, TenantDirectory, UserStore};
pub use workflow_repository::WorkflowRepository;
