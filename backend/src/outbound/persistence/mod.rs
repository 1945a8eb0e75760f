//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! The persistence layer follows these principles:
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Async-safe pooling**: Connections are managed via `bb8` pools with
//!   proper async integration through `diesel-async`.
//! - **Strongly typed errors**: All database errors are mapped to domain
//!   persistence error types.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, PoolConfig, DieselCycleRepository};
//!
//! let config = PoolConfig::new("postgres://localhost/mydb");
//! let pool = DbPool::new(config).await?;
//! let repo = DieselCycleRepository::new(pool);
//! ```

mod diesel_application_repository;
mod diesel_award_repository;
mod diesel_cycle_repository;
mod diesel_draft_repository;
pub(crate) mod diesel_helpers;
mod diesel_job_run_repository;
mod diesel_notification_repository;
mod diesel_organization_repository;
mod diesel_question_repository;
mod diesel_report_repository;
mod json_serializers;
mod models;
mod pool;
mod schema;

pub use diesel_application_repository::DieselApplicationRepository;
pub use diesel_award_repository::DieselAwardRepository;
pub use diesel_cycle_repository::DieselCycleRepository;
pub use diesel_draft_repository::DieselDraftRepository;
pub use diesel_job_run_repository::DieselJobRunRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_organization_repository::DieselOrganizationRepository;
pub use diesel_question_repository::DieselQuestionRepository;
pub use diesel_report_repository::DieselReportRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
