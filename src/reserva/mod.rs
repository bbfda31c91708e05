//! Reservation records and the reactions to their lifecycle.

pub mod handlers;
pub mod model;
pub mod repository;
pub mod staging;
pub mod webhook;
pub mod workflow;

pub use model::{LifecycleEntry, Reservation, ReservationPatch, Tour, User};
pub use staging::ContractStaging;
pub use workflow::{CallOrigin, Collaborators, ReservationWorkflow, WorkflowError, WorkflowSettings};

pub fn config(cfg: &mut actix_web::web::ServiceConfig) {
    handlers::config(cfg);
}
