// src/core/services/mod.rs
mod authorization;
mod enrollment;

pub use authorization::AuthorizationService;
pub use enrollment::EnrollmentService;
