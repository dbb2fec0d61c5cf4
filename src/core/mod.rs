// src/core/mod.rs
pub mod gallery;
pub mod matcher;
pub mod pin;
pub mod services;
pub mod transaction;
