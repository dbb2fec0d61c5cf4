// src/core/pin/mod.rs
mod authenticator;

pub use authenticator::{validate_pin_format, PinAuthenticator, PinSnapshot};
