//! Domain layer: value objects and pure services for risk resolution.
pub mod domain;
pub mod services;
