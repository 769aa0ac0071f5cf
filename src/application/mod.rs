//! Application layer: use cases orchestrating domain services over the
//! outbound ports, plus factories wiring adapters from configuration.
pub mod factories;
pub mod use_cases;
