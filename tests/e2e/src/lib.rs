//! Somnia end-to-end test support
//!
//! - `harness`: isolated journal databases wired to the core components
//! - `mocks`: deterministic text-generation and embedding collaborators,
//!   plus fixture dreams

pub mod mocks;
