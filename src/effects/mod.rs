//! Effectful checkout operations using Stillwater 0.11.0.
//!
//! This module is the "imperative shell" around the pure engine. It talks
//! to the external equipment service through the [`EquipmentGateway`]
//! environment and feeds every fresh snapshot and history page back into
//! the engine and projection.
//!
//! # Key Concepts
//!
//! - **Gateway**: Environment capability describing the external service
//! - **Session**: Caller-owned state that builds effects and applies their output
//! - **Effects**: Built with `from_fn()`, run with `.run(&env).await`
//!
//! The engine never retries. A failed effect leaves the session untouched,
//! so abandoning an in-flight effect needs no rollback.

mod gateway;
mod session;

pub use gateway::EquipmentGateway;
pub use session::{CheckoutSession, SessionUpdate};
