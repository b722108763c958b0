//! Figtally domain core.
//!
//! Tracks tabletop miniature ownership: a shared catalog of figurine
//! definitions, per-user possession records against them, and the
//! role-scoped policy deciding who may write which fields.
//!
//! - [`catalog`] -- resolve/create/update definitions.
//! - [`possession`] -- resolve/create possessions and merge quantities.
//! - [`policy`] -- the mutation policy engine.
//! - [`import`] -- the bulk import orchestrator.
//! - [`figurines`] -- the operations the transport layer calls.
//!
//! Persistence is reached only through the traits in [`ports`].

pub mod account;
pub mod catalog;
pub mod definition;
pub mod error;
pub mod figurines;
pub mod import;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod payload;
pub mod policy;
pub mod ports;
pub mod possession;
pub mod reference;
pub mod roles;
pub mod types;
pub mod view;
