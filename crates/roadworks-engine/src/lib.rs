//! The Roadworks lifecycle engine.
//!
//! Orchestrates every mutation of issues and accounts: validate the input,
//! consult the authorization policy, apply the change through a store
//! trait, return a typed result. Generic over the storage backend; HTTP
//! and transport concerns live a layer up.

pub mod credential;
pub mod engine;
pub mod session;

pub use engine::{Engine, NewAccount, StatsScope};
pub use session::SessionCodec;
