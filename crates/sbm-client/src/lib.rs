//! REST client for the SBM network boot manager.
//!
//! [`ResourceClient`] talks to the `/api/v1/` collections (boot configs,
//! machines and variables). [`Console`] dispatches requests and hands the
//! results to a [`Presenter`]. The [`reconcile`] module enforces desired
//! state on top of the client.

pub mod client;
pub mod config;
pub mod console;
pub mod reconcile;

pub use client::ResourceClient;
pub use config::ClientConfig;
pub use console::{Console, Presenter};
pub use reconcile::{ensure_absent, ensure_present, Outcome, ReconcileError};
