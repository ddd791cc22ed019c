//! Montar — toolchain setup orchestrator for embedded ML.
//!
//! A registry of install tasks plus their dependency and provider
//! relations is resolved into a DAG, linearized deterministically, and run
//! sequentially with fail-fast semantics. Completion state is persisted in
//! a key-value cache so repeated runs skip already-satisfied work.

pub mod cli;
pub mod core;
pub mod tasks;
