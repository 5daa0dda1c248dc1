//! # sdcaller Architecture
//!
//! sdcaller keeps a square-dance caller's practice statistics and
//! preferences in local storage and moves them between machines as JSON
//! backups. It is a **UI-agnostic library** with a small CLI client on top;
//! the same core could sit behind a desktop or browser front end.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Parses arguments, prompts, formats output                │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Collaborator interface (load/save/export/import)         │
//! │  - Thin dispatch to commands                                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs, binding.rs)                  │
//! │  - Profile lifecycle, backup export/import, doctor          │
//! │  - Profile binding: in-memory copy written through on set   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/) + Schema (schema.rs)                │
//! │  - LocalStore adapter over a KvBackend                      │
//! │  - FileBackend (production), MemBackend (testing)           │
//! │  - Every read validated before it becomes domain data       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Policy
//!
//! Reads never fail: missing, malformed or out-of-date data is logged through
//! `tracing` and reported as `None`. Import returns `false` and changes
//! nothing when its input is rejected. Writes driven by the CLI return their
//! errors so the user learns when a change was not saved.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Business logic for each command
//! - [`binding`]: Store-synchronized in-memory values
//! - [`store`]: Key-value storage abstraction and implementations
//! - [`schema`]: Validation of untyped JSON
//! - [`model`]: Core data types (`UserProfile`, `BackupEnvelope`)
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod binding;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod schema;
pub mod store;
