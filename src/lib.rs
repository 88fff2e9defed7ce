//! Personal knowledge capture with fuzzy search, productivity analytics, and
//! AI recall over a local SQLite store.
//!
//! RecallRift keeps short user-authored notes ("memories") with a title,
//! body, optional category, tags and a favorite flag. On top of the store it
//! provides:
//!
//! | Feature | Where |
//! |---------|-------|
//! | Fuzzy search, filters and sorting | [`memory::search`] |
//! | Streaks, goals, activity series | [`memory::analytics`] |
//! | Ask / summarize / insights via Gemini | [`ai`] |
//! | JSON export, backup and import | [`memory::transfer`] |
//! | Smart collections and templates | [`memory::collections`], [`memory::templates`] |
//!
//! # Surfaces
//!
//! - **CLI**: the `recallrift` binary, one subcommand per operation
//! - **MCP**: the same operations as tools over stdio or streamable HTTP
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite initialization, schema, and health checks
//! - [`memory`]: Store, search, analytics, import/export, collections
//! - [`ai`]: Completion provider trait, Gemini client, prompt builders
//! - [`tools`] / [`server`]: MCP tool handler and transports
//! - [`cli`]: Terminal commands

pub mod ai;
pub mod cli;
pub mod config;
pub mod db;
pub mod memory;
pub mod server;
pub mod tools;
