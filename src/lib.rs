//! Declarative symlink reconciler for dotfiles.
//!
//! Source trees are projected onto a target root (usually `$HOME`): every
//! top-level entry of a namespace root is linked under a dot-prefixed name,
//! while a unit root is linked as a whole at an explicit destination.
//! Overlapping claims are rejected before anything is touched; then stale
//! links are removed and every target is made to hold a relative link to its
//! source.
//!
//! The public API is organised into these layers:
//!
//! - **[`config`]** — load and validate the TOML configuration
//! - **[`projection`]** — path transform, target sets, collision checks
//! - **[`resources`]** — idempotent `check + apply` symlink primitive
//! - **[`tasks`]** — clean, link, run-state, and post-action units of work
//! - **[`commands`]** — phase orchestration and the `link` / `check` subcommands
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod projection;
pub mod resources;
pub mod state;
pub mod tasks;
