//! bbox: a command-line client for the Brightbox cloud.
//!
//! The interesting part is [`resource`]: classifying identifiers, resolving
//! them to remote objects through a per-run cache, and lazily wrapping what
//! comes back. [`api`] is the HTTP transport behind it; [`commands`] and
//! [`output`] are the CLI surface.

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod output;
pub mod resource;
