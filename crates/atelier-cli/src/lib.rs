//! Atelier CLI library.
//!
//! This crate provides the `atelier` command-line interface: plan and apply
//! for workshop infrastructure plus thin, guard-gated CRUD commands.

pub mod cli;
pub mod commands;
