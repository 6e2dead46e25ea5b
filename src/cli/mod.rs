//! `trust-cli` command surface (spec.md §6)

pub mod commands;
