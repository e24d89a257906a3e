//! Trellis - a task dependency graph engine.
//!
//! This crate provides both a CLI application and a library for managing
//! finish-to-start precedence edges between tasks: acyclicity enforcement,
//! per-task blocker limits, bidirectional queries, blocked-state derivation
//! and cascading removal, backed by JSONL storage.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod engine;
pub mod error;
pub mod id_generation;
pub mod storage;
pub mod tasks;

// Public CLI modules (needed by binary)
pub mod app;
pub mod cli;
pub mod commands;
pub mod output;
