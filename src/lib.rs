//! mailtask - persistence core for an email-to-task assistant
//!
//! This crate provides the storage layer that keeps tasks and classified
//! email in one local SQLite database, plus the `mailtask` CLI on top.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Task, Email, filters, statistics)
//! - [`storage`] - SQLite handle lifecycle and the task/email stores
//! - [`config`] - Database path resolution and config file
//! - [`validate`] - Status/priority normalisation for user input
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod validate;

pub use error::{Error, Result};
