//! DocVault - role-based file storage service
//!
//! Users belong to departments and carry one of three roles
//! (USER < MANAGER < ADMIN). Files are uploaded with a visibility level
//! (PRIVATE, DEPARTMENT, PUBLIC) that, together with the role, decides who
//! can list, download and delete them.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface
//!
//! # Architecture
//! - `storage`: SeaORM backend (SQLite / MySQL / PostgreSQL)
//! - `services`: access rules, uploads, users, authentication
//! - `api`: HTTP handlers, JWT and middleware
//! - `interfaces`: CLI commands
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
