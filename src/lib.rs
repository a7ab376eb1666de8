//! sqlkit - a thin data-access layer over SeaORM
//!
//! This library wraps the lifecycle of a relational database connection and
//! provides two helpers for building list queries: pagination/order defaults
//! and struct-to-condition mapping.
//!
//! # Modules
//!
//! * [`service`] - Connection lifecycle for PostgreSQL, MySQL and SQLite
//! * [`filter`] - Limit/offset/order defaults, from values or query strings
//! * [`condition`] - Mapping a record's fields to query conditions
//! * [`config`] - TOML configuration loading and validation
//! * [`logger`] - `fern` logger setup

/// Struct-to-condition mapping
pub mod condition;

/// Configuration module for loading connection and logging settings
pub mod config;

/// Default values and log messages
pub mod constants;

pub mod error;

/// Pagination and ordering defaults
pub mod filter;

/// Logging setup
pub mod logger;

/// Connection lifecycle service
pub mod service;

pub use condition::{is_empty_value, new_where_condition, Where};
pub use error::{Error, Result};
pub use filter::{defaults_filter, Filter, QueryParams, QueryString};
pub use service::{connection_url, Client, ConnectConfig, Connection, Connector, Database, Service, ServiceConfig};
