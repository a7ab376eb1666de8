//! Constants used throughout the crate
//!
//! Default values and log message fragments live here so the service and the
//! filter agree on them.

// Filter defaults
/// Row limit applied when a filter leaves `limit` unset.
pub const DEFAULT_LIMIT: u64 = 100;
/// Sort expression applied when a filter leaves `order` empty.
pub const DEFAULT_ORDER: &str = "id desc";

// Query parameter names
pub const QUERY_LIMIT: &str = "limit";
pub const QUERY_OFFSET: &str = "offset";
pub const QUERY_ORDER: &str = "order";

// Service defaults
pub const DEFAULT_TRACE_NAME: &str = "[DEFAULT_SQLService]";
/// Statements slower than this are logged as warnings.
pub const DEFAULT_SLOW_THRESHOLD_MS: u64 = 1000;

// SQLite
pub const SQLITE_MEMORY: &str = ":memory:";
pub const SQLITE_MEMORY_URL: &str = "sqlite::memory:";

// Log Messages
pub const LOG_INITIALIZING: &str = "Initializing sql service";
pub const LOG_INITIALIZED: &str = "✅ SQL Service initialized";
pub const LOG_ALREADY_INITIALIZED: &str = "SQL Service already initialized, skipping";
pub const LOG_DISCONNECTED: &str = "✅ SQL Service disconnected";
pub const LOG_ERROR_UNSUPPORTED: &str = "❌ SQL client not support";
pub const LOG_ERROR_CONNECT: &str = "❌ Failed to connect to sql database";
pub const LOG_ERROR_PING: &str = "❌ Failed to ping sql database";
pub const LOG_ERROR_NOT_INITIALIZED: &str = "❌ SQL client not initialized";
pub const LOG_ERROR_CLOSE: &str = "❌ Failed to close connection";

// Config
pub const CONFIG_FILE_NAME: &str = "sqlkit.toml";
pub const CONFIG_DIR_NAME: &str = "sqlkit";
