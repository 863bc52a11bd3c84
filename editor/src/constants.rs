//! Crate-wide constants

/// Collection path for assignment records
pub const ASSIGNMENTS_PATH: &str = "/assignments";

/// Where the editor returns to when no originating location was recorded
pub const DEFAULT_RETURN_PATH: &str = "/assignments";

/// Prefix for per-assignment action routes
pub const ASSIGNMENT_EDIT_PATH: &str = "/assignments/edit";

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:3002/api/v1";

/// Request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// Connection timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 30;

/// Idle timeout for connection pool in seconds
pub const POOL_IDLE_TIMEOUT: u64 = 300;

/// Maximum idle connections per host
pub const POOL_MAX_IDLE_PER_HOST: usize = 5;

/// Key wrapping the assignment fields in request bodies
pub const REQUEST_ROOT_KEY: &str = "assignment";

/// Validation message for a missing required value
pub const MSG_REQUIRED: &str = "Required";

// Environment variables
pub const ENV_BASE_URL: &str = "ASSIGNMENT_EDITOR_BASE_URL";
pub const ENV_REQUEST_TIMEOUT: &str = "ASSIGNMENT_EDITOR_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT: &str = "ASSIGNMENT_EDITOR_CONNECT_TIMEOUT_SECS";
pub const ENV_AUTH_TOKEN: &str = "ASSIGNMENT_EDITOR_AUTH_TOKEN";
pub const ENV_LOG_LEVEL: &str = "ASSIGNMENT_EDITOR_LOG";

/// Log file name created in the temp directory
pub const TRACE_LOG_FILENAME: &str = "assignment_editor.log";
