//! Fixed names used by configuration sources

/// Separator between hierarchy levels in a configuration key
pub const KEY_DELIMITER: &str = ":";

/// Environment-variable spelling of [`KEY_DELIMITER`]
pub const ENV_KEY_DELIMITER: &str = "__";

/// Directory (under the user config dir) holding per-application secrets
pub const USER_SECRETS_DIR: &str = "driveline/user-secrets";

/// File name of a secrets store
pub const USER_SECRETS_FILE: &str = "secrets.json";
