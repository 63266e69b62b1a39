use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Hepatrace";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "hepatrace=info"
}

/// Get the application data directory
/// ~/Hepatrace/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Hepatrace")
}

/// Default location of the SQLite database.
pub fn database_path() -> PathBuf {
    app_data_dir().join("hepatrace.db")
}
