//! Default configuration values

/// Directory, relative to the project root, holding the lockfile
pub const LOCKFILE_DIR: &str = ".dev";

/// Lockfile name without a format extension
pub const LOCKFILE_BASENAME: &str = "elide.lock";

/// Settings file name, inside [`LOCKFILE_DIR`]
pub const SETTINGS_FILE: &str = "lockfile.toml";

/// Fingerprint files by content digest unless configured otherwise
pub const DEFAULT_DIGEST_FILES: bool = true;

/// Number of files fingerprinted concurrently when not configured
pub fn default_parallelism() -> usize {
    num_cpus::get().max(1)
}

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
