/// Constants used throughout the stamp workspace
// Directory holding stamp's own state inside a project; never versioned.
pub const DEFAULT_INTERNAL_DIR_NAME: &str = ".stamp";

// Per-directory ignore file with project-specific rules
pub const DEFAULT_IGNORE_FILE_NAME: &str = ".stampignore";

// Configuration file looked up in the project root
pub const CONFIG_FILE_NAME: &str = "stamp.json";

// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "STAMP_";

// Remote sources are checked out below this directory of the internal dir
pub const SOURCES_DIR_NAME: &str = "sources";

// Separator between repository URL and ref name in a remote source reference
pub const REMOTE_REF_SEPARATOR: char = '#';

// Prefix of every version string
pub const VERSION_PREFIX: &str = "v-";

// Number of aggregate-hash characters kept in a version string
pub const VERSION_HASH_LENGTH: usize = 10;

// Largest task output kept in the result cache (1 MiB)
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

// Upper bound on files hashed concurrently during one resolution
pub const DEFAULT_HASH_CONCURRENCY: usize = 64;

// Clone / fetch / ls-remote timeout in seconds
pub const DEFAULT_NETWORK_TIMEOUT_SECS: u64 = 600;

// Number of sha256(url#ref) hex characters in a checkout directory name
pub const SOURCE_KEY_HASH_LENGTH: usize = 10;
