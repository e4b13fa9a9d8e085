//! MongoDB configuration from the environment.

const DEFAULT_URI: &str = "mongodb://localhost:27017";
const DEFAULT_DATABASE: &str = "mcp_database";
const DEFAULT_COLLECTION: &str = "embeddings";

/// Read once at startup.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    /// Collection used when a call omits the `collection` argument.
    pub default_collection: String,
}

impl MongoConfig {
    pub fn from_env() -> Self {
        Self {
            uri: var_or("MONGODB_URI", DEFAULT_URI),
            database: var_or("MONGODB_DATABASE", DEFAULT_DATABASE),
            default_collection: var_or("MONGODB_COLLECTION", DEFAULT_COLLECTION),
        }
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            default_collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
