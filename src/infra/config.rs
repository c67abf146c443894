/// Placeholder secret used when `MCP_BEARER_TOKEN` is unset. Insecure by
/// definition; the boot path warns about it but never refuses to start.
pub const DEFAULT_BEARER_TOKEN: &str = "default-secret-token-change-me";

pub struct Config {
    pub port: u16,
    pub bearer_token: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8000);
        let bearer_token = std::env::var("MCP_BEARER_TOKEN")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BEARER_TOKEN.into());

        Self { port, bearer_token }
    }

    pub fn uses_default_token(&self) -> bool {
        self.bearer_token == DEFAULT_BEARER_TOKEN
    }
}
