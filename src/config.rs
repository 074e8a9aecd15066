use serde::Deserialize;

/// Default inter-request delay used to stay under the upstream rate limit.
pub const DEFAULT_PAGE_DELAY_MS: u64 = 1200;

/// Default and hard cap for pages fetched per search request.
pub const DEFAULT_MAX_PAGES: u32 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub apollo_api_key: String,
    pub apollo_base_url: String,
    /// Fixed delay between sequential upstream calls, in milliseconds.
    pub page_delay_ms: u64,
    /// Upper bound on pages fetched for a single search request.
    pub max_pages: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            apollo_api_key: std::env::var("APOLLO_API_KEY")
                .map_err(|_| anyhow::anyhow!("APOLLO_API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("APOLLO_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            apollo_base_url: std::env::var("APOLLO_BASE_URL")
                .unwrap_or_else(|_| "https://api.apollo.io/v1".to_string())
                .trim_end_matches('/')
                .to_string(),
            page_delay_ms: std::env::var("PAGE_DELAY_MS")
                .unwrap_or_else(|_| DEFAULT_PAGE_DELAY_MS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PAGE_DELAY_MS must be a valid number"))?,
            max_pages: std::env::var("MAX_PAGES")
                .unwrap_or_else(|_| DEFAULT_MAX_PAGES.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_PAGES must be a valid number"))
                .and_then(|n: u32| {
                    if n == 0 {
                        anyhow::bail!("MAX_PAGES must be at least 1");
                    }
                    Ok(n)
                })?,
        };

        validate_base_url(&config.apollo_base_url)?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Apollo base URL: {}", config.apollo_base_url);
        tracing::debug!("Page delay: {}ms, max pages: {}", config.page_delay_ms, config.max_pages);
        tracing::debug!("Server port: {}", config.port);

        Ok(config)
    }
}

/// The upstream base URL must parse as an absolute http(s) URL.
fn validate_base_url(raw: &str) -> anyhow::Result<()> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| anyhow::anyhow!("APOLLO_BASE_URL is not a valid URL: {}", e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => anyhow::bail!("APOLLO_BASE_URL must use http or https, got {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_accepts_http_and_https() {
        assert!(validate_base_url("https://api.apollo.io/v1").is_ok());
        assert!(validate_base_url("http://localhost:8080").is_ok());
    }

    #[test]
    fn base_url_rejects_other_schemes_and_garbage() {
        assert!(validate_base_url("ftp://api.apollo.io").is_err());
        assert!(validate_base_url("api.apollo.io/v1").is_err());
        assert!(validate_base_url("not a url").is_err());
    }
}
