use serde::{Deserialize, Serialize};

use crate::urls::ApiUrls;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub sitemap: SitemapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub connection_string: Option<String>,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Public base URL of this API. Built links fall back to the bind address
    /// when unset.
    pub api_url: Option<String>,
    /// Public base URL of the viewer frontend, used for record page links.
    pub application_url: Option<String>,
    pub activities_per_page: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapConfig {
    pub output_path: String,
    pub urls_per_file: u64,
    pub gzip: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            api: ApiConfig::default(),
            sitemap: SitemapConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            max_connections: Some(20),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            application_url: None,
            activities_per_page: 100,
        }
    }
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            output_path: "./sitemap".to_string(),
            urls_per_file: 50_000,
            gzip: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("config").required(false));

        // Add environment variables with prefix "VIEWER_"
        config = config.add_source(
            config::Environment::with_prefix("VIEWER")
                .separator("_")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        anyhow::ensure!(
            app_config.api.activities_per_page >= 1,
            "activities_per_page must be at least 1"
        );
        anyhow::ensure!(
            app_config.sitemap.urls_per_file >= 1,
            "urls_per_file must be at least 1"
        );

        Ok(app_config)
    }

    /// Get the database URL from config or environment. None selects the
    /// in-memory store.
    pub fn database_url(&self) -> Option<String> {
        if let Some(connection_string) = &self.database.connection_string {
            return Some(connection_string.clone());
        }

        std::env::var("DATABASE_URL").ok()
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Base URLs for link building. Both default to the bind address so that
    /// generated links resolve against this very server.
    pub fn api_urls(&self) -> ApiUrls {
        let local = format!("http://{}", self.server_address());
        let api_url = self.api.api_url.clone().unwrap_or_else(|| local.clone());
        let application_url = self.api.application_url.clone().unwrap_or(local);
        ApiUrls::new(&api_url, &application_url)
    }
}
