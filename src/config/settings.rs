//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_IMAGE_FOLDER, DEFAULT_IMAGE_UPLOAD_BASE_URL,
    DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    MAX_JWT_EXPIRATION_HOURS, MIN_JWT_SECRET_LENGTH,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub image_store: ImageStoreConfig,
}

/// Credentials and placement for the external image host.
#[derive(Clone)]
pub struct ImageStoreConfig {
    pub cloud_name: String,
    pub api_key: String,
    api_secret: String,
    pub folder: String,
    pub base_url: String,
    pub signature_algorithm: SignatureAlgorithm,
}

/// Digest the image host expects on signed uploads.
///
/// Must match the account setting on the host; SHA-1 is the host default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl std::str::FromStr for SignatureAlgorithm {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            other => Err(format!("unknown signature algorithm: {other}")),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("image_store", &self.image_store)
            .finish()
    }
}

impl std::fmt::Debug for ImageStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageStoreConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .field("folder", &self.folder)
            .field("base_url", &self.base_url)
            .field("signature_algorithm", &self.signature_algorithm)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is not set or is too short (security requirement).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        // PORT wins over SERVER_PORT so hosted platforms can inject it
        let server_port = env::var("PORT")
            .or_else(|_| env::var("SERVER_PORT"))
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SERVER_PORT);

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
            jwt_expiration_hours: parse_expiration_hours(env::var("JWT_EXPIRATION_HOURS").ok()),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port,
            image_store: ImageStoreConfig::from_env(),
        }
    }

    /// Build a configuration with defaults for everything except the
    /// database URL and signing secret.
    pub fn new(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            image_store: ImageStoreConfig::new("", "", ""),
        }
    }

    /// Replace the image host settings.
    pub fn with_image_store(mut self, image_store: ImageStoreConfig) -> Self {
        self.image_store = image_store;
        self
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Token lifetime from the environment.
///
/// # Arguments
/// * `raw` - Value of `JWT_EXPIRATION_HOURS`, if set
///
/// # Returns
/// The parsed hours when they fall within `1..=MAX_JWT_EXPIRATION_HOURS`,
/// otherwise the default lifetime
fn parse_expiration_hours(raw: Option<String>) -> i64 {
    let Some(raw) = raw else {
        return DEFAULT_JWT_EXPIRATION_HOURS;
    };

    match raw.trim().parse::<i64>() {
        Ok(hours) if (1..=MAX_JWT_EXPIRATION_HOURS).contains(&hours) => hours,
        _ => {
            tracing::warn!(
                value = %raw,
                "JWT_EXPIRATION_HOURS must be between 1 and {}, using {}",
                MAX_JWT_EXPIRATION_HOURS,
                DEFAULT_JWT_EXPIRATION_HOURS
            );
            DEFAULT_JWT_EXPIRATION_HOURS
        }
    }
}

impl ImageStoreConfig {
    /// Image host settings with the default folder and API base URL.
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            folder: DEFAULT_IMAGE_FOLDER.to_string(),
            base_url: DEFAULT_IMAGE_UPLOAD_BASE_URL.to_string(),
            signature_algorithm: SignatureAlgorithm::default(),
        }
    }

    fn from_env() -> Self {
        let mut settings = Self::new(
            env::var("CLOUD_NAME").unwrap_or_default(),
            env::var("API_KEY").unwrap_or_default(),
            env::var("API_SECRET").unwrap_or_default(),
        );
        if let Ok(folder) = env::var("IMAGE_FOLDER") {
            settings.folder = folder;
        }
        if let Ok(base_url) = env::var("IMAGE_UPLOAD_BASE_URL") {
            settings.base_url = base_url;
        }
        if let Ok(algorithm) = env::var("IMAGE_SIGNATURE_ALGORITHM") {
            match algorithm.parse() {
                Ok(algorithm) => settings.signature_algorithm = algorithm,
                Err(e) => tracing::warn!("{e}, signing with {:?}", settings.signature_algorithm),
            }
        }
        settings
    }

    /// Whether credentials for the image host are present.
    pub fn is_configured(&self) -> bool {
        !self.cloud_name.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    /// Get the API secret used to sign upload requests.
    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    /// Endpoint accepting image uploads for the configured cloud.
    pub fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.base_url.trim_end_matches('/'),
            self.cloud_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::new("postgres://user:pw@db/shop", "a-very-long-secret-value-for-tests")
            .with_image_store(ImageStoreConfig::new("demo", "key-123", "secret-456"));
        let debug = format!("{:?}", config);

        assert!(!debug.contains("a-very-long-secret"));
        assert!(!debug.contains("user:pw"));
        assert!(!debug.contains("secret-456"));
        assert!(debug.contains("demo"));
    }

    #[test]
    fn test_upload_url_trims_trailing_slash() {
        let mut store = ImageStoreConfig::new("demo", "k", "s");
        store.base_url = "http://localhost:9000/v1_1/".to_string();
        assert_eq!(store.upload_url(), "http://localhost:9000/v1_1/demo/image/upload");
    }

    #[test]
    fn test_expiration_hours_out_of_range_fall_back() {
        assert_eq!(parse_expiration_hours(None), DEFAULT_JWT_EXPIRATION_HOURS);
        assert_eq!(parse_expiration_hours(Some("48".into())), 48);
        assert_eq!(parse_expiration_hours(Some("0".into())), DEFAULT_JWT_EXPIRATION_HOURS);
        assert_eq!(
            parse_expiration_hours(Some("9223372036854775807".into())),
            DEFAULT_JWT_EXPIRATION_HOURS
        );
        assert_eq!(parse_expiration_hours(Some("soon".into())), DEFAULT_JWT_EXPIRATION_HOURS);
    }

    #[test]
    fn test_signature_algorithm_defaults_to_sha1() {
        assert_eq!(
            ImageStoreConfig::new("demo", "k", "s").signature_algorithm,
            SignatureAlgorithm::Sha1
        );
        assert_eq!("SHA256".parse(), Ok(SignatureAlgorithm::Sha256));
        assert!("md5".parse::<SignatureAlgorithm>().is_err());
    }

    #[test]
    fn test_image_store_configured_requires_all_credentials() {
        assert!(ImageStoreConfig::new("demo", "k", "s").is_configured());
        assert!(!ImageStoreConfig::new("demo", "", "s").is_configured());
    }
}
