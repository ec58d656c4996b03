use std::path::PathBuf;
use std::str::FromStr;

use gymar_core::qr::DEFAULT_AR_BASE_URL;

/// A configuration variable was set but could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("{key}={value:?} is invalid: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Server configuration.
///
/// Every field has a development default; production overrides them
/// through the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins (comma-separated in `CORS_ORIGINS`).
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Root of the statically served public assets.
    pub public_dir: PathBuf,
    /// Sub-directory of `public_dir` holding QR artifacts. Also the URL
    /// prefix they are served under.
    pub qr_subdir: String,
    /// Prefix of the deep links encoded in QR codes.
    pub ar_base_url: String,
}

impl ServerConfig {
    /// Read configuration from the environment.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `PUBLIC_DIR`           | `./public`                 |
    /// | `QR_CODE_SUBDIR`       | `qrcodes`                  |
    /// | `AR_BASE_URL`          | `https://gymar.app/ar`     |
    pub fn from_env() -> Result<Self, ConfigError> {
        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:3000".to_string())?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host: env_or("HOST", "0.0.0.0".to_string())?,
            port: env_or("PORT", 3000)?,
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30)?,
            public_dir: env_or("PUBLIC_DIR", PathBuf::from("./public"))?,
            qr_subdir: qr_subdir(env_or("QR_CODE_SUBDIR", "qrcodes".to_string())?)?,
            ar_base_url: env_or("AR_BASE_URL", DEFAULT_AR_BASE_URL.to_string())?,
        })
    }

    /// Directory QR artifacts are written to.
    pub fn qr_dir(&self) -> PathBuf {
        self.public_dir.join(&self.qr_subdir)
    }
}

/// The QR sub-directory doubles as a URL prefix, so it cannot be empty or
/// the root. Surrounding slashes are dropped.
fn qr_subdir(value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError {
            key: "QR_CODE_SUBDIR",
            value,
            reason: "must name a sub-directory, not the root".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn env_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value.parse().map_err(|e: T::Err| ConfigError {
            key,
            reason: e.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}
