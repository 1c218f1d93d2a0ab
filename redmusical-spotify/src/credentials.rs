use std::path::PathBuf;

use crate::error::ApiError;

pub const CLIENT_ID_VAR: &str = "SPOTIPY_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "SPOTIPY_CLIENT_SECRET";

/// Client-credentials pair for the Spotify Web API.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Where a credential field's value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Not set anywhere.
    Missing,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// Provenance of each credential field.
#[derive(Debug)]
pub struct CredentialSources {
    pub client_id: CredentialSource,
    pub client_secret: CredentialSource,
}

/// TOML config file format.
#[derive(Debug, Default, serde::Deserialize)]
struct ConfigFile {
    spotify: Option<SpotifyConfig>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct SpotifyConfig {
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl Credentials {
    /// Load credentials from environment variables or the config file.
    ///
    /// Priority: env vars > config file. Both fields are required.
    pub fn load() -> Result<Self, ApiError> {
        let config = load_config_file();
        Self::resolve(config.as_ref(), env_value)
    }

    fn resolve(
        config: Option<&SpotifyConfig>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ApiError> {
        let client_id = env(CLIENT_ID_VAR)
            .or_else(|| config.and_then(|c| c.client_id.clone()))
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                ApiError::Config(format!(
                    "Missing client_id. Set {CLIENT_ID_VAR} env var or add to config file"
                ))
            })?;

        let client_secret = env(CLIENT_SECRET_VAR)
            .or_else(|| config.and_then(|c| c.client_secret.clone()))
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                ApiError::Config(format!(
                    "Missing client_secret. Set {CLIENT_SECRET_VAR} env var or add to config file"
                ))
            })?;

        Ok(Self {
            client_id,
            client_secret,
        })
    }
}

/// Return the path to the credentials config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("redmusical").join("credentials.toml"))
}

/// Determine where each credential field is coming from.
pub fn credential_sources() -> CredentialSources {
    let config = load_config_file();
    sources_from(config.as_ref(), env_value)
}

fn sources_from(
    config: Option<&SpotifyConfig>,
    env: impl Fn(&str) -> Option<String>,
) -> CredentialSources {
    let client_id = if env(CLIENT_ID_VAR).is_some() {
        CredentialSource::EnvVar(CLIENT_ID_VAR)
    } else if config.and_then(|c| c.client_id.as_ref()).is_some() {
        CredentialSource::ConfigFile
    } else {
        CredentialSource::Missing
    };

    let client_secret = if env(CLIENT_SECRET_VAR).is_some() {
        CredentialSource::EnvVar(CLIENT_SECRET_VAR)
    } else if config.and_then(|c| c.client_secret.as_ref()).is_some() {
        CredentialSource::ConfigFile
    } else {
        CredentialSource::Missing
    };

    CredentialSources {
        client_id,
        client_secret,
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn load_config_file() -> Option<SpotifyConfig> {
    let path = config_path()?;
    let content = std::fs::read_to_string(&path).ok()?;
    parse_config(&content)
}

fn parse_config(content: &str) -> Option<SpotifyConfig> {
    match toml::from_str::<ConfigFile>(content) {
        Ok(config) => config.spotify,
        Err(e) => {
            log::warn!("Ignoring malformed credentials file: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn config_file_values_are_used() {
        let config = parse_config(
            "[spotify]\nclient_id = \"file-id\"\nclient_secret = \"file-secret\"\n",
        );
        let creds = Credentials::resolve(config.as_ref(), no_env).unwrap();
        assert_eq!(creds.client_id, "file-id");
        assert_eq!(creds.client_secret, "file-secret");

        let sources = sources_from(config.as_ref(), no_env);
        assert_eq!(sources.client_id, CredentialSource::ConfigFile);
    }

    #[test]
    fn env_overrides_config_file() {
        let config = parse_config("[spotify]\nclient_id = \"file-id\"\nclient_secret = \"s\"\n");
        let env = |name: &str| (name == CLIENT_ID_VAR).then(|| "env-id".to_string());
        let creds = Credentials::resolve(config.as_ref(), env).unwrap();
        assert_eq!(creds.client_id, "env-id");
        assert_eq!(creds.client_secret, "s");

        let sources = sources_from(config.as_ref(), env);
        assert_eq!(sources.client_id, CredentialSource::EnvVar(CLIENT_ID_VAR));
        assert_eq!(sources.client_secret, CredentialSource::ConfigFile);
    }

    #[test]
    fn missing_secret_is_a_config_error() {
        let config = parse_config("[spotify]\nclient_id = \"id\"\n");
        let err = Credentials::resolve(config.as_ref(), no_env).unwrap_err();
        assert!(matches!(err, ApiError::Config(ref m) if m.contains(CLIENT_SECRET_VAR)));
        assert_eq!(
            sources_from(config.as_ref(), no_env).client_secret,
            CredentialSource::Missing
        );
    }

    #[test]
    fn malformed_file_is_ignored() {
        assert!(parse_config("spotify = [").is_none());
        assert!(parse_config("").is_none());
    }
}
