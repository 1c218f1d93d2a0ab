use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use redmusical_spotify::{
    CredentialSource, Credentials, SpotifyClient, config_path, credential_sources,
};

use crate::CliError;

/// Show the first and last few characters of a secret.
fn mask_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

pub(crate) fn run_config_show() -> Result<(), CliError> {
    let path = config_path();
    log::info!("{}", "Spotify Credentials".if_supports_color(Stdout, |t| t.bold()));
    match &path {
        Some(p) if p.exists() => log::info!("  Config file: {}", p.display()),
        Some(p) => log::info!(
            "  Config file: {} {}",
            p.display(),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed())
        ),
        None => log::info!("  Config file: (no config directory)"),
    }
    crate::log_blank();

    let sources = credential_sources();
    let creds = Credentials::load().ok();
    let show = |label: &str, source: &CredentialSource, value: Option<String>| match source {
        CredentialSource::Missing => log::info!(
            "  {:<14} {}",
            label,
            "not set".if_supports_color(Stdout, |t| t.red())
        ),
        _ => log::info!(
            "  {:<14} {} {}",
            label,
            value.unwrap_or_default(),
            format!("({})", source).if_supports_color(Stdout, |t| t.dimmed())
        ),
    };
    show(
        "client_id:",
        &sources.client_id,
        creds.as_ref().map(|c| c.client_id.clone()),
    );
    show(
        "client_secret:",
        &sources.client_secret,
        creds.as_ref().map(|c| mask_value(&c.client_secret)),
    );
    Ok(())
}

pub(crate) fn run_config_path() -> Result<(), CliError> {
    let path = config_path().ok_or_else(|| CliError::config("no config directory on this system"))?;
    log::info!("{}", path.display());
    Ok(())
}

/// Request an access token to prove the credentials work.
pub(crate) fn run_config_test(quiet: bool) -> Result<(), CliError> {
    let creds = Credentials::load().map_err(|e| CliError::config(e.to_string()))?;
    let client = SpotifyClient::new(creds).map_err(|e| CliError::api(e.to_string()))?;
    let rt = super::runtime()?;

    let pb = super::spinner(quiet, "Authenticating with Spotify".to_string());
    let result = rt.block_on(client.authenticate());
    pb.finish_and_clear();
    result.map_err(|e| CliError::api(format!("Authentication failed: {}", e)))?;

    log::info!(
        "{} Credentials accepted.",
        "\u{2714}".if_supports_color(Stdout, |t| t.green())
    );
    Ok(())
}
