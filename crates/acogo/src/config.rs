//! CLI configuration: thin wrapper around `acogo_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--api-base, --token, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use acogo_core::{PortFilter, SessionConfig};

use crate::cli::{GlobalOpts, PortFilterArg};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use acogo_config::{
    Config, Profile, config_path, load_config_or_default, save_config, store_token,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `SessionConfig` from the config file, profile, and CLI overrides.
pub fn build_session_config(global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut session = if let Some(profile) = cfg.profiles.get(&profile_name) {
        let token = match global.token {
            Some(ref token) => SecretString::from(token.clone()),
            None => acogo_config::resolve_token(profile, &profile_name)?,
        };
        acogo_config::session_config(profile, token, &cfg.defaults)?
    } else {
        // No profile -- the token has to come from the flag / env var.
        let token = global
            .token
            .as_ref()
            .ok_or_else(|| CliError::NoCredentials {
                profile: profile_name.clone(),
            })?;
        let mut session = SessionConfig::new(SecretString::from(token.clone()));
        session.timeout = Duration::from_secs(cfg.defaults.timeout);
        session
    };

    if let Some(ref base) = global.api_base {
        url::Url::parse(base).map_err(|_| CliError::Validation {
            field: "api-base".into(),
            reason: format!("invalid URL: {base}"),
        })?;
        session.api_base.clone_from(base);
    }
    if let Some(secs) = global.timeout {
        session.timeout = Duration::from_secs(secs);
    }

    Ok(session)
}

impl From<PortFilterArg> for PortFilter {
    fn from(arg: PortFilterArg) -> Self {
        match arg {
            PortFilterArg::DescribedOrUnknown => Self::DescribedOrUnknown,
            PortFilterArg::All => Self::All,
            PortFilterArg::DescribedOnly => Self::DescribedOnly,
        }
    }
}
