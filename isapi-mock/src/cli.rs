//! Command-line arguments for isapi-mock
//!
//! Every option can also come from an `ISAPI_MOCK_*` environment variable.
//! Anything left unset falls through to the config file, then to defaults.

use std::path::PathBuf;

use clap::Parser;
use isapi_common::api::AuthMode;
use isapi_common::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(name = "isapi-mock")]
#[command(about = "Simulated ISAPI camera/NVR for exercising clients without hardware")]
#[command(version)]
pub struct Args {
    /// TOML config file
    #[arg(short, long, env = "ISAPI_MOCK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "ISAPI_MOCK_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "ISAPI_MOCK_PORT")]
    pub port: Option<u16>,

    /// Realm advertised in Digest challenges
    #[arg(long, env = "ISAPI_MOCK_REALM")]
    pub realm: Option<String>,

    /// Account name (checked in full-digest mode only)
    #[arg(short, long, env = "ISAPI_MOCK_USERNAME")]
    pub username: Option<String>,

    /// Account password (checked in full-digest mode only)
    #[arg(long, env = "ISAPI_MOCK_PASSWORD")]
    pub password: Option<String>,

    /// Credential check: shape-only or full-digest
    #[arg(long, env = "ISAPI_MOCK_AUTH_MODE")]
    pub auth_mode: Option<AuthMode>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ISAPI_MOCK_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            host: self.host.clone(),
            port: self.port,
            realm: self.realm.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            auth_mode: self.auth_mode,
            log_level: self.log_level.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const VARS: [&str; 3] = ["ISAPI_MOCK_PORT", "ISAPI_MOCK_AUTH_MODE", "ISAPI_MOCK_REALM"];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_no_arguments_leaves_everything_unset() {
        clear_env();
        let args = Args::try_parse_from(["isapi-mock"]).unwrap();
        let overrides = args.overrides();
        assert!(overrides.port.is_none());
        assert!(overrides.auth_mode.is_none());
        assert!(overrides.config_file.is_none());
    }

    #[test]
    #[serial]
    fn test_cli_arguments() {
        clear_env();
        let args = Args::try_parse_from([
            "isapi-mock",
            "--port",
            "18080",
            "--auth-mode",
            "full-digest",
            "--realm",
            "LAB",
        ])
        .unwrap();

        let overrides = args.overrides();
        assert_eq!(overrides.port, Some(18080));
        assert_eq!(overrides.auth_mode, Some(AuthMode::FullDigest));
        assert_eq!(overrides.realm.as_deref(), Some("LAB"));
    }

    #[test]
    #[serial]
    fn test_env_fills_missing_arguments() {
        clear_env();
        env::set_var("ISAPI_MOCK_PORT", "18081");
        env::set_var("ISAPI_MOCK_AUTH_MODE", "full-digest");

        let args = Args::try_parse_from(["isapi-mock"]).unwrap();
        clear_env();

        assert_eq!(args.port, Some(18081));
        assert_eq!(args.auth_mode, Some(AuthMode::FullDigest));
    }

    #[test]
    #[serial]
    fn test_cli_beats_env() {
        clear_env();
        env::set_var("ISAPI_MOCK_PORT", "18081");

        let args = Args::try_parse_from(["isapi-mock", "-p", "18082"]).unwrap();
        clear_env();

        assert_eq!(args.port, Some(18082));
    }

    #[test]
    #[serial]
    fn test_invalid_auth_mode_rejected() {
        clear_env();
        assert!(Args::try_parse_from(["isapi-mock", "--auth-mode", "basic"]).is_err());
    }
}
