use crate::config::{
    default_host, default_max_body_bytes, default_port, default_script_path, QuillConfig,
};
use crate::errors::{QuillError, QuillResult};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "console-quill.toml";
pub const ENV_PREFIX: &str = "CONSOLE_QUILL_";

#[derive(Serialize)]
struct QuillConfigDefaults {
    host: String,
    port: u16,
    script_path: PathBuf,
    access_log: bool,
    max_body_bytes: usize,
}

impl Default for QuillConfigDefaults {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            script_path: default_script_path(),
            access_log: false,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logfile: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_log: Option<bool>,
}

/// Merge defaults, the TOML file, `CONSOLE_QUILL_*` env vars and CLI flags,
/// in that order, then validate the result.
///
/// With `None` the default `console-quill.toml` is read if present. An
/// explicitly named file must exist.
pub fn load_config(config_file: Option<&Path>, overrides: &CliOverrides) -> QuillResult<QuillConfig> {
    let toml_path = match config_file {
        Some(path) if !path.is_file() => {
            return Err(QuillError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        Some(path) => path,
        None => Path::new(DEFAULT_CONFIG_FILE),
    };

    let figment = Figment::from(Serialized::defaults(QuillConfigDefaults::default()))
        .merge(Toml::file(toml_path))
        .merge(Env::prefixed(ENV_PREFIX))
        .merge(Serialized::defaults(overrides));

    let config: QuillConfig = figment.extract()?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn with_logfile(path: &str) -> CliOverrides {
        CliOverrides {
            logfile: Some(PathBuf::from(path)),
            ..CliOverrides::default()
        }
    }

    #[test]
    fn defaults_apply_when_only_logfile_is_given() {
        Jail::expect_with(|_jail| {
            let config = load_config(None, &with_logfile("quill.log"))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.logfile, PathBuf::from("quill.log"));
            assert_eq!(config.port, 9876);
            assert_eq!(config.host, "localhost");
            assert!(!config.access_log);
            Ok(())
        });
    }

    #[test]
    fn file_then_env_then_cli_take_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                    logfile = "from-file.log"
                    port = 7000
                    host = "127.0.0.1"
                    access_log = true
                "#,
            )?;
            jail.set_env("CONSOLE_QUILL_PORT", "7100");

            let from_env = load_config(None, &CliOverrides::default())
                .map_err(|e| e.to_string())?;
            assert_eq!(from_env.logfile, PathBuf::from("from-file.log"));
            assert_eq!(from_env.port, 7100);
            assert_eq!(from_env.host, "127.0.0.1");
            assert!(from_env.access_log);

            let overrides = CliOverrides {
                logfile: Some(PathBuf::from("from-cli.log")),
                port: Some(7200),
                ..CliOverrides::default()
            };
            let from_cli = load_config(None, &overrides)
                .map_err(|e| e.to_string())?;
            assert_eq!(from_cli.logfile, PathBuf::from("from-cli.log"));
            assert_eq!(from_cli.port, 7200);
            // an absent flag leaves the file's setting alone
            assert!(from_cli.access_log);

            let disabled = CliOverrides {
                access_log: Some(false),
                ..overrides
            };
            let from_cli = load_config(None, &disabled).map_err(|e| e.to_string())?;
            assert!(!from_cli.access_log);
            Ok(())
        });
    }

    #[test]
    fn missing_logfile_fails_fast() {
        Jail::expect_with(|_jail| {
            let result = load_config(None, &CliOverrides::default());
            assert!(result.is_err());
            assert!(result.unwrap_err().to_string().contains("logfile"));
            Ok(())
        });
    }

    #[test]
    fn explicit_config_file_must_exist() {
        Jail::expect_with(|_jail| {
            let result = load_config(Some(Path::new("missing.toml")), &with_logfile("quill.log"));
            let err = result.unwrap_err();
            assert!(matches!(err, QuillError::Config { .. }));
            assert!(err.to_string().contains("missing.toml"));
            Ok(())
        });
    }

    #[test]
    fn explicit_config_file_is_read() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "port = 7300")?;
            let config = load_config(Some(Path::new("custom.toml")), &with_logfile("quill.log"))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.port, 7300);
            Ok(())
        });
    }

    #[test]
    fn invalid_port_is_a_config_error() {
        Jail::expect_with(|jail| {
            jail.set_env("CONSOLE_QUILL_PORT", "not-a-port");
            let result = load_config(None, &with_logfile("quill.log"));
            assert!(result.is_err());
            Ok(())
        });
    }
}
