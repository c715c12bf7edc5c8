use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use sendlog_core::domain::{CompanyScope, Platform};
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "sendlog";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub company_scope: Option<CompanyScope>,
    pub default_platform: Platform,
    pub matching: MatchingConfig,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Default)]
pub struct MatchingConfig {
    /// Domains never used for same-domain suggestions.
    pub ignore_domains: Vec<String>,
}

impl MatchingConfig {
    pub fn ignores(&self, domain: &str) -> bool {
        self.ignore_domains
            .iter()
            .any(|ignored| ignored.eq_ignore_ascii_case(domain.trim()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BackendConfig {
    #[default]
    Local,
    Remote {
        base_url: String,
        api_token: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
    Remote,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid company_scope value")]
    InvalidCompanyScope,
    #[error("invalid default_platform value: {0:?}")]
    InvalidPlatform(String),
    #[error("invalid matching.ignore_domains entry: {0:?}")]
    InvalidIgnoreDomain(String),
    #[error("invalid backend.{field}: {message}")]
    InvalidBackendField {
        field: &'static str,
        message: String,
    },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    company_scope: Option<String>,
    default_platform: Option<String>,
    matching: Option<MatchingFile>,
    backend: Option<BackendFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MatchingFile {
    ignore_domains: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BackendFile {
    kind: Option<BackendKind>,
    base_url: Option<String>,
    api_token: Option<String>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(scope) = parsed.company_scope {
        config.company_scope =
            Some(CompanyScope::new(&scope).map_err(|_| ConfigError::InvalidCompanyScope)?);
    }

    if let Some(platform) = parsed.default_platform {
        config.default_platform = platform
            .parse()
            .map_err(|_| ConfigError::InvalidPlatform(platform.clone()))?;
    }

    if let Some(matching) = parsed.matching {
        for raw in matching.ignore_domains.unwrap_or_default() {
            let domain = raw.trim().trim_start_matches('@').to_ascii_lowercase();
            if domain.is_empty() || domain.contains('@') || !domain.contains('.') {
                return Err(ConfigError::InvalidIgnoreDomain(raw));
            }
            if !config.matching.ignore_domains.contains(&domain) {
                config.matching.ignore_domains.push(domain);
            }
        }
    }

    if let Some(backend) = parsed.backend {
        config.backend = merge_backend(backend)?;
    }

    Ok(config)
}

fn merge_backend(backend: BackendFile) -> Result<BackendConfig> {
    match backend.kind.unwrap_or(BackendKind::Local) {
        BackendKind::Local => Ok(BackendConfig::Local),
        BackendKind::Remote => {
            let base_url = backend
                .base_url
                .map(|value| value.trim().trim_end_matches('/').to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ConfigError::InvalidBackendField {
                    field: "base_url",
                    message: "required for remote backend".to_string(),
                })?;
            if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
                return Err(ConfigError::InvalidBackendField {
                    field: "base_url",
                    message: "must be an http(s) url".to_string(),
                });
            }
            let api_token = backend
                .api_token
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty());
            Ok(BackendConfig::Remote {
                base_url,
                api_token,
            })
        }
    }
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        load_at_path, merge_config, BackendConfig, BackendFile, BackendKind, ConfigError,
        ConfigFile, MatchingFile,
    };
    use sendlog_core::domain::Platform;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn restrict_permissions(path: &Path) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path).expect("metadata").permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).expect("chmod");
        }
    }

    fn empty_file() -> ConfigFile {
        ConfigFile {
            company_scope: None,
            default_platform: None,
            matching: None,
            backend: None,
        }
    }

    #[test]
    fn merge_config_applies_values() {
        let parsed = ConfigFile {
            company_scope: Some(" acme ".to_string()),
            default_platform: Some("Outlook".to_string()),
            matching: Some(MatchingFile {
                ignore_domains: Some(vec!["@Gmail.com".to_string(), "gmail.com".to_string()]),
            }),
            backend: None,
        };
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged.company_scope.as_ref().map(|s| s.as_str()), Some("acme"));
        assert_eq!(merged.default_platform, Platform::Outlook);
        assert_eq!(merged.matching.ignore_domains, vec!["gmail.com".to_string()]);
        assert!(merged.matching.ignores("GMAIL.com"));
        assert_eq!(merged.backend, BackendConfig::Local);
    }

    #[test]
    fn defaults_keep_manual_platform_and_no_scope() {
        let merged = merge_config(empty_file()).expect("merge");
        assert!(merged.company_scope.is_none());
        assert_eq!(merged.default_platform, Platform::Manual);
        assert!(merged.matching.ignore_domains.is_empty());
    }

    #[test]
    fn remote_backend_requires_base_url() {
        let mut parsed = empty_file();
        parsed.backend = Some(BackendFile {
            kind: Some(BackendKind::Remote),
            base_url: None,
            api_token: None,
        });
        let err = merge_config(parsed).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidBackendField {
                field: "base_url",
                ..
            }
        ));
    }

    #[test]
    fn remote_backend_trims_trailing_slash() {
        let mut parsed = empty_file();
        parsed.backend = Some(BackendFile {
            kind: Some(BackendKind::Remote),
            base_url: Some("https://crm.example.com/api/".to_string()),
            api_token: Some("  ".to_string()),
        });
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(
            merged.backend,
            BackendConfig::Remote {
                base_url: "https://crm.example.com/api".to_string(),
                api_token: None,
            }
        );
    }

    #[test]
    fn invalid_ignore_domain_is_rejected() {
        let mut parsed = empty_file();
        parsed.matching = Some(MatchingFile {
            ignore_domains: Some(vec!["jane@gmail.com".to_string()]),
        });
        assert!(matches!(
            merge_config(parsed).unwrap_err(),
            ConfigError::InvalidIgnoreDomain(_)
        ));
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_at_path_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "company_scope = \"acme\"\ndefault_platform = \"gmail\"\n[matching]\nignore_domains = [\"gmail.com\"]\n",
        )
        .expect("write config");
        restrict_permissions(&path);

        let config = load_at_path(&path, true).expect("load").expect("config");
        assert_eq!(config.default_platform, Platform::Gmail);
        assert!(config.matching.ignores("gmail.com"));
    }

    #[test]
    fn load_at_path_rejects_unknown_keys() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "retry_count = 3\n").expect("write config");
        restrict_permissions(&path);

        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
