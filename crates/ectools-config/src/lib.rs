pub mod error;

pub use error::*;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 設定ファイルパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "ECTOOLS_CONFIG_PATH";

const LOCAL_CANDIDATES: [&str; 2] = ["ectools.yaml", ".ectools.yaml"];
const GLOBAL_FILE: &str = "config.yaml";

/// ectools の設定
///
/// ```yaml
/// region: ap-northeast-1
/// profile: dev
/// launch:
///   template: devserver
///   count: 2
///   instance_type: c7i.large
///   security_group_ids: [sg-0123]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EctoolsConfig {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub launch: LaunchDefaults,
}

/// `ectools launch` のデフォルト値
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LaunchDefaults {
    pub template: Option<String>,
    pub count: Option<u32>,
    pub instance_type: Option<String>,
    pub key_name: Option<String>,
    pub subnet_id: Option<String>,
    pub security_group_ids: Vec<String>,
    pub iam_instance_profile: Option<String>,
}

/// 読み込んだ設定と、その読み込み元
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: EctoolsConfig,
    pub source: Option<PathBuf>,
}

/// ectools のグローバル設定ディレクトリ (~/.config/ectools)
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("ectools"))
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 ECTOOLS_CONFIG_PATH (直接パス指定、存在しなければエラー)
/// 2. カレントディレクトリ: ectools.yaml, .ectools.yaml
/// 3. ~/.config/ectools/config.yaml (グローバル設定)
///
/// 見つからない場合は `Ok(None)`
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::ExplicitPathNotFound(path));
    }

    let current_dir = std::env::current_dir()?;
    for filename in &LOCAL_CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join(GLOBAL_FILE);
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// 指定したファイルから設定を読み込む
pub fn load_from(path: &Path) -> Result<EctoolsConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// 設定ファイルを探して読み込む。見つからなければデフォルト値
pub fn load() -> Result<LoadedConfig> {
    match find_config_file()? {
        Some(path) => Ok(LoadedConfig {
            config: load_from(&path)?,
            source: Some(path),
        }),
        None => Ok(LoadedConfig::default()),
    }
}

fn parse(content: &str) -> std::result::Result<EctoolsConfig, serde_yaml::Error> {
    // 空ファイルはデフォルト扱い
    if content.trim().is_empty() {
        return Ok(EctoolsConfig::default());
    }
    serde_yaml::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_parse_full_config() {
        let config = parse(
            r#"
region: ap-northeast-1
profile: dev
launch:
  template: devserver
  count: 2
  instance_type: c7i.large
  security_group_ids:
    - sg-0123
"#,
        )
        .unwrap();

        assert_eq!(config.region.as_deref(), Some("ap-northeast-1"));
        assert_eq!(config.profile.as_deref(), Some("dev"));
        assert_eq!(config.launch.template.as_deref(), Some("devserver"));
        assert_eq!(config.launch.count, Some(2));
        assert_eq!(config.launch.instance_type.as_deref(), Some("c7i.large"));
        assert_eq!(config.launch.security_group_ids, vec!["sg-0123"]);
        assert!(config.launch.key_name.is_none());
    }

    #[test]
    fn test_parse_partial_and_empty() {
        let config = parse("region: us-west-2\n").unwrap();
        assert_eq!(config.region.as_deref(), Some("us-west-2"));
        assert_eq!(config.launch, LaunchDefaults::default());

        assert_eq!(parse("").unwrap(), EctoolsConfig::default());
        assert_eq!(parse("  \n").unwrap(), EctoolsConfig::default());
    }

    #[test]
    fn test_load_from_invalid_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ectools.yaml");
        fs::write(&path, "launch: [not, a, map]").unwrap();

        match load_from(&path) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_find_config_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("ectools.yaml"), "region: us-east-1\n").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = temp_env::with_var_unset(CONFIG_PATH_ENV, find_config_file);

        std::env::set_current_dir(original_dir).unwrap();

        let path = result.unwrap().unwrap();
        assert!(path.ends_with("ectools.yaml"));
    }

    #[test]
    #[serial]
    fn test_visible_file_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("ectools.yaml"), "// visible").unwrap();
        fs::write(temp_dir.path().join(".ectools.yaml"), "// hidden").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = temp_env::with_var_unset(CONFIG_PATH_ENV, find_config_file);

        std::env::set_current_dir(original_dir).unwrap();

        // ectools.yaml が優先される
        let path = result.unwrap().unwrap();
        assert!(path.ends_with("ectools.yaml"));
        assert!(!path.ends_with(".ectools.yaml"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "profile: ops\n").unwrap();

        temp_env::with_var(CONFIG_PATH_ENV, Some(&config_path), || {
            let loaded = load().unwrap();
            assert_eq!(loaded.source.as_deref(), Some(config_path.as_path()));
            assert_eq!(loaded.config.profile.as_deref(), Some("ops"));
        });
    }

    #[test]
    #[serial]
    fn test_find_config_file_env_var_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("nope.yaml");

        temp_env::with_var(CONFIG_PATH_ENV, Some(&missing), || {
            let result = find_config_file();
            assert!(matches!(result, Err(ConfigError::ExplicitPathNotFound(p)) if p == missing));
        });
    }

    #[test]
    #[serial]
    #[cfg(target_os = "linux")]
    fn test_global_config() {
        let xdg = tempfile::tempdir().unwrap();
        let cwd = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        let global_dir = xdg.path().join("ectools");
        fs::create_dir_all(&global_dir).unwrap();
        fs::write(global_dir.join("config.yaml"), "region: eu-central-1\n").unwrap();

        std::env::set_current_dir(&cwd).unwrap();

        let result = temp_env::with_vars(
            [
                (CONFIG_PATH_ENV, None),
                ("XDG_CONFIG_HOME", Some(xdg.path().as_os_str())),
            ],
            load,
        );

        std::env::set_current_dir(original_dir).unwrap();

        let loaded = result.unwrap();
        assert_eq!(loaded.config.region.as_deref(), Some("eu-central-1"));
    }

    #[test]
    #[serial]
    #[cfg(target_os = "linux")]
    fn test_no_config_is_default() {
        let xdg = tempfile::tempdir().unwrap();
        let cwd = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        std::env::set_current_dir(&cwd).unwrap();

        let result = temp_env::with_vars(
            [
                (CONFIG_PATH_ENV, None),
                ("XDG_CONFIG_HOME", Some(xdg.path().as_os_str())),
            ],
            load,
        );

        std::env::set_current_dir(original_dir).unwrap();

        let loaded = result.unwrap();
        assert!(loaded.source.is_none());
        assert_eq!(loaded.config, EctoolsConfig::default());
    }
}
