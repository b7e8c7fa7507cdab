use std::{
    env,
    path::{Path, PathBuf},
};

use crate::{error::LogError, level::LogLevel};

/// ログディレクトリを上書きする環境変数
pub const LOG_DIR_VAR: &str = "MRLOG_DIR";
/// 初期の最小レベルを上書きする環境変数
pub const LOG_LEVEL_VAR: &str = "MRLOG_LEVEL";

const DEFAULT_LOG_DIRECTORY: &str = "logs";

/// ロガーの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// 月ごとのディレクトリを作成するディレクトリ
    pub log_root: PathBuf,
    /// 初期の最小レベル
    pub level: LogLevel,
}

impl Default for LogConfig {
    /// カレントディレクトリの`logs`ディレクトリに、すべてのレベルを記録する設定を返却する。
    fn default() -> Self {
        let log_root = env::current_dir()
            .map(|dir| dir.join(DEFAULT_LOG_DIRECTORY))
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_DIRECTORY));

        Self {
            log_root,
            level: LogLevel::default(),
        }
    }
}

impl LogConfig {
    pub fn new(log_root: impl AsRef<Path>) -> Self {
        Self {
            log_root: log_root.as_ref().to_path_buf(),
            level: LogLevel::default(),
        }
    }

    pub fn with_log_root(mut self, log_root: impl AsRef<Path>) -> Self {
        self.log_root = log_root.as_ref().to_path_buf();
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// 既定の設定を、環境変数`MRLOG_DIR`と`MRLOG_LEVEL`で上書きした設定を返却する。
    ///
    /// # 戻り値
    ///
    /// 設定。`MRLOG_LEVEL`を解析できない場合はエラー。
    pub fn from_env() -> Result<Self, LogError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LogError> {
        let mut config = LogConfig::default();
        if let Some(dir) = lookup(LOG_DIR_VAR).filter(|dir| !dir.trim().is_empty()) {
            config.log_root = PathBuf::from(dir);
        }
        if let Some(level) = lookup(LOG_LEVEL_VAR) {
            config.level = level.parse()?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert!(config.log_root.ends_with("logs"));
        assert_eq!(config.level, LogLevel::Trace);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config =
            LogConfig::from_lookup(lookup(&[(LOG_DIR_VAR, "/var/log/app"), (LOG_LEVEL_VAR, "info")]))
                .unwrap();
        assert_eq!(config.log_root, PathBuf::from("/var/log/app"));
        assert_eq!(config.level, LogLevel::Info);
    }

    #[test]
    fn test_from_lookup_rejects_unknown_level() {
        let result = LogConfig::from_lookup(lookup(&[(LOG_LEVEL_VAR, "loud")]));
        assert!(matches!(result, Err(LogError::UnknownLevel(_))));
    }

    #[test]
    fn test_builder() {
        let config = LogConfig::new("a").with_log_root("b").with_level(LogLevel::Error);
        assert_eq!(config.log_root, PathBuf::from("b"));
        assert_eq!(config.level, LogLevel::Error);
    }
}
