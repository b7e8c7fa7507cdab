use std::{io, path::PathBuf};

use thiserror::Error;

/// ロガーの設定と初期化で発生するエラー
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDirectory { path: PathBuf, source: io::Error },

    #[error("failed to open log file {}: {source}", path.display())]
    OpenFile { path: PathBuf, source: io::Error },

    #[error("unknown log level: {0}")]
    UnknownLevel(String),
}
