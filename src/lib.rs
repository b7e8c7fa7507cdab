//! Monthly Rolling Logger
//!
//! ----------------------------------------------------------------------------
//!
//! このクレートは、レベル付きのロガーを提供する。
//! 呼び出し元は、`LogSystem`からコンテキスト名（型名やモジュール名）に束縛された
//! `Logger`を取得して、`TRACE`から`FATAL`までのレベルでメッセージを出力する。
//!
//! 出力されたメッセージは、以下の順に処理される。
//!
//! - 最小レベルに満たないメッセージは、何もせずに破棄する。
//! - パスワードやトークンなどの機密情報をマスクする。
//! - 色付きの行を標準出力に出力する。
//! - 色を除いた行を、月ごとのログファイル`<logs>/<yyyy-MM>/<timestamp>.txt`に追記する。
//!
//! ログファイルは、最初に書き込むときに一度だけ作成される。
//! 作成するとき、2ヶ月より前の月のディレクトリを削除する。

pub mod appenders;
pub mod bridge;
pub mod config;
pub mod error;
pub mod failure;
pub mod format;
pub mod level;
pub mod logger;
pub mod redact;
pub mod retention;

pub use appenders::MonthlyFileAppender;
pub use config::LogConfig;
pub use error::LogError;
pub use failure::Failure;
pub use level::LogLevel;
pub use logger::{LogSystem, Logger};
