use std::{
    fmt::Write as _,
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

use crate::{error::LogError, failure::Failure, redact::redact, retention};

const MONTH_DIRECTORY_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]");
const FILE_TOKEN_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]_[hour]_[minute]_[second]");

/// 月ごとのディレクトリに作成したファイルへ、ログを追記するアペンダー
///
/// 書き込みはミューテックスで直列化され、1件のログ（例外の情報を含む）が
/// 他のスレッドのログと混ざることはない。書き込むたびにフラッシュする。
#[derive(Debug)]
pub struct MonthlyFileAppender {
    path: PathBuf,
    writer: Mutex<File>,
}

impl MonthlyFileAppender {
    /// `MonthlyFileAppender`を作成する。
    ///
    /// 月のディレクトリを作成して、ログファイルを追記モードで開く。
    /// ファイルを開けた場合だけ、古い月のディレクトリを削除する。
    ///
    /// # 引数
    ///
    /// * log_root: 月ごとのディレクトリを作成するディレクトリ。
    /// * now: ログファイル名の日時。
    ///
    /// # 戻り値
    ///
    /// `MonthlyFileAppender`インスタンス。
    pub fn open(log_root: impl AsRef<Path>, now: &OffsetDateTime) -> Result<Self, LogError> {
        let log_root = log_root.as_ref();
        let path = create_log_filepath(log_root, now);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| LogError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = create_writer(&path).map_err(|source| LogError::OpenFile {
            path: path.clone(),
            source,
        })?;

        retention::sweep_at(log_root, now.date());

        Ok(Self {
            path,
            writer: Mutex::new(file),
        })
    }

    /// ログファイルのパスを返却する。
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 1行を追記する。
    ///
    /// `failure`が指定された場合は、続けて例外の情報を追記する。
    pub fn write_line(&self, text: &str, failure: Option<&Failure>) -> io::Result<()> {
        let mut record = String::with_capacity(text.len() + 1);
        record.push_str(text);
        record.push('\n');
        if let Some(failure) = failure {
            push_failure(&mut record, failure);
        }

        self.write_raw(record.as_bytes())
    }

    /// 例外の情報を追記する。
    pub fn write_exception(&self, failure: &Failure) -> io::Result<()> {
        let mut block = String::new();
        push_failure(&mut block, failure);

        self.write_raw(block.as_bytes())
    }

    pub fn flush(&self) -> io::Result<()> {
        self.lock().flush()
    }

    pub(crate) fn write_raw(&self, buf: &[u8]) -> io::Result<()> {
        let mut writer = self.lock();
        writer.write_all(buf)?;
        writer.flush()
    }

    fn lock(&self) -> MutexGuard<'_, File> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn push_failure(buf: &mut String, failure: &Failure) {
    let _ = writeln!(buf, "Exception: {}", redact(failure.description()));
    for frame in failure.frames() {
        let _ = writeln!(buf, "\tat {}", redact(frame));
    }
}

/// ログファイルパスを作成して返却する。
///
/// ログファイルパスは、`{log_root}/<yyyy-MM>/<yyyy-MM-dd_HH_mm_ss>.txt`となる。
///
/// # 引数
///
/// - log_root: 月ごとのディレクトリを作成するディレクトリ。
/// - now: ファイルの日時。
///
/// # 戻り値
///
/// ログファイルパス。
pub fn create_log_filepath(log_root: &Path, now: &OffsetDateTime) -> PathBuf {
    log_root
        .join(create_month_directory_name(now))
        .join(create_log_filename(now))
}

fn create_month_directory_name(now: &OffsetDateTime) -> String {
    now.format(MONTH_DIRECTORY_FORMAT)
        .expect("Unable to format OffsetDateTime; this is a bug in monthly-rolling-logger")
}

fn create_log_filename(now: &OffsetDateTime) -> String {
    let token = now
        .format(FILE_TOKEN_FORMAT)
        .expect("Unable to format OffsetDateTime; this is a bug in monthly-rolling-logger");

    format!("{}.txt", token)
}

/// ライターを作成する。
///
/// # 引数
///
/// * path: ログファイルパス。
///
/// # 戻り値
///
/// `File`インスタンス。
fn create_writer(path: &Path) -> io::Result<File> {
    OpenOptions::new().append(true).create(true).open(path)
}
