use std::{
    any::type_name,
    collections::HashMap,
    error::Error,
    fmt,
    fs,
    io::{self, Write},
    path::Path,
    sync::{
        atomic::{AtomicBool, AtomicU8, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use once_cell::sync::OnceCell;

use crate::{
    appenders::MonthlyFileAppender,
    config::LogConfig,
    error::LogError,
    failure::Failure,
    format::{self, Record},
    level::LogLevel,
};

/// レベルとファイルとロガーを共有する、ログ出力の文脈
///
/// 複製しても、複製元と同じ最小レベル、ログファイル、ロガーを共有する。
/// 最後の複製が破棄されるとき、ログファイルをフラッシュして閉じる。
#[derive(Clone)]
pub struct LogSystem {
    core: Arc<Core>,
    loggers: Arc<Mutex<HashMap<String, Arc<Logger>>>>,
}

pub(crate) struct Core {
    config: LogConfig,
    level: AtomicU8,
    sink: OnceCell<MonthlyFileAppender>,
    open_failure_reported: AtomicBool,
    console: Mutex<Box<dyn Write + Send>>,
}

impl LogSystem {
    /// 標準出力に表示する`LogSystem`を作成する。
    ///
    /// ログのルートディレクトリを作成できない場合はエラーを返却する。
    /// ログファイル自体は、最初にログを書き込むときに作成する。
    pub fn new(config: LogConfig) -> Result<Self, LogError> {
        Self::with_console(config, io::stdout())
    }

    /// 表示先を指定して`LogSystem`を作成する。
    pub fn with_console(
        config: LogConfig,
        console: impl Write + Send + 'static,
    ) -> Result<Self, LogError> {
        fs::create_dir_all(&config.log_root).map_err(|source| LogError::CreateDirectory {
            path: config.log_root.clone(),
            source,
        })?;

        let console: Box<dyn Write + Send> = Box::new(console);
        let core = Core {
            level: AtomicU8::new(config.level as u8),
            config,
            sink: OnceCell::new(),
            open_failure_reported: AtomicBool::new(false),
            console: Mutex::new(console),
        };

        Ok(Self {
            core: Arc::new(core),
            loggers: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// 環境変数で上書きした設定で`LogSystem`を作成する。
    pub fn from_env() -> Result<Self, LogError> {
        Self::new(LogConfig::from_env()?)
    }

    pub fn config(&self) -> &LogConfig {
        &self.core.config
    }

    pub fn level(&self) -> LogLevel {
        self.core.level()
    }

    /// 最小レベルを変更する。
    ///
    /// 既に取得したロガーにも、すぐに反映される。
    pub fn set_level(&self, level: LogLevel) {
        self.core.level.store(level as u8, Ordering::Relaxed);
    }

    /// コンテキスト名に対応するロガーを返却する。
    ///
    /// 同じ名前に対しては、常に同じインスタンスを返却する。
    pub fn logger(&self, name: &str) -> Arc<Logger> {
        self.cached_logger(name, name)
    }

    /// 型に対応するロガーを返却する。
    ///
    /// 型の完全なパスで区別し、コンテキスト名には型の単純名を使う。
    pub fn logger_for<T: ?Sized>(&self) -> Arc<Logger> {
        let path = type_name::<T>();
        self.cached_logger(path, simple_type_name(path))
    }

    fn cached_logger(&self, key: &str, context: &str) -> Arc<Logger> {
        let mut loggers = self.loggers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(logger) = loggers.get(key) {
            return Arc::clone(logger);
        }

        let logger = Arc::new(Logger {
            context: context.to_string(),
            core: Arc::clone(&self.core),
        });
        loggers.insert(key.to_string(), Arc::clone(&logger));
        logger
    }

    /// ログファイルを開く。
    ///
    /// 何度呼び出しても、複数のスレッドから同時に呼び出しても、ファイルは一度だけ作成される。
    /// 古い月のディレクトリの削除は、ファイルを作成するときだけ実行される。
    pub fn ensure_open(&self) -> Result<&MonthlyFileAppender, LogError> {
        self.core.ensure_open()
    }

    pub fn is_open(&self) -> bool {
        self.core.sink.get().is_some()
    }

    pub fn log_file_path(&self) -> Option<&Path> {
        self.core.sink.get().map(|sink| sink.path())
    }

    pub fn flush(&self) -> io::Result<()> {
        match self.core.sink.get() {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }

    pub(crate) fn core(&self) -> &Core {
        &self.core
    }
}

impl fmt::Debug for LogSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSystem")
            .field("config", &self.core.config)
            .field("level", &self.level())
            .field("log_file", &self.log_file_path())
            .finish()
    }
}

impl Core {
    fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Relaxed))
    }

    fn ensure_open(&self) -> Result<&MonthlyFileAppender, LogError> {
        self.sink
            .get_or_try_init(|| MonthlyFileAppender::open(&self.config.log_root, &format::now()))
    }

    /// ログファイルを返却する。開けない場合は、最初の一度だけ標準エラー出力に報告する。
    pub(crate) fn sink(&self) -> Option<&MonthlyFileAppender> {
        match self.ensure_open() {
            Ok(sink) => Some(sink),
            Err(e) => {
                if !self.open_failure_reported.swap(true, Ordering::Relaxed) {
                    eprintln!("Error opening the log file:\n{}", e);
                }
                None
            }
        }
    }

    fn print(&self, line: &str) {
        let mut console = self.console.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(console, "{}", line);
        let _ = console.flush();
    }
}

impl Drop for Core {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.get() {
            let _ = sink.flush();
        }
    }
}

pub(crate) fn report_write_error(error: &io::Error) {
    eprintln!("Error writing to the log file:\n{}", error);
}

fn simple_type_name(path: &str) -> &str {
    let base = path.split('<').next().unwrap_or(path);
    base.rsplit("::").next().unwrap_or(base)
}

/// コンテキスト名に束縛されたロガー
pub struct Logger {
    context: String,
    core: Arc<Core>,
}

impl Logger {
    pub fn context(&self) -> &str {
        &self.context
    }

    /// `level`のログが出力されるかどうかを返却する。
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.core.level()
    }

    /// ログを出力する。メッセージがない場合は`null`を出力する。
    pub fn log(&self, level: LogLevel, message: Option<&dyn fmt::Display>) {
        if !self.is_enabled(level) {
            return;
        }
        let message = message.map_or_else(|| "null".to_string(), |m| m.to_string());
        self.emit(level, &message, None);
    }

    pub fn trace(&self, message: impl fmt::Display) {
        self.log(LogLevel::Trace, Some(&message));
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(LogLevel::Debug, Some(&message));
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(LogLevel::Info, Some(&message));
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.log(LogLevel::Warn, Some(&message));
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(LogLevel::Error, Some(&message));
    }

    pub fn fatal(&self, message: impl fmt::Display) {
        self.log(LogLevel::Fatal, Some(&message));
    }

    /// エラーを添えて、`ERROR`のログを出力する。
    pub fn error_with(&self, message: impl fmt::Display, error: &(dyn Error + 'static)) {
        if !self.is_enabled(LogLevel::Error) {
            return;
        }
        self.error_with_failure(message, &Failure::from_error(error));
    }

    /// 例外の情報を添えて、`ERROR`のログを出力する。
    ///
    /// 表示する行には、メッセージに続けて例外の情報を含める。
    /// ログファイルには、行に続けて`Exception:`で始まる例外の情報を追記する。
    pub fn error_with_failure(&self, message: impl fmt::Display, failure: &Failure) {
        if !self.is_enabled(LogLevel::Error) {
            return;
        }
        let message = format!("{}\n{}", message, failure.render());
        self.emit(LogLevel::Error, &message, Some(failure));
    }

    fn emit(&self, level: LogLevel, message: &str, failure: Option<&Failure>) {
        let record = Record {
            level,
            timestamp: format::now(),
            context: &self.context,
            message,
        };
        let (console, line) = format::render_both(&record);
        self.core.print(&console);

        if let Some(sink) = self.core.sink() {
            if let Err(e) = sink.write_line(&line, failure) {
                report_write_error(&e);
            }
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("context", &self.context)
            .finish()
    }
}
