use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

use crate::{level::LogLevel, redact::redact};

/// 色をリセットするエスケープシーケンス
pub const RESET: &str = "\u{1b}[0m";

const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// 1件のログ
#[derive(Debug, Clone)]
pub struct Record<'a> {
    pub level: LogLevel,
    pub timestamp: OffsetDateTime,
    pub context: &'a str,
    pub message: &'a str,
}

/// レベルに対応する色のエスケープシーケンスを返却する。
pub fn color(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "\u{1b}[37m",
        LogLevel::Debug => "\u{1b}[36m",
        LogLevel::Info => "\u{1b}[32m",
        LogLevel::Warn => "\u{1b}[33m",
        LogLevel::Error => "\u{1b}[31m",
        LogLevel::Fatal => "\u{1b}[35m",
    }
}

/// 現在日時を返却する。
///
/// ローカルのオフセットを取得できない場合はUTCを返却する。
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// 日時を`yyyy-MM-dd HH:mm:ss`形式で返却する。
pub fn format_timestamp(timestamp: &OffsetDateTime) -> String {
    timestamp
        .format(TIMESTAMP_FORMAT)
        .expect("Unable to format OffsetDateTime; this is a bug in monthly-rolling-logger")
}

/// ファイルに記録する行を作成する。
///
/// 行は`[<LEVEL>] [<yyyy-MM-dd HH:mm:ss>] [<context>]: <message>`となり、
/// メッセージの機密情報はマスクされる。
pub fn render_for_file(record: &Record<'_>) -> String {
    format!(
        "[{}] [{}] [{}]: {}",
        record.level,
        format_timestamp(&record.timestamp),
        record.context,
        redact(record.message)
    )
}

/// 標準出力に表示する行を作成する。
///
/// ファイルに記録する行を、レベルの色とリセットで囲んだものになる。
pub fn render_for_console(record: &Record<'_>) -> String {
    render_both(record).0
}

/// 標準出力に表示する行とファイルに記録する行を、一度の組み立てで作成する。
pub(crate) fn render_both(record: &Record<'_>) -> (String, String) {
    let line = render_for_file(record);
    let console = format!("{}{}{}", color(record.level), line, RESET);
    (console, line)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn record<'a>(level: LogLevel, message: &'a str) -> Record<'a> {
        Record {
            level,
            timestamp: datetime!(2024-06-15 09:05:03 +09:00),
            context: "AuthService",
            message,
        }
    }

    #[test]
    fn test_render_for_file() {
        let line = render_for_file(&record(LogLevel::Info, "user signed in"));
        assert_eq!(line, "[INFO] [2024-06-15 09:05:03] [AuthService]: user signed in");
    }

    #[test]
    fn test_render_for_console_wraps_file_line() {
        let record = record(LogLevel::Warn, "password=abc123 rejected");
        let console = render_for_console(&record);
        assert_eq!(
            console,
            "\u{1b}[33m[WARN] [2024-06-15 09:05:03] [AuthService]: password=***** rejected\u{1b}[0m"
        );

        // 色を取り除いた範囲がファイルの行と一致する
        let start = console.find("[WARN").unwrap();
        let end = console.rfind(RESET).unwrap();
        assert_eq!(&console[start..end], render_for_file(&record));
    }

    #[test]
    fn test_every_level_has_distinct_color() {
        let mut colors: Vec<_> = LogLevel::ALL.iter().map(|l| color(*l)).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), LogLevel::ALL.len());
        assert!(!colors.contains(&RESET));
    }
}
