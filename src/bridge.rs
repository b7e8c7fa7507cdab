//! `tracing-subscriber`の`fmt`レイヤーから、月ごとのログファイルに書き込むための実装

use std::io;

use tracing_subscriber::fmt::MakeWriter;

use crate::{
    logger::{report_write_error, Core, LogSystem},
    redact::redact,
};

/// `fmt`レイヤーが1件のイベントごとに作成するライター
///
/// 受け取ったバイト列の機密情報をマスクして、ログファイルに追記する。
pub struct SinkWriter<'a> {
    core: &'a Core,
}

impl<'a> MakeWriter<'a> for LogSystem {
    type Writer = SinkWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter { core: self.core() }
    }
}

impl io::Write for SinkWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(sink) = self.core.sink() {
            let text = String::from_utf8_lossy(buf);
            if let Err(e) = sink.write_raw(redact(&text).as_bytes()) {
                report_write_error(&e);
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.core.sink() {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::{config::LogConfig, level::LogLevel};

    use super::*;

    #[test]
    fn test_tracing_events_reach_log_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = LogConfig::new(temp_dir.path()).with_level(LogLevel::Info);
        let system = LogSystem::with_console(config, io::sink()).unwrap();

        let subscriber = tracing_subscriber::fmt()
            .with_writer(system.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("bridged login password=hunter2");
        });
        system.logger("Direct").info("after bridge");

        let contents = fs::read_to_string(system.log_file_path().unwrap()).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].ends_with("bridged login password=*****"));
        assert!(lines[1].starts_with("[INFO] ["));
        assert!(!contents.contains("hunter2"));
    }
}
