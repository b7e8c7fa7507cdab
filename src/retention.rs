use std::{fs, path::Path};

use once_cell::sync::Lazy;
use regex::Regex;
use time::Date;

use crate::format::now;

/// 残しておく過去の月数
///
/// 今月と、この月数分の過去の月のディレクトリを残す。
pub const RETAINED_MONTHS: i32 = 2;

static MONTH_DIRECTORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})$").expect(
        "Unable to compile the month directory pattern; this is a bug in monthly-rolling-logger",
    )
});

/// 古い月のディレクトリを削除する。
///
/// # 引数
///
/// - log_root: 月ごとのディレクトリを含むディレクトリ。
///
/// # 戻り値
///
/// 削除したディレクトリの数。
pub fn sweep(log_root: &Path) -> usize {
    sweep_at(log_root, now().date())
}

/// `today`を基準に、古い月のディレクトリを削除する。
///
/// `yyyy-MM`形式の名前をもつディレクトリのうち、`today`の月から`RETAINED_MONTHS`ヶ月より前の
/// ディレクトリを、中身ごと削除する。形式に合わない名前のディレクトリやファイルは無視する。
/// 個々の削除の失敗も無視する。
///
/// # 引数
///
/// - log_root: 月ごとのディレクトリを含むディレクトリ。
/// - today: 基準日。
///
/// # 戻り値
///
/// 削除したディレクトリの数。
pub fn sweep_at(log_root: &Path, today: Date) -> usize {
    let entries = match fs::read_dir(log_root) {
        Ok(entries) => entries,
        Err(_) => return 0,
    };
    let cutoff = month_index(today.year(), u8::from(today.month())) - RETAINED_MONTHS;

    let mut deleted = 0;
    for entry in entries.flatten() {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }
        let name = entry.file_name();
        let Some((year, month)) = name.to_str().and_then(parse_month_directory) else {
            continue;
        };
        if month_index(year, month) < cutoff {
            delete_tree(&entry.path());
            if !entry.path().exists() {
                deleted += 1;
            }
        }
    }

    deleted
}

/// ディレクトリ名から年と月を取り出す。
fn parse_month_directory(name: &str) -> Option<(i32, u8)> {
    let captures = MONTH_DIRECTORY.captures(name)?;
    let year = captures[1].parse().ok()?;
    let month = captures[2].parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

fn month_index(year: i32, month: u8) -> i32 {
    year * 12 + i32::from(month) - 1
}

/// 子を先に削除してから、パスを削除する。
fn delete_tree(path: &Path) {
    if let Ok(entries) = fs::read_dir(path) {
        for entry in entries.flatten() {
            let child = entry.path();
            match entry.file_type() {
                Ok(t) if t.is_dir() => delete_tree(&child),
                _ => {
                    let _ = fs::remove_file(&child);
                }
            }
        }
    }
    let _ = fs::remove_dir(path);
}
