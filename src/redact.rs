use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

/// マスク後の値
pub const MASK: &str = "*****";

static SECRET_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?P<key>senha|password|token|apikey|authtoken|secret|accesstoken|refreshtoken)(?P<delim>[:=])[^&\s]+",
    )
    .expect("Unable to compile the secret pattern; this is a bug in monthly-rolling-logger")
});

/// メッセージに含まれる機密情報の値をマスクする。
///
/// `password=abc`や`token:abc`のようなキーと値の組を探して、キーと区切り文字を残したまま
/// 値を`*****`に置き換える。キーは大文字と小文字を区別せず、単語の一部には一致しない。
///
/// # 引数
///
/// - message: メッセージ。
///
/// # 戻り値
///
/// マスクしたメッセージ。マスクする値がない場合は、借用したままのメッセージ。
pub fn redact(message: &str) -> Cow<'_, str> {
    SECRET_PAIR.replace_all(message, format!("${{key}}${{delim}}{}", MASK).as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_every_key() {
        let keys = [
            "senha",
            "password",
            "token",
            "apiKey",
            "authToken",
            "secret",
            "accessToken",
            "refreshToken",
        ];
        for key in keys {
            let message = format!("login {}=abc123 done", key);
            assert_eq!(redact(&message), format!("login {}=***** done", key));
        }
    }

    #[test]
    fn test_redact_is_case_insensitive_and_keeps_delimiter() {
        assert_eq!(redact("PASSWORD:hunter2"), "PASSWORD:*****");
        assert_eq!(redact("ApiKey=k-1"), "ApiKey=*****");
    }

    #[test]
    fn test_redact_value_stops_at_ampersand_and_space() {
        assert_eq!(
            redact("GET /cb?token=abc&user=bob secret=x y"),
            "GET /cb?token=*****&user=bob secret=***** y"
        );
    }

    #[test]
    fn test_redact_ignores_keys_inside_words() {
        assert_eq!(redact("mypasswordfield=xyz"), "mypasswordfield=xyz");
        assert_eq!(redact("tokens=3 secretive=yes"), "tokens=3 secretive=yes");
    }

    #[test]
    fn test_redact_borrows_clean_message() {
        assert!(matches!(redact("nothing to hide"), Cow::Borrowed(_)));
    }
}
