use std::{error::Error, fmt};

/// ログに添える例外の情報
///
/// 説明と、スタックの各フレームをもつ。
/// `std::error::Error`から作成した場合は、`source()`の連鎖をフレームとする。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    description: String,
    frames: Vec<String>,
}

impl Failure {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            frames: Vec::new(),
        }
    }

    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.frames.push(frame.into());
        self
    }

    /// エラーとその原因の連鎖から`Failure`を作成する。
    pub fn from_error(error: &(dyn Error + 'static)) -> Self {
        let mut failure = Failure::new(error.to_string());
        let mut source = error.source();
        while let Some(cause) = source {
            failure.frames.push(cause.to_string());
            source = cause.source();
        }
        failure
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// 説明と、タブと`at `を前置したフレームを改行で連結して返却する。
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)?;
        for frame in &self.frames {
            write!(f, "\n\tat {}", frame)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[derive(Debug)]
    struct Wrapped(io::Error);

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("session store unavailable")
        }
    }

    impl Error for Wrapped {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_from_error_collects_sources() {
        let error = Wrapped(io::Error::new(io::ErrorKind::Other, "connection reset"));
        let failure = Failure::from_error(&error);

        assert_eq!(failure.description(), "session store unavailable");
        assert_eq!(failure.frames(), ["connection reset".to_string()]);
        assert_eq!(
            failure.render(),
            "session store unavailable\n\tat connection reset"
        );
    }

    #[test]
    fn test_render_without_frames() {
        assert_eq!(Failure::new("boom").render(), "boom");
    }
}
