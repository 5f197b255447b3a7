use std::fmt;

/*-------------------------------------------------------------------------------------------------
  Errors and Results
-------------------------------------------------------------------------------------------------*/

/// Errors surfaced by the crate.
///
/// A malformed entry inside an otherwise valid feed is never an [Error]; feed parsers drop such
/// entries and report how many they skipped.
#[derive(Debug)]
pub enum Error {
    /// DNS, connect, or timeout failure talking to a feed endpoint.
    Transport(reqwest::Error),

    /// The feed endpoint answered with a non-2xx status.
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Undecodable feed envelope or corrupt cache file.
    Decode(serde_json::Error),

    /// Cache file create, read, or write failure.
    Io(std::io::Error),

    /// Invalid startup configuration (duplicate sources, unusable data directory, ...).
    Config(String),
}

// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/*--------------------------------------------------------------------------------------
  Error Implementation
--------------------------------------------------------------------------------------*/

impl Error {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Error::Config(msg.into())
    }

    /// Short name of the error kind, used in log lines and the CLI.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Transport(_) => "transport error",
            Error::HttpStatus { .. } => "HTTP status error",
            Error::Decode(_) => "decode error",
            Error::Io(_) => "I/O error",
            Error::Config(_) => "configuration error",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(error) => write!(f, "{}: {}", self.kind(), error),
            Error::HttpStatus { url, status } => {
                write!(f, "{}: GET {} returned {}", self.kind(), url, status)
            }
            Error::Decode(error) => write!(f, "{}: {}", self.kind(), error),
            Error::Io(error) => write!(f, "{}: {}", self.kind(), error),
            Error::Config(msg) => write!(f, "{}: {}", self.kind(), msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(error) => Some(error),
            Error::Decode(error) => Some(error),
            Error::Io(error) => Some(error),
            Error::HttpStatus { .. } | Error::Config(_) => None,
        }
    }
}

/*--------------------------------------------------------------------------------------
  Conversions
--------------------------------------------------------------------------------------*/

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Transport(error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Decode(error)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io(error)
    }
}

/*--------------------------------------------------------------------------------------
  Log Error Function
--------------------------------------------------------------------------------------*/

#[cfg(test)]
pub(crate) fn log_error(error: &Error) {
    log::error!("{}", error);
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_http_status_display() {
        let error = Error::HttpStatus {
            url: "https://www.example.com/ranges.json".to_string(),
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = error.to_string();
        assert!(message.starts_with("HTTP status error"));
        assert!(message.contains("500"));
        assert!(error.source().is_none());
    }

    #[test]
    fn test_io_conversion_keeps_source() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = Error::from(io_error);
        assert_eq!(error.kind(), "I/O error");
        assert!(error.source().is_some());
    }

    #[test]
    fn test_decode_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Decode(_)));
    }
}
