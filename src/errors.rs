use std::fmt;

/// Error type carried to the CLI, each variant mapping to an exit code
#[derive(Debug)]
pub enum PulseprobeError {
    /// Element never became visible within its bounded wait (exit code 2)
    ElementNotVisible { element: String, timeout_ms: u64 },
    /// Page reported a color scheme other than light or dark (exit code 3)
    UnexpectedTheme(String),
    /// WebDriver connection failed (exit code 4)
    WebDriverFailed(String),
    /// Operation timeout (exit code 5)
    Timeout(String),
    /// Tooltip content could not be parsed (exit code 6)
    InvalidTooltip(String),
    /// One or more scenarios failed their assertions (exit code 7)
    AssertionFailed(String),
    /// Generic error (exit code 1)
    Other(anyhow::Error),
}

impl PulseprobeError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PulseprobeError::ElementNotVisible { .. } => 2,
            PulseprobeError::UnexpectedTheme(_) => 3,
            PulseprobeError::WebDriverFailed(_) => 4,
            PulseprobeError::Timeout(_) => 5,
            PulseprobeError::InvalidTooltip(_) => 6,
            PulseprobeError::AssertionFailed(_) => 7,
            PulseprobeError::Other(_) => 1,
        }
    }
}

impl fmt::Display for PulseprobeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PulseprobeError::ElementNotVisible {
                element,
                timeout_ms,
            } => {
                write!(
                    f,
                    "Element '{}' did not become visible within {}ms",
                    element, timeout_ms
                )
            }
            PulseprobeError::UnexpectedTheme(scheme) => {
                write!(f, "Invalid color scheme: {}", scheme)
            }
            PulseprobeError::WebDriverFailed(msg) => {
                write!(f, "WebDriver connection failed: {}", msg)
            }
            PulseprobeError::Timeout(msg) => write!(f, "Operation timed out: {}", msg),
            PulseprobeError::InvalidTooltip(msg) => write!(f, "Invalid tooltip: {}", msg),
            PulseprobeError::AssertionFailed(msg) => write!(f, "Assertion failed: {}", msg),
            PulseprobeError::Other(err) => write!(f, "{:#}", err),
        }
    }
}

impl std::error::Error for PulseprobeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PulseprobeError::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for PulseprobeError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<PulseprobeError>() {
            Ok(typed) => return typed,
            Err(err) => err,
        };

        // Typed root causes first, then fall back to the message text
        if let Some(typed) = err.chain().find_map(|cause| cause.downcast_ref::<PulseprobeError>()) {
            let context = format!("{:#}", err);
            return match typed {
                PulseprobeError::ElementNotVisible {
                    element,
                    timeout_ms,
                } => PulseprobeError::ElementNotVisible {
                    element: element.clone(),
                    timeout_ms: *timeout_ms,
                },
                PulseprobeError::UnexpectedTheme(_) => PulseprobeError::UnexpectedTheme(context),
                PulseprobeError::WebDriverFailed(_) => PulseprobeError::WebDriverFailed(context),
                PulseprobeError::Timeout(_) => PulseprobeError::Timeout(context),
                PulseprobeError::InvalidTooltip(_) => PulseprobeError::InvalidTooltip(context),
                PulseprobeError::AssertionFailed(_) => PulseprobeError::AssertionFailed(context),
                PulseprobeError::Other(_) => PulseprobeError::Other(err),
            };
        }

        let msg = format!("{:#}", err);
        if msg.contains("Failed to connect to WebDriver")
            || msg.contains("geckodriver")
            || msg.contains("chromedriver")
        {
            PulseprobeError::WebDriverFailed(msg)
        } else if msg.contains("timeout") || msg.contains("timed out") {
            PulseprobeError::Timeout(msg)
        } else {
            PulseprobeError::Other(err)
        }
    }
}

#[cfg(test)]
#[path = "errors_test.rs"]
mod errors_test;
