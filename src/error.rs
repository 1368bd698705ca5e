/// Broad failure category, used by callers that need to branch on the cause
/// rather than on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The observation table could not be opened or read.
    TableAccess,
    /// A data record could not be parsed into an observation.
    MalformedRecord,
    /// No usable observations remain after ingest.
    EmptyTable,
    /// Invalid search or sample configuration.
    Config,
    /// The statistic was requested at `tau == 0` or came out non-finite.
    ZeroDivisionDomain,
    /// The search exhausted its move budget.
    NotConverged,
    /// An output file could not be written.
    Export,
}

impl ErrorKind {
    fn default_exit_code(self) -> u8 {
        match self {
            ErrorKind::TableAccess
            | ErrorKind::MalformedRecord
            | ErrorKind::Config
            | ErrorKind::Export => 2,
            ErrorKind::EmptyTable => 3,
            ErrorKind::ZeroDivisionDomain | ErrorKind::NotConverged => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            exit_code: kind.default_exit_code(),
            message: message.into(),
        }
    }

    pub fn table_access(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TableAccess, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedRecord, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn domain(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ZeroDivisionDomain, message)
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Export, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_kind() {
        assert_eq!(AppError::table_access("x").exit_code(), 2);
        assert_eq!(AppError::new(ErrorKind::EmptyTable, "x").exit_code(), 3);
        assert_eq!(AppError::domain("x").exit_code(), 4);
        assert_eq!(AppError::new(ErrorKind::NotConverged, "x").exit_code(), 4);
    }

    #[test]
    fn display_is_message_only() {
        let err = AppError::config("target digit must be >= start digit");
        assert_eq!(err.to_string(), "target digit must be >= start digit");
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
