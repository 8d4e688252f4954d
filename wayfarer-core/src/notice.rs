//! User-facing notices raised by forms, the builder and the session.

use std::fmt;

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    /// Informational, no action required.
    Info,
    /// An operation completed.
    Success,
    /// The request was partly or wholly ignored.
    Warning,
    /// An operation failed.
    Error,
}

impl NoticeLevel {
    /// Lower-case label used in log lines and terminal output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A transient message for whichever front end renders notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Text shown to the user.
    pub message: String,
}

impl Notice {
    /// Informational notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    /// Success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    /// Warning notice.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    /// Error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.message)
    }
}

/// Accumulates notices until a front end drains them.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    pending: Vec<Notice>,
}

impl Notices {
    /// Queue a notice.
    pub fn push(&mut self, notice: Notice) {
        log::debug!("notice raised: {notice}");
        self.pending.push(notice);
    }

    /// Pending notices, oldest first.
    #[must_use]
    pub fn pending(&self) -> &[Notice] {
        &self.pending
    }

    /// Remove and return all pending notices.
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn drain_empties_queue() {
        let mut notices = Notices::default();
        notices.push(Notice::warning("too many"));
        notices.push(Notice::info("already added"));
        let drained = notices.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].level, NoticeLevel::Warning);
        assert!(notices.pending().is_empty());
    }

    #[rstest]
    fn displays_level_prefix() {
        assert_eq!(Notice::error("boom").to_string(), "[error] boom");
    }
}
