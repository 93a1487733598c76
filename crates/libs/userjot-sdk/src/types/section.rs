use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Feedback { board: Option<String> },
    Roadmap,
    Changelog,
}

impl Section {
    pub fn feedback() -> Self {
        Self::Feedback { board: None }
    }

    pub fn feedback_board(board: impl Into<String>) -> Self {
        Self::Feedback { board: Some(board.into()) }
    }

    /// Path suffix appended to the public base url.
    ///
    /// Board identifiers are inserted verbatim; callers supply url-safe values.
    pub fn path(&self) -> String {
        match self {
            Self::Feedback { board: None } => String::new(),
            Self::Feedback { board: Some(board) } => format!("/boards/{board}"),
            Self::Roadmap => "/roadmap".to_owned(),
            Self::Changelog => "/changelog".to_owned(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feedback { .. } => "feedback",
            Self::Roadmap => "roadmap",
            Self::Changelog => "changelog",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feedback { board: Some(board) } => write!(f, "feedback({board})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Height of the native surface the host presents the widget in.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    Full,
    Medium,
}
