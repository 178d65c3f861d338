//! Lifecycle states reported by GitLab and their numeric metric codes.

use std::str::FromStr;

use crate::error::ExporterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    Running,
    Pending,
    Success,
    Failed,
    Canceled,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueState {
    Opened,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRequestState {
    Opened,
    Closed,
    Locked,
    Merged,
}

impl PipelineStatus {
    pub fn code(self) -> f64 {
        match self {
            Self::Running => 0.0,
            Self::Pending => 1.0,
            Self::Success => 2.0,
            Self::Failed => 3.0,
            Self::Canceled => 4.0,
            Self::Skipped => 5.0,
        }
    }
}

impl IssueState {
    pub fn code(self) -> f64 {
        match self {
            Self::Opened => 0.0,
            Self::Closed => 1.0,
        }
    }
}

impl MergeRequestState {
    pub fn code(self) -> f64 {
        match self {
            Self::Opened => 0.0,
            Self::Closed => 1.0,
            Self::Locked => 2.0,
            Self::Merged => 3.0,
        }
    }
}

fn unmapped(kind: &'static str, status: &str) -> ExporterError {
    ExporterError::UnmappedStatus {
        kind,
        status: status.to_string(),
    }
}

impl FromStr for PipelineStatus {
    type Err = ExporterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            "canceled" => Ok(Self::Canceled),
            "skipped" => Ok(Self::Skipped),
            other => Err(unmapped("pipeline", other)),
        }
    }
}

impl FromStr for IssueState {
    type Err = ExporterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "opened" => Ok(Self::Opened),
            "closed" => Ok(Self::Closed),
            other => Err(unmapped("issue", other)),
        }
    }
}

impl FromStr for MergeRequestState {
    type Err = ExporterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "opened" => Ok(Self::Opened),
            "closed" => Ok(Self::Closed),
            "locked" => Ok(Self::Locked),
            "merged" => Ok(Self::Merged),
            other => Err(unmapped("merge request", other)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_codes() {
        let expected = [
            ("running", 0.0),
            ("pending", 1.0),
            ("success", 2.0),
            ("failed", 3.0),
            ("canceled", 4.0),
            ("skipped", 5.0),
        ];

        for (status, code) in expected {
            assert_eq!(status.parse::<PipelineStatus>().unwrap().code(), code);
        }
    }

    #[test]
    fn test_issue_codes() {
        assert_eq!("opened".parse::<IssueState>().unwrap().code(), 0.0);
        assert_eq!("closed".parse::<IssueState>().unwrap().code(), 1.0);
    }

    #[test]
    fn test_merge_request_codes() {
        assert_eq!("opened".parse::<MergeRequestState>().unwrap().code(), 0.0);
        assert_eq!("closed".parse::<MergeRequestState>().unwrap().code(), 1.0);
        assert_eq!("locked".parse::<MergeRequestState>().unwrap().code(), 2.0);
        assert_eq!("merged".parse::<MergeRequestState>().unwrap().code(), 3.0);
    }

    #[test]
    fn test_unknown_status_is_an_error() {
        let err = "manual".parse::<PipelineStatus>().unwrap_err();
        assert!(matches!(
            err,
            ExporterError::UnmappedStatus { kind: "pipeline", ref status } if status == "manual"
        ));

        assert!("merged".parse::<IssueState>().is_err());
        assert!("Opened".parse::<MergeRequestState>().is_err());
    }
}
