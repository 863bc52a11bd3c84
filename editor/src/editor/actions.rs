//! Navigation actions offered on the editor's "Etc" tab

use strum::{Display, EnumIter};

use crate::constants::ASSIGNMENT_EDIT_PATH;

/// Pages reachable from the assignment editor
#[derive(Display, EnumIter, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum EditorAction {
    /// Add participants to the assignment
    AddParticipant,
    /// Form teams
    CreateTeams,
    /// Assign reviewers to submissions
    AssignReviewer,
    /// List submissions
    ViewSubmissions,
    /// Show scores
    ViewScores,
    /// Show reports
    ViewReports,
    /// Show scheduled background jobs
    ViewDelayedJobs,
}

impl EditorAction {
    /// Button caption
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AddParticipant => "Add Participant",
            Self::CreateTeams => "Create Teams",
            Self::AssignReviewer => "Assign Reviewer",
            Self::ViewSubmissions => "View Submissions",
            Self::ViewScores => "View Scores",
            Self::ViewReports => "View Reports",
            Self::ViewDelayedJobs => "View Delayed Jobs",
        }
    }

    /// Last path segment of the action's page
    const fn segment(self) -> &'static str {
        match self {
            Self::AddParticipant => "participants",
            Self::CreateTeams => "createteams",
            Self::AssignReviewer => "assignreviewer",
            Self::ViewSubmissions => "viewsubmissions",
            Self::ViewScores => "viewscores",
            Self::ViewReports => "viewreports",
            Self::ViewDelayedJobs => "viewdelayedjobs",
        }
    }

    /// Navigation target for the assignment with identifier `id`
    ///
    /// Adding participants is relative to the current page; every other
    /// action needs the identifier and yields `None` without it.
    #[must_use]
    pub fn target(self, id: Option<u64>) -> Option<String> {
        match (self, id) {
            (Self::AddParticipant, _) => Some(self.segment().to_string()),
            (_, Some(id)) => Some(format!("{ASSIGNMENT_EDIT_PATH}/{id}/{}", self.segment())),
            (_, None) => None,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "tests fail by panicking"
)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_targets_for_saved_assignment() {
        let targets: Vec<_> = EditorAction::iter()
            .filter_map(|action| action.target(Some(7)))
            .collect();

        assert_eq!(
            targets,
            vec![
                "participants",
                "/assignments/edit/7/createteams",
                "/assignments/edit/7/assignreviewer",
                "/assignments/edit/7/viewsubmissions",
                "/assignments/edit/7/viewscores",
                "/assignments/edit/7/viewreports",
                "/assignments/edit/7/viewdelayedjobs",
            ]
        );
    }

    #[test]
    fn test_unsaved_assignment_only_allows_participants() {
        assert_eq!(
            EditorAction::AddParticipant.target(None).as_deref(),
            Some("participants")
        );
        assert!(EditorAction::ViewReports.target(None).is_none());
        assert_eq!(EditorAction::ViewDelayedJobs.label(), "View Delayed Jobs");
    }

    #[test]
    fn test_action_names_are_snake_case() {
        assert_eq!(EditorAction::AddParticipant.to_string(), "add_participant");
        assert_eq!(EditorAction::ViewDelayedJobs.to_string(), "view_delayed_jobs");
    }
}
