//! Field names, editor tabs and the visible-field derivation

use strum::{AsRefStr, Display, EnumIter};

use super::AssignmentForm;

/// Names of the bindable form fields
///
/// Serialized names match the keys of [`AssignmentForm`].
#[derive(Display, AsRefStr, EnumIter, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[strum(serialize_all = "snake_case")]
#[allow(missing_docs, reason = "variants are documented by their labels")]
pub enum FieldName {
    Name,
    CourseId,
    DirectoryPath,
    SpecLocation,
    Private,
    HasTeams,
    MaxTeamSize,
    ShowTeammateReview,
    IsPairProgramming,
    HasMentors,
    AutoAssignMentors,
    HasTopics,
    StaggeredDeadlineAssignment,
    HasQuizzes,
    CalibrationForTraining,
    AllowTagPrompts,
    AvailableToStudents,
    ShowTemplateReview,
    RequireQuiz,
    HasBadge,
    StaggeredDeadline,
    IsCalibrated,
    AllowTopicSuggestionFromStudents,
    EnableBiddingForTopics,
    EnableBiddingForReviews,
    EnableAuthorsToReviewOtherTopics,
    AllowReviewerToChooseTopicToReview,
    AllowParticipantsToCreateBookmarks,
    ReviewRubricVariesByRound,
    ReviewRubricVariesByTopic,
    ReviewRubricVariesByRole,
    ReviewStrategy,
    ReviewTopicThreshold,
    MaximumNumberOfReviewsPerSubmission,
    HasMaxReviewLimit,
    SetAllowedNumberOfReviewsPerReviewer,
    SetRequiredNumberOfReviewsPerReviewer,
    IsReviewAnonymous,
    IsReviewDoneByTeams,
    AllowSelfReviews,
    ReviewsVisibleToOtherReviewers,
    NumberOfReviewRounds,
    UseSignupDeadline,
    UseDropTopicDeadline,
    UseTeamFormationDeadline,
}

impl FieldName {
    /// Human readable label for the field's input
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Assignment Name",
            Self::CourseId => "Course",
            Self::DirectoryPath => "Submission Directory",
            Self::SpecLocation => "Description URL",
            Self::Private => "Private Assignment",
            Self::HasTeams => "Has teams?",
            Self::MaxTeamSize => "Max Team Size",
            Self::ShowTeammateReview => "Show teammate reviews?",
            Self::IsPairProgramming => "Pair Programming?",
            Self::HasMentors => "Has mentors?",
            Self::AutoAssignMentors => "Auto-assign mentors when team hits > 50% capacity?",
            Self::HasTopics => "Has topics?",
            Self::StaggeredDeadlineAssignment => "Staggered deadline assignment?",
            Self::HasQuizzes => "Has quizzes?",
            Self::CalibrationForTraining => "Calibration for training?",
            Self::AllowTagPrompts => "Allow tag prompts so author can tag feedback comments?",
            Self::AvailableToStudents => "Available to students?",
            Self::ShowTemplateReview => "Show template review?",
            Self::RequireQuiz => "Has quiz?",
            Self::HasBadge => "Has badge?",
            Self::StaggeredDeadline => "Staggered deadline?",
            Self::IsCalibrated => "Calibrated?",
            Self::AllowTopicSuggestionFromStudents => "Allow topic suggestions from students?",
            Self::EnableBiddingForTopics => "Enable bidding for topics?",
            Self::EnableBiddingForReviews => "Enable bidding for reviews?",
            Self::EnableAuthorsToReviewOtherTopics => {
                "Enable authors to review others working on same topic?"
            }
            Self::AllowReviewerToChooseTopicToReview => {
                "Allow reviewer to choose which topic to review?"
            }
            Self::AllowParticipantsToCreateBookmarks => "Allow participants to create bookmarks?",
            Self::ReviewRubricVariesByRound => "Review rubric varies by round?",
            Self::ReviewRubricVariesByTopic => "Review rubric varies by topic?",
            Self::ReviewRubricVariesByRole => "Review rubric varies by role?",
            Self::ReviewStrategy => "Review strategy",
            Self::ReviewTopicThreshold => "Review topic threshold (k)",
            Self::MaximumNumberOfReviewsPerSubmission => {
                "Maximum number of reviews per submission"
            }
            Self::HasMaxReviewLimit => "Has max review limit?",
            Self::SetAllowedNumberOfReviewsPerReviewer => {
                "Set allowed number of reviews per reviewer"
            }
            Self::SetRequiredNumberOfReviewsPerReviewer => {
                "Set required number of reviews per reviewer"
            }
            Self::IsReviewAnonymous => "Is review anonymous?",
            Self::IsReviewDoneByTeams => "Is review done by teams?",
            Self::AllowSelfReviews => "Allow self-reviews?",
            Self::ReviewsVisibleToOtherReviewers => "Reviews visible to other reviewers?",
            Self::NumberOfReviewRounds => "Number of review rounds",
            Self::UseSignupDeadline => "Use signup deadline",
            Self::UseDropTopicDeadline => "Use drop-topic deadline",
            Self::UseTeamFormationDeadline => "Use team-formation deadline",
        }
    }

    /// The boolean field that must be on for this field to be shown
    #[must_use]
    pub const fn shown_when(self) -> Option<Self> {
        match self {
            Self::MaxTeamSize | Self::ShowTeammateReview | Self::IsPairProgramming => {
                Some(Self::HasTeams)
            }
            Self::AutoAssignMentors => Some(Self::HasMentors),
            Self::StaggeredDeadlineAssignment | Self::ReviewTopicThreshold => {
                Some(Self::HasTopics)
            }
            _ => None,
        }
    }
}

/// Tabs of the assignment editor, in display order
#[derive(Display, EnumIter, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum EditorTab {
    /// Name, course, teams, mentors and topic switches
    General,
    /// Topic bidding and suggestion settings
    Topics,
    /// Rubric variation settings
    Rubrics,
    /// Review limits and anonymity
    ReviewStrategy,
    /// Review rounds and optional deadlines
    DueDates,
    /// Miscellaneous actions; holds no form fields
    Etc,
}

impl EditorTab {
    /// Tab caption
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Topics => "Topics",
            Self::Rubrics => "Rubrics",
            Self::ReviewStrategy => "Review strategy",
            Self::DueDates => "Due dates",
            Self::Etc => "Etc",
        }
    }

    /// Every field placed on this tab, conditional ones included
    #[must_use]
    pub const fn fields(self) -> &'static [FieldName] {
        use FieldName as F;

        match self {
            Self::General => &[
                F::Name,
                F::CourseId,
                F::DirectoryPath,
                F::SpecLocation,
                F::Private,
                F::HasTeams,
                F::MaxTeamSize,
                F::ShowTeammateReview,
                F::IsPairProgramming,
                F::HasMentors,
                F::AutoAssignMentors,
                F::HasTopics,
                F::StaggeredDeadlineAssignment,
                F::HasQuizzes,
                F::CalibrationForTraining,
                F::AllowTagPrompts,
                F::AvailableToStudents,
            ],
            Self::Topics => &[
                F::AllowTopicSuggestionFromStudents,
                F::EnableBiddingForTopics,
                F::EnableBiddingForReviews,
                F::EnableAuthorsToReviewOtherTopics,
                F::AllowReviewerToChooseTopicToReview,
                F::AllowParticipantsToCreateBookmarks,
            ],
            Self::Rubrics => &[
                F::ReviewRubricVariesByRound,
                F::ReviewRubricVariesByTopic,
                F::ReviewRubricVariesByRole,
            ],
            Self::ReviewStrategy => &[
                F::ReviewStrategy,
                F::ReviewTopicThreshold,
                F::MaximumNumberOfReviewsPerSubmission,
                F::HasMaxReviewLimit,
                F::SetAllowedNumberOfReviewsPerReviewer,
                F::SetRequiredNumberOfReviewsPerReviewer,
                F::IsReviewAnonymous,
                F::IsReviewDoneByTeams,
                F::AllowSelfReviews,
                F::ReviewsVisibleToOtherReviewers,
            ],
            Self::DueDates => &[
                F::NumberOfReviewRounds,
                F::UseSignupDeadline,
                F::UseDropTopicDeadline,
                F::UseTeamFormationDeadline,
            ],
            Self::Etc => &[],
        }
    }
}

/// Fields of `tab` that should be shown for the current form values
///
/// Recomputed from scratch on every call; a field gated on a switch is
/// visible only while that switch is on.
#[must_use]
pub fn visible_fields(form: &AssignmentForm, tab: EditorTab) -> Vec<FieldName> {
    tab.fields()
        .iter()
        .copied()
        .filter(|field| field.shown_when().is_none_or(|gate| form.is_enabled(gate)))
        .collect()
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
    fn test_field_names_match_form_keys() {
        let json = serde_json::to_value(AssignmentForm::default()).unwrap();
        for field in FieldName::iter() {
            assert!(
                json.get(field.as_ref()).is_some(),
                "form has no key for {field}"
            );
        }
    }

    #[test]
    fn test_every_field_sits_on_exactly_one_tab() {
        for field in FieldName::iter().filter(|f| {
            !matches!(
                f,
                FieldName::ShowTemplateReview
                    | FieldName::RequireQuiz
                    | FieldName::HasBadge
                    | FieldName::StaggeredDeadline
                    | FieldName::IsCalibrated
            )
        }) {
            let tabs = EditorTab::iter()
                .filter(|tab| tab.fields().contains(&field))
                .count();
            assert_eq!(tabs, 1, "{field} appears on {tabs} tabs");
        }
    }

    #[test]
    fn test_team_fields_follow_has_teams() {
        let mut form = AssignmentForm::default();
        let hidden = visible_fields(&form, EditorTab::General);
        assert!(!hidden.contains(&FieldName::MaxTeamSize));
        assert!(!hidden.contains(&FieldName::ShowTeammateReview));
        assert!(!hidden.contains(&FieldName::IsPairProgramming));

        form.has_teams = true;
        let shown = visible_fields(&form, EditorTab::General);
        assert!(shown.contains(&FieldName::MaxTeamSize));
        assert!(shown.contains(&FieldName::ShowTeammateReview));
        assert!(shown.contains(&FieldName::IsPairProgramming));
    }

    #[test]
    fn test_topic_fields_follow_has_topics_across_tabs() {
        let mut form = AssignmentForm::default();
        assert!(
            !visible_fields(&form, EditorTab::ReviewStrategy)
                .contains(&FieldName::ReviewTopicThreshold)
        );

        form.has_topics = true;
        assert!(
            visible_fields(&form, EditorTab::ReviewStrategy)
                .contains(&FieldName::ReviewTopicThreshold)
        );
        assert!(
            visible_fields(&form, EditorTab::General)
                .contains(&FieldName::StaggeredDeadlineAssignment)
        );
        assert!(!visible_fields(&form, EditorTab::General).contains(&FieldName::AutoAssignMentors));
    }

    #[test]
    fn test_etc_tab_has_no_fields() {
        let form = AssignmentForm::default();
        assert!(visible_fields(&form, EditorTab::Etc).is_empty());
        assert_eq!(EditorTab::ReviewStrategy.to_string(), "review_strategy");
        assert_eq!(EditorTab::DueDates.title(), "Due dates");
    }
}
