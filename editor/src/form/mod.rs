//! Assignment form values and the pure derivations over them
//!
//! The form is a flat record of scalar fields. Widgets bind to fields by
//! [`FieldName`]; everything a presentation layer needs (visible fields per
//! tab, validation errors, the request body) is derived from the current
//! values without hidden state.

mod fields;
mod lenient;
mod request;
mod validation;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::Display;

pub use fields::{EditorTab, FieldName, visible_fields};
pub use request::transform_request;
pub use validation::{FieldErrors, validate};

use crate::error::{Error, Result};

/// Whether the editor creates a new assignment or edits an existing one
#[derive(Display, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    /// New record, starts from default values
    Create,
    /// Existing record, starts from the loaded values
    Update,
}

impl EditMode {
    /// Verb used in user-facing messages, e.g. "created"
    #[must_use]
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Update => "updated",
        }
    }
}

/// Values of the assignment editor form
///
/// Unknown keys from a loaded record are kept in `extra` so an update sends
/// them back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs, reason = "field names mirror the backend's assignment columns")]
pub struct AssignmentForm {
    /// Backend identifier, present for records loaded for update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    // General
    pub name:                          String,
    #[serde(deserialize_with = "lenient::optional_id")]
    pub course_id:                     Option<u64>,
    pub directory_path:                String,
    pub spec_location:                 String,
    pub private:                       bool,
    pub has_teams:                     bool,
    pub max_team_size:                 u32,
    pub show_teammate_review:          bool,
    pub is_pair_programming:           bool,
    pub has_mentors:                   bool,
    pub auto_assign_mentors:           bool,
    pub has_topics:                    bool,
    pub staggered_deadline_assignment: bool,
    pub has_quizzes:                   bool,
    pub calibration_for_training:      bool,
    pub allow_tag_prompts:             bool,
    pub available_to_students:         bool,
    pub show_template_review:          bool,
    pub require_quiz:                  bool,
    pub has_badge:                     bool,
    pub staggered_deadline:            bool,
    pub is_calibrated:                 bool,

    // Topics
    pub allow_topic_suggestion_from_students:     bool,
    pub enable_bidding_for_topics:                bool,
    pub enable_bidding_for_reviews:               bool,
    pub enable_authors_to_review_other_topics:    bool,
    pub allow_reviewer_to_choose_topic_to_review: bool,
    pub allow_participants_to_create_bookmarks:   bool,

    // Rubrics
    pub review_rubric_varies_by_round: bool,
    pub review_rubric_varies_by_topic: bool,
    pub review_rubric_varies_by_role:  bool,

    // Review strategy
    #[serde(deserialize_with = "lenient::text_or_number")]
    pub review_strategy:                             String,
    pub review_topic_threshold:                      u32,
    pub maximum_number_of_reviews_per_submission:    u32,
    pub has_max_review_limit:                        bool,
    pub set_allowed_number_of_reviews_per_reviewer:  u32,
    pub set_required_number_of_reviews_per_reviewer: u32,
    pub is_review_anonymous:                         bool,
    pub is_review_done_by_teams:                     bool,
    pub allow_self_reviews:                          bool,
    pub reviews_visible_to_other_reviewers:          bool,

    // Due dates
    pub number_of_review_rounds:     u32,
    pub use_signup_deadline:         bool,
    pub use_drop_topic_deadline:     bool,
    pub use_team_formation_deadline: bool,

    /// Fields of a loaded record that the form does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AssignmentForm {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            course_id: None,
            directory_path: String::new(),
            spec_location: String::new(),
            private: false,
            has_teams: false,
            max_team_size: 1,
            show_teammate_review: false,
            is_pair_programming: false,
            has_mentors: false,
            auto_assign_mentors: false,
            has_topics: false,
            staggered_deadline_assignment: false,
            has_quizzes: false,
            calibration_for_training: false,
            allow_tag_prompts: false,
            available_to_students: false,
            show_template_review: false,
            require_quiz: false,
            has_badge: false,
            staggered_deadline: false,
            is_calibrated: false,
            allow_topic_suggestion_from_students: false,
            enable_bidding_for_topics: false,
            enable_bidding_for_reviews: false,
            enable_authors_to_review_other_topics: false,
            allow_reviewer_to_choose_topic_to_review: false,
            allow_participants_to_create_bookmarks: false,
            review_rubric_varies_by_round: false,
            review_rubric_varies_by_topic: false,
            review_rubric_varies_by_role: false,
            review_strategy: String::new(),
            review_topic_threshold: 0,
            maximum_number_of_reviews_per_submission: 0,
            has_max_review_limit: false,
            set_allowed_number_of_reviews_per_reviewer: 0,
            set_required_number_of_reviews_per_reviewer: 0,
            is_review_anonymous: false,
            is_review_done_by_teams: false,
            allow_self_reviews: false,
            reviews_visible_to_other_reviewers: false,
            number_of_review_rounds: 0,
            use_signup_deadline: false,
            use_drop_topic_deadline: false,
            use_team_formation_deadline: false,
            extra: Map::new(),
        }
    }
}

impl AssignmentForm {
    /// Parse a loaded record, e.g. the backend's JSON for an existing assignment
    pub fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| error_stack::Report::new(Error::failed_to("parse assignment record", e)))
    }

    /// Current value of `field` as JSON
    pub fn value(&self, field: FieldName) -> Result<Value> {
        let json = serde_json::to_value(self)
            .map_err(|e| error_stack::Report::new(Error::failed_to("serialize form", e)))?;
        Ok(json.get(field.as_ref()).cloned().unwrap_or(Value::Null))
    }

    /// Whether a boolean field is switched on; non-boolean fields read as `false`
    #[must_use]
    pub const fn is_enabled(&self, field: FieldName) -> bool {
        use FieldName as F;
        match field {
            F::Private => self.private,
            F::HasTeams => self.has_teams,
            F::ShowTeammateReview => self.show_teammate_review,
            F::IsPairProgramming => self.is_pair_programming,
            F::HasMentors => self.has_mentors,
            F::AutoAssignMentors => self.auto_assign_mentors,
            F::HasTopics => self.has_topics,
            F::StaggeredDeadlineAssignment => self.staggered_deadline_assignment,
            F::HasQuizzes => self.has_quizzes,
            F::CalibrationForTraining => self.calibration_for_training,
            F::AllowTagPrompts => self.allow_tag_prompts,
            F::AvailableToStudents => self.available_to_students,
            F::ShowTemplateReview => self.show_template_review,
            F::RequireQuiz => self.require_quiz,
            F::HasBadge => self.has_badge,
            F::StaggeredDeadline => self.staggered_deadline,
            F::IsCalibrated => self.is_calibrated,
            F::AllowTopicSuggestionFromStudents => self.allow_topic_suggestion_from_students,
            F::EnableBiddingForTopics => self.enable_bidding_for_topics,
            F::EnableBiddingForReviews => self.enable_bidding_for_reviews,
            F::EnableAuthorsToReviewOtherTopics => self.enable_authors_to_review_other_topics,
            F::AllowReviewerToChooseTopicToReview => self.allow_reviewer_to_choose_topic_to_review,
            F::AllowParticipantsToCreateBookmarks => self.allow_participants_to_create_bookmarks,
            F::ReviewRubricVariesByRound => self.review_rubric_varies_by_round,
            F::ReviewRubricVariesByTopic => self.review_rubric_varies_by_topic,
            F::ReviewRubricVariesByRole => self.review_rubric_varies_by_role,
            F::HasMaxReviewLimit => self.has_max_review_limit,
            F::IsReviewAnonymous => self.is_review_anonymous,
            F::IsReviewDoneByTeams => self.is_review_done_by_teams,
            F::AllowSelfReviews => self.allow_self_reviews,
            F::ReviewsVisibleToOtherReviewers => self.reviews_visible_to_other_reviewers,
            F::UseSignupDeadline => self.use_signup_deadline,
            F::UseDropTopicDeadline => self.use_drop_topic_deadline,
            F::UseTeamFormationDeadline => self.use_team_formation_deadline,
            F::Name
            | F::CourseId
            | F::DirectoryPath
            | F::SpecLocation
            | F::MaxTeamSize
            | F::ReviewStrategy
            | F::ReviewTopicThreshold
            | F::MaximumNumberOfReviewsPerSubmission
            | F::SetAllowedNumberOfReviewsPerReviewer
            | F::SetRequiredNumberOfReviewsPerReviewer
            | F::NumberOfReviewRounds => false,
        }
    }

    /// Replace the value of `field`
    ///
    /// The value must fit the field's type (string, boolean or number). On a
    /// mismatch the form is left untouched.
    pub fn set_value(&mut self, field: FieldName, value: Value) -> Result<()> {
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| error_stack::Report::new(Error::failed_to("serialize form", e)))?;
        if let Value::Object(ref mut map) = json {
            map.insert(field.to_string(), value);
        }
        *self = serde_json::from_value(json)
            .map_err(|e| error_stack::Report::new(Error::invalid_field(field, e)))?;
        Ok(())
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
    use serde_json::json;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_defaults_match_new_assignment() {
        let form = AssignmentForm::default();
        assert!(form.id.is_none());
        assert!(form.name.is_empty());
        assert_eq!(form.max_team_size, 1);
        assert_eq!(form.number_of_review_rounds, 0);
        assert!(!form.has_teams);
    }

    #[test]
    fn test_loaded_record_keeps_unknown_fields() {
        let form = AssignmentForm::from_json(json!({
            "id": 7,
            "name": "HW1",
            "has_teams": true,
            "instructor_id": 3
        }))
        .unwrap();

        assert_eq!(form.id, Some(7));
        assert_eq!(form.name, "HW1");
        assert!(form.has_teams);
        assert_eq!(form.max_team_size, 1);
        assert_eq!(form.extra.get("instructor_id"), Some(&json!(3)));
    }

    #[test]
    fn test_set_value_updates_typed_field() {
        let mut form = AssignmentForm::default();
        form.set_value(FieldName::Name, json!("Program 2")).unwrap();
        form.set_value(FieldName::HasTopics, json!(true)).unwrap();
        form.set_value(FieldName::MaxTeamSize, json!(4)).unwrap();

        assert_eq!(form.value(FieldName::Name).unwrap(), json!("Program 2"));
        assert!(form.is_enabled(FieldName::HasTopics));
        assert_eq!(form.max_team_size, 4);
    }

    #[test]
    fn test_set_value_rejects_type_mismatch() {
        let mut form = AssignmentForm::default();
        let err = form
            .set_value(FieldName::MaxTeamSize, json!("lots"))
            .unwrap_err();

        assert!(matches!(err.current_context(), Error::InvalidArgument(_)));
        assert_eq!(form.max_team_size, 1);
    }

    #[test]
    fn test_select_fields_accept_numbers_and_strings() {
        let mut form = AssignmentForm::default();

        form.set_value(FieldName::ReviewStrategy, json!(1)).unwrap();
        assert_eq!(form.review_strategy, "1");
        form.set_value(FieldName::ReviewStrategy, json!("2")).unwrap();
        assert_eq!(form.review_strategy, "2");

        form.set_value(FieldName::CourseId, json!("2")).unwrap();
        assert_eq!(form.course_id, Some(2));
        form.set_value(FieldName::CourseId, json!(3)).unwrap();
        assert_eq!(form.course_id, Some(3));
        form.set_value(FieldName::CourseId, json!("")).unwrap();
        assert_eq!(form.course_id, None);

        assert!(form.set_value(FieldName::CourseId, json!("math")).is_err());
        assert_eq!(form.course_id, None);
    }

    #[test]
    fn test_is_enabled_matches_boolean_values() {
        let mut form = AssignmentForm::default();
        for field in FieldName::iter() {
            if form.value(field).unwrap().is_boolean() {
                assert!(!form.is_enabled(field), "{field} starts off");
                form.set_value(field, json!(true)).unwrap();
                assert!(form.is_enabled(field), "{field} switched on");
            } else {
                assert!(!form.is_enabled(field), "{field} is not a switch");
            }
        }
    }

    #[test]
    fn test_edit_mode_wording() {
        assert_eq!(EditMode::Create.to_string(), "create");
        assert_eq!(EditMode::Update.past_tense(), "updated");
        assert_eq!(
            serde_json::from_value::<EditMode>(json!("update")).unwrap(),
            EditMode::Update
        );
    }
}
