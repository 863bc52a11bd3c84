//! Request body construction for assignment saves

use serde_json::{Map, Value};

use super::AssignmentForm;
use crate::constants::REQUEST_ROOT_KEY;
use crate::error::{Error, Result};

/// Build the JSON body sent when saving `form`
///
/// Fields are nested under an `assignment` key. The identifier travels in
/// the URL, so it is left out of the body.
pub fn transform_request(form: &AssignmentForm) -> Result<Value> {
    let mut fields = serde_json::to_value(form)
        .map_err(|e| error_stack::Report::new(Error::failed_to("serialize assignment", e)))?;

    if let Value::Object(ref mut map) = fields {
        map.remove("id");
    }

    let mut body = Map::new();
    body.insert(REQUEST_ROOT_KEY.to_string(), fields);
    Ok(Value::Object(body))
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

    use super::*;

    #[test]
    fn test_body_nests_fields_and_drops_id() {
        let mut form = AssignmentForm::default();
        form.id = Some(7);
        form.name = "HW1".to_string();
        form.extra.insert("instructor_id".to_string(), json!(3));

        let body = transform_request(&form).unwrap();
        let assignment = &body["assignment"];

        assert_eq!(assignment["name"], json!("HW1"));
        assert_eq!(assignment["max_team_size"], json!(1));
        assert_eq!(assignment["instructor_id"], json!(3));
        assert!(assignment.get("id").is_none());
        assert_eq!(body.as_object().map(Map::len), Some(1));
    }
}
