//! Method and path selection for a save

use crate::constants::ASSIGNMENTS_PATH;
use crate::error::{Error, Result};
use crate::form::{AssignmentForm, EditMode, transform_request};
use crate::gateway::{GatewayRequest, HttpMethod};

/// Build the request that saves `values` in `mode`
///
/// Update mode needs the record identifier; without it no request is built.
pub fn save_request(values: &AssignmentForm, mode: EditMode) -> Result<GatewayRequest> {
    let (method, path) = match mode {
        EditMode::Create => (HttpMethod::Post, ASSIGNMENTS_PATH.to_string()),
        EditMode::Update => {
            let id = values.id.ok_or(Error::MissingIdentifier)?;
            (HttpMethod::Patch, format!("{ASSIGNMENTS_PATH}/{id}"))
        }
    };

    Ok(GatewayRequest {
        method,
        path,
        body: transform_request(values)?,
    })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "tests fail by panicking"
)]
mod tests {
    use super::*;

    #[test]
    fn test_create_posts_to_collection() {
        let request = save_request(&AssignmentForm::default(), EditMode::Create).unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.path, "/assignments");
    }

    #[test]
    fn test_create_ignores_identifier() {
        let mut values = AssignmentForm::default();
        values.id = Some(3);
        let request = save_request(&values, EditMode::Create).unwrap();
        assert_eq!(request.path, "/assignments");
    }

    #[test]
    fn test_update_patches_record() {
        let mut values = AssignmentForm::default();
        values.id = Some(7);
        let request = save_request(&values, EditMode::Update).unwrap();
        assert_eq!(request.method, HttpMethod::Patch);
        assert_eq!(request.path, "/assignments/7");
    }

    #[test]
    fn test_update_without_identifier_is_rejected() {
        let err = save_request(&AssignmentForm::default(), EditMode::Update).unwrap_err();
        assert_eq!(err.current_context(), &Error::MissingIdentifier);
    }
}
