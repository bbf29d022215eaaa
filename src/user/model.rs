use serde::{Deserialize, Serialize};

use crate::utils::error::CustomError;

/// Author details copied onto a post or comment at write time.
///
/// This is a denormalized snapshot of the identity provider's profile, not a
/// live reference: later profile edits do not propagate to existing records.
/// Eventually stale by design.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub user_id: String,
    pub user_image: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl UserSnapshot {
    /// `userId` and `userImage` must be present; `firstName` is required but
    /// may be empty (the provider returns "" for accounts without one).
    pub fn validate(&self) -> Result<(), CustomError> {
        if self.user_id.trim().is_empty() {
            return Err(CustomError::ValidationError(
                "User snapshot is missing a user id".to_string(),
            ));
        }
        if self.user_image.trim().is_empty() {
            return Err(CustomError::ValidationError(
                "User snapshot is missing an image URL".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> UserSnapshot {
        UserSnapshot {
            user_id: "u1".to_string(),
            user_image: "https://img.example/u1.png".to_string(),
            first_name: "A".to_string(),
            last_name: Some("B".to_string()),
        }
    }

    #[test]
    fn valid_snapshot_passes() {
        assert!(snapshot().validate().is_ok());
    }

    #[test]
    fn empty_first_name_is_allowed() {
        let mut user = snapshot();
        user.first_name = String::new();
        user.last_name = None;
        assert!(user.validate().is_ok());
    }

    #[test]
    fn missing_user_id_fails() {
        let mut user = snapshot();
        user.user_id = "  ".to_string();
        assert!(matches!(
            user.validate(),
            Err(CustomError::ValidationError(_))
        ));
    }

    #[test]
    fn missing_user_image_fails() {
        let mut user = snapshot();
        user.user_image = String::new();
        assert!(matches!(
            user.validate(),
            Err(CustomError::ValidationError(_))
        ));
    }

    #[test]
    fn serializes_with_camel_case_field_names() {
        let value = serde_json::to_value(snapshot()).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["userImage"], "https://img.example/u1.png");
        assert_eq!(value["firstName"], "A");
        assert_eq!(value["lastName"], "B");
    }

    #[test]
    fn omits_absent_last_name() {
        let mut user = snapshot();
        user.last_name = None;
        let value = serde_json::to_value(user).unwrap();
        assert!(value.get("lastName").is_none());
    }
}
