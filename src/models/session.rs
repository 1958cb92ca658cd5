use serde::{Deserialize, Serialize};

/// The authenticated user a request acts for
///
/// Authentication happens upstream; the result is passed explicitly to every
/// operation that needs to know who the user is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Email address, the key of the user's documents
    pub email: String,
    /// Numeric id known to the recommendation models, if any
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl Session {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            user_id: None,
        }
    }

    pub fn with_user_id(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }
}
