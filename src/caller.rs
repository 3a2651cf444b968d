//! Explicit caller identity passed to every service call.

use serde::{Deserialize, Serialize};

use crate::error::NexafsError;

/// Identity of whoever invokes a service operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    user_id: Option<String>,
}

impl Caller {
    /// A caller without identity; may only read
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    /// An authenticated caller
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    /// The caller's user id, if authenticated
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// The caller's user id, or `Unauthorized` for anonymous callers
    pub fn require_user(&self) -> Result<&str, NexafsError> {
        match self.user_id.as_deref() {
            Some(id) if !id.trim().is_empty() => Ok(id),
            _ => Err(NexafsError::Unauthorized),
        }
    }
}
