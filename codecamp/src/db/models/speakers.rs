use crate::types::SpeakerId;
use sqlx::FromRow;

/// A speaker from the shared speaker pool. Read-only from the API's point of view.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Speaker {
    pub id: SpeakerId,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub company_url: Option<String>,
    pub blog_url: Option<String>,
    pub twitter: Option<String>,
    pub github: Option<String>,
}
