//! API models for speakers.

use crate::db::models::speakers::Speaker;
use crate::types::SpeakerId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Speaker details embedded in a talk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerResponse {
    pub speaker_id: SpeakerId,
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

impl From<Speaker> for SpeakerResponse {
    fn from(speaker: Speaker) -> Self {
        Self {
            speaker_id: speaker.id,
            first_name: speaker.first_name,
            middle_name: speaker.middle_name,
            last_name: speaker.last_name,
            bio: speaker.bio,
            company: speaker.company,
            company_url: speaker.company_url,
            blog_url: speaker.blog_url,
            twitter: speaker.twitter,
            github: speaker.github,
        }
    }
}

/// Reference to a speaker in a talk payload. Any other speaker fields sent by the client are
/// ignored; speakers cannot be edited through talks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerRef {
    #[schema(example = 7)]
    pub speaker_id: SpeakerId,
}
