//! API request/response models for talks.

use super::speakers::{SpeakerRef, SpeakerResponse};
use super::validation::ValidationErrors;
use crate::db::models::camps::Camp;
use crate::db::models::talks::{Talk, TalkCreateDBRequest};
use crate::types::{SpeakerId, TalkId};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

const TITLE_MAX: usize = 100;
const ABSTRACT_MAX: usize = 4000;
const LEVEL_MIN: i32 = 100;
const LEVEL_MAX: i32 = 400;

/// Query parameters for reading talks
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TalkQuery {
    /// Embed each talk's speaker in the response
    #[serde(default)]
    pub include_speakers: bool,
}

/// Request body for creating a talk under a camp.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TalkCreate {
    #[schema(example = "Intro")]
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    #[schema(example = 200)]
    pub level: Option<i32>,
    /// Speaker to attach. Ignored when no speaker with this id exists.
    pub speaker: Option<SpeakerRef>,
}

impl TalkCreate {
    /// Validate and map onto a create request owned by `camp`.
    ///
    /// The owning camp always comes from the addressed resource, never from the payload. The
    /// speaker is resolved separately by the handler.
    pub fn into_db_request(self, camp: &Camp) -> Result<TalkCreateDBRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("title", self.title.as_deref(), TITLE_MAX);
        errors.check_max_length("abstract", self.abstract_text.as_deref(), ABSTRACT_MAX);
        errors.check_range("level", self.level, LEVEL_MIN, LEVEL_MAX);

        let Some(title) = self.title else {
            return Err(errors);
        };

        errors.into_result(TalkCreateDBRequest {
            camp_id: camp.id,
            title,
            abstract_text: self.abstract_text,
            level: self.level,
            speaker_id: None,
        })
    }
}

/// Request body for updating a talk. All fields are optional; only provided fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TalkUpdate {
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub level: Option<i32>,
    /// Requested speaker. Only takes effect when it differs from the current one and exists.
    pub speaker: Option<SpeakerRef>,
}

impl TalkUpdate {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(title) = self.title.as_deref() {
            errors.check_text("title", title, TITLE_MAX);
        }
        errors.check_max_length("abstract", self.abstract_text.as_deref(), ABSTRACT_MAX);
        errors.check_range("level", self.level, LEVEL_MIN, LEVEL_MAX);
        errors.into_result(())
    }

    pub fn requested_speaker_id(&self) -> Option<SpeakerId> {
        self.speaker.map(|speaker| speaker.speaker_id)
    }

    /// Apply the scalar fields present in this update onto `talk`.
    ///
    /// Relationship fields are left alone: the speaker is reattached in a separate step and the
    /// owning camp never changes.
    pub fn overlay(&self, talk: &mut Talk) {
        if let Some(title) = &self.title {
            talk.title = title.clone();
        }
        if let Some(abstract_text) = &self.abstract_text {
            talk.abstract_text = Some(abstract_text.clone());
        }
        if let Some(level) = self.level {
            talk.level = Some(level);
        }
    }
}

/// A talk as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TalkResponse {
    pub talk_id: TalkId,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub level: Option<i32>,
    /// Only present when speakers were requested and the talk has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<SpeakerResponse>,
}

impl From<Talk> for TalkResponse {
    fn from(talk: Talk) -> Self {
        Self {
            talk_id: talk.id,
            title: talk.title,
            abstract_text: talk.abstract_text,
            level: talk.level,
            speaker: talk.speaker.map(SpeakerResponse::from),
        }
    }
}
