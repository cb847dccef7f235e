use crate::db::models::speakers::Speaker;
use crate::types::{CampId, SpeakerId, TalkId};

/// A talk as loaded from storage.
///
/// `camp_id` is fixed at creation; updates never rewrite it.
#[derive(Debug, Clone, PartialEq)]
pub struct Talk {
    pub id: TalkId,
    pub camp_id: CampId,
    pub title: String,
    pub abstract_text: Option<String>,
    pub level: Option<i32>,
    pub speaker_id: Option<SpeakerId>,
    /// `None` unless the speaker was eagerly loaded (or the talk has no speaker)
    pub speaker: Option<Speaker>,
}

/// Database request for creating a new talk under an existing camp
#[derive(Debug, Clone)]
pub struct TalkCreateDBRequest {
    pub camp_id: CampId,
    pub title: String,
    pub abstract_text: Option<String>,
    pub level: Option<i32>,
    pub speaker_id: Option<SpeakerId>,
}
