//! Common type definitions.
//!
//! Entity keys are storage-assigned SQLite row ids. Camps additionally carry a
//! client-chosen moniker which is the only identifier exposed over HTTP.
//!
//! - [`CampId`]: Camp row identifier (internal only)
//! - [`TalkId`]: Talk identifier, exposed as `talkId`
//! - [`SpeakerId`]: Speaker identifier, exposed as `speakerId`

pub type CampId = i64;
pub type TalkId = i64;
pub type SpeakerId = i64;
