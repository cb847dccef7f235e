//! The repository contract for the camp domain.

use crate::db::errors::Result;
use crate::db::models::{
    camps::{Camp, CampCreateDBRequest},
    speakers::Speaker,
    talks::{Talk, TalkCreateDBRequest},
};
use crate::types::{SpeakerId, TalkId};
use chrono::NaiveDate;

/// Token handed out when an insert is staged.
///
/// Once the unit of work has been saved, [`CampRepository::inserted_key`] resolves it to the
/// key assigned by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Staged(pub(crate) usize);

/// Data access for camps, their talks and the shared speaker pool.
///
/// Reads hit storage immediately. Every read that can return related entities takes an explicit
/// `include_*` flag; related collections are loaded in the same statement when asked for and left
/// as `None` otherwise. Nothing is ever loaded lazily.
///
/// Writes are staged and only reach storage when [`save_changes`](Self::save_changes) commits
/// them as one transaction.
#[async_trait::async_trait]
pub trait CampRepository {
    /// All camps ordered by event date (ties broken by key)
    async fn get_all_camps(&mut self, include_talks: bool) -> Result<Vec<Camp>>;

    /// Look up a camp by its moniker (exact, case-sensitive match)
    async fn get_camp(&mut self, moniker: &str, include_talks: bool) -> Result<Option<Camp>>;

    /// Camps whose event falls on the given calendar date, ignoring time of day
    async fn get_all_camps_by_event_date(&mut self, date: NaiveDate, include_talks: bool) -> Result<Vec<Camp>>;

    /// Talks of the camp with this moniker; empty when the camp does not exist
    async fn get_talks_by_moniker(&mut self, moniker: &str, include_speakers: bool) -> Result<Vec<Talk>>;

    /// A single talk, only if it belongs to the camp with this moniker
    async fn get_talk_by_moniker(&mut self, moniker: &str, talk_id: TalkId, include_speakers: bool) -> Result<Option<Talk>>;

    async fn get_speaker(&mut self, speaker_id: SpeakerId) -> Result<Option<Speaker>>;

    /// Stage a new camp for insertion
    fn add_camp(&mut self, camp: CampCreateDBRequest) -> Staged;

    /// Stage a new talk for insertion
    fn add_talk(&mut self, talk: TalkCreateDBRequest) -> Staged;

    /// Stage a write of the camp's current scalar state
    fn update_camp(&mut self, camp: &Camp);

    /// Stage a write of the talk's current state. The owning camp is never rewritten.
    fn update_talk(&mut self, talk: &Talk);

    /// Stage removal of a camp together with its talks
    fn delete_camp(&mut self, camp: &Camp);

    fn delete_talk(&mut self, talk: &Talk);

    /// Commit everything staged so far as one atomic unit.
    ///
    /// Returns whether at least one row was affected. Storage failures are returned as errors
    /// and leave nothing committed; the staged changes are discarded either way.
    async fn save_changes(&mut self) -> Result<bool>;

    /// Key assigned to a staged insert by a successful save
    fn inserted_key(&self, staged: Staged) -> Option<i64>;
}
