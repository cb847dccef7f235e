//! Database repository for camps, talks and speakers.

use std::collections::HashMap;

use crate::db::{
    errors::Result,
    handlers::repository::{CampRepository, Staged},
    models::{
        camps::{Camp, CampCreateDBRequest, Location},
        speakers::Speaker,
        talks::{Talk, TalkCreateDBRequest},
    },
};
use crate::types::{CampId, SpeakerId, TalkId};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{Connection, FromRow, QueryBuilder, Sqlite, SqliteConnection};
use tracing::instrument;

const CAMP_SELECT: &str = "SELECT c.* FROM camps c";

const CAMP_WITH_TALKS_SELECT: &str = r#"
    SELECT c.*,
        t.id AS talk_id,
        t.title AS talk_title,
        t.abstract_text AS talk_abstract_text,
        t.level AS talk_level,
        t.speaker_id AS talk_speaker_id
    FROM camps c
    LEFT JOIN talks t ON t.camp_id = c.id"#;

const TALK_SELECT: &str = "SELECT t.* FROM talks t INNER JOIN camps c ON c.id = t.camp_id";

const TALK_WITH_SPEAKER_SELECT: &str = r#"
    SELECT t.*,
        s.id AS s_id,
        s.first_name AS s_first_name,
        s.middle_name AS s_middle_name,
        s.last_name AS s_last_name,
        s.bio AS s_bio,
        s.company AS s_company,
        s.company_url AS s_company_url,
        s.blog_url AS s_blog_url,
        s.twitter AS s_twitter,
        s.github AS s_github
    FROM talks t
    INNER JOIN camps c ON c.id = t.camp_id
    LEFT JOIN speakers s ON s.id = t.speaker_id"#;

// Database row models
#[derive(Debug, FromRow)]
struct CampRow {
    id: CampId,
    moniker: String,
    title: String,
    event_date: NaiveDateTime,
    length: i32,
    capacity: Option<i32>,
    venue_name: Option<String>,
    address1: Option<String>,
    address2: Option<String>,
    address3: Option<String>,
    city_town: Option<String>,
    state_province: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
}

impl CampRow {
    fn into_camp(self, talks: Option<Vec<Talk>>) -> Camp {
        Camp {
            id: self.id,
            moniker: self.moniker,
            title: self.title,
            event_date: self.event_date,
            length: self.length,
            capacity: self.capacity,
            location: Location {
                venue_name: self.venue_name,
                address1: self.address1,
                address2: self.address2,
                address3: self.address3,
                city_town: self.city_town,
                state_province: self.state_province,
                postal_code: self.postal_code,
                country: self.country,
            },
            talks,
        }
    }
}

/// One row of the camps-left-join-talks statement. Talk columns are null for camps without talks.
#[derive(Debug, FromRow)]
struct CampTalkRow {
    #[sqlx(flatten)]
    camp: CampRow,
    talk_id: Option<TalkId>,
    talk_title: Option<String>,
    talk_abstract_text: Option<String>,
    talk_level: Option<i32>,
    talk_speaker_id: Option<SpeakerId>,
}

impl CampTalkRow {
    fn split(self) -> (CampRow, Option<Talk>) {
        let talk = match (self.talk_id, self.talk_title) {
            (Some(id), Some(title)) => Some(Talk {
                id,
                camp_id: self.camp.id,
                title,
                abstract_text: self.talk_abstract_text,
                level: self.talk_level,
                speaker_id: self.talk_speaker_id,
                speaker: None,
            }),
            _ => None,
        };
        (self.camp, talk)
    }
}

#[derive(Debug, FromRow)]
struct TalkRow {
    id: TalkId,
    camp_id: CampId,
    title: String,
    abstract_text: Option<String>,
    level: Option<i32>,
    speaker_id: Option<SpeakerId>,
}

impl From<TalkRow> for Talk {
    fn from(row: TalkRow) -> Self {
        Self {
            id: row.id,
            camp_id: row.camp_id,
            title: row.title,
            abstract_text: row.abstract_text,
            level: row.level,
            speaker_id: row.speaker_id,
            speaker: None,
        }
    }
}

#[derive(Debug, FromRow)]
struct TalkSpeakerRow {
    #[sqlx(flatten)]
    talk: TalkRow,
    s_id: Option<SpeakerId>,
    s_first_name: Option<String>,
    s_middle_name: Option<String>,
    s_last_name: Option<String>,
    s_bio: Option<String>,
    s_company: Option<String>,
    s_company_url: Option<String>,
    s_blog_url: Option<String>,
    s_twitter: Option<String>,
    s_github: Option<String>,
}

impl From<TalkSpeakerRow> for Talk {
    fn from(row: TalkSpeakerRow) -> Self {
        let speaker = match (row.s_id, row.s_first_name, row.s_last_name) {
            (Some(id), Some(first_name), Some(last_name)) => Some(Speaker {
                id,
                first_name,
                middle_name: row.s_middle_name,
                last_name,
                bio: row.s_bio,
                company: row.s_company,
                company_url: row.s_company_url,
                blog_url: row.s_blog_url,
                twitter: row.s_twitter,
                github: row.s_github,
            }),
            _ => None,
        };

        Self {
            speaker,
            ..Talk::from(row.talk)
        }
    }
}

/// Fold joined rows back into camps. Rows arrive ordered by camp, so each camp's rows are adjacent.
fn group_camp_talks(rows: Vec<CampTalkRow>) -> Vec<Camp> {
    let mut camps: Vec<Camp> = Vec::new();

    for row in rows {
        let (camp_row, talk) = row.split();
        match camps.last_mut() {
            Some(camp) if camp.id == camp_row.id => {
                if let Some(talk) = talk {
                    camp.talks.get_or_insert_with(Vec::new).push(talk);
                }
            }
            _ => camps.push(camp_row.into_camp(Some(talk.into_iter().collect()))),
        }
    }

    camps
}

#[derive(Debug)]
enum CampFilter {
    All,
    Moniker(String),
    EventDate(NaiveDate),
}

#[derive(Debug)]
enum PendingChange {
    AddCamp(Staged, CampCreateDBRequest),
    AddTalk(Staged, TalkCreateDBRequest),
    UpdateCamp(Camp),
    UpdateTalk(Talk),
    DeleteCamp(CampId),
    DeleteTalk(TalkId),
}

/// SQLite-backed [`CampRepository`].
///
/// Wraps one connection for the lifetime of a request. Staged changes live only in this value;
/// dropping it without saving discards them.
pub struct Camps<'c> {
    db: &'c mut SqliteConnection,
    pending: Vec<PendingChange>,
    next_staged: usize,
    inserted: HashMap<Staged, i64>,
}

impl<'c> Camps<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self {
            db,
            pending: Vec::new(),
            next_staged: 0,
            inserted: HashMap::new(),
        }
    }

    /// Number of changes waiting for [`CampRepository::save_changes`]
    pub fn pending_changes(&self) -> usize {
        self.pending.len()
    }

    fn next_token(&mut self) -> Staged {
        let token = Staged(self.next_staged);
        self.next_staged += 1;
        token
    }

    async fn fetch_camps(&mut self, filter: CampFilter, include_talks: bool) -> Result<Vec<Camp>> {
        let mut query = QueryBuilder::<Sqlite>::new(if include_talks { CAMP_WITH_TALKS_SELECT } else { CAMP_SELECT });

        match filter {
            CampFilter::All => {}
            CampFilter::Moniker(moniker) => {
                query.push(" WHERE c.moniker = ");
                query.push_bind(moniker);
            }
            CampFilter::EventDate(date) => {
                query.push(" WHERE date(c.event_date) = ");
                query.push_bind(date.format("%Y-%m-%d").to_string());
            }
        }

        query.push(" ORDER BY c.event_date, c.id");

        if include_talks {
            query.push(", t.id");
            let rows = query.build_query_as::<CampTalkRow>().fetch_all(&mut *self.db).await?;
            Ok(group_camp_talks(rows))
        } else {
            let rows = query.build_query_as::<CampRow>().fetch_all(&mut *self.db).await?;
            Ok(rows.into_iter().map(|row| row.into_camp(None)).collect())
        }
    }

    async fn fetch_talks(&mut self, moniker: &str, talk_id: Option<TalkId>, include_speakers: bool) -> Result<Vec<Talk>> {
        let mut query = QueryBuilder::<Sqlite>::new(if include_speakers { TALK_WITH_SPEAKER_SELECT } else { TALK_SELECT });

        query.push(" WHERE c.moniker = ");
        query.push_bind(moniker.to_string());

        if let Some(talk_id) = talk_id {
            query.push(" AND t.id = ");
            query.push_bind(talk_id);
        }

        query.push(" ORDER BY t.id");

        if include_speakers {
            let rows = query.build_query_as::<TalkSpeakerRow>().fetch_all(&mut *self.db).await?;
            Ok(rows.into_iter().map(Talk::from).collect())
        } else {
            let rows = query.build_query_as::<TalkRow>().fetch_all(&mut *self.db).await?;
            Ok(rows.into_iter().map(Talk::from).collect())
        }
    }
}

#[async_trait::async_trait]
impl<'c> CampRepository for Camps<'c> {
    #[instrument(skip(self), err)]
    async fn get_all_camps(&mut self, include_talks: bool) -> Result<Vec<Camp>> {
        self.fetch_camps(CampFilter::All, include_talks).await
    }

    #[instrument(skip(self), err)]
    async fn get_camp(&mut self, moniker: &str, include_talks: bool) -> Result<Option<Camp>> {
        let camps = self.fetch_camps(CampFilter::Moniker(moniker.to_string()), include_talks).await?;
        Ok(camps.into_iter().next())
    }

    #[instrument(skip(self), fields(date = %date), err)]
    async fn get_all_camps_by_event_date(&mut self, date: NaiveDate, include_talks: bool) -> Result<Vec<Camp>> {
        self.fetch_camps(CampFilter::EventDate(date), include_talks).await
    }

    #[instrument(skip(self), err)]
    async fn get_talks_by_moniker(&mut self, moniker: &str, include_speakers: bool) -> Result<Vec<Talk>> {
        self.fetch_talks(moniker, None, include_speakers).await
    }

    #[instrument(skip(self), err)]
    async fn get_talk_by_moniker(&mut self, moniker: &str, talk_id: TalkId, include_speakers: bool) -> Result<Option<Talk>> {
        let talks = self.fetch_talks(moniker, Some(talk_id), include_speakers).await?;
        Ok(talks.into_iter().next())
    }

    #[instrument(skip(self), err)]
    async fn get_speaker(&mut self, speaker_id: SpeakerId) -> Result<Option<Speaker>> {
        let speaker = sqlx::query_as::<_, Speaker>("SELECT * FROM speakers WHERE id = ?")
            .bind(speaker_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(speaker)
    }

    fn add_camp(&mut self, camp: CampCreateDBRequest) -> Staged {
        let token = self.next_token();
        self.pending.push(PendingChange::AddCamp(token, camp));
        token
    }

    fn add_talk(&mut self, talk: TalkCreateDBRequest) -> Staged {
        let token = self.next_token();
        self.pending.push(PendingChange::AddTalk(token, talk));
        token
    }

    fn update_camp(&mut self, camp: &Camp) {
        self.pending.push(PendingChange::UpdateCamp(Camp { talks: None, ..camp.clone() }));
    }

    fn update_talk(&mut self, talk: &Talk) {
        self.pending.push(PendingChange::UpdateTalk(Talk { speaker: None, ..talk.clone() }));
    }

    fn delete_camp(&mut self, camp: &Camp) {
        self.pending.push(PendingChange::DeleteCamp(camp.id));
    }

    fn delete_talk(&mut self, talk: &Talk) {
        self.pending.push(PendingChange::DeleteTalk(talk.id));
    }

    #[instrument(skip(self), err)]
    async fn save_changes(&mut self) -> Result<bool> {
        // Taken up front so a failed or abandoned save never leaves half-staged state behind
        let changes = std::mem::take(&mut self.pending);
        if changes.is_empty() {
            return Ok(false);
        }

        let mut tx = self.db.begin().await?;
        let mut rows_affected = 0;
        let mut inserted = Vec::new();

        for change in changes {
            match change {
                PendingChange::AddCamp(token, camp) => {
                    let result = sqlx::query(
                        r#"
                        INSERT INTO camps (
                            moniker, title, event_date, length, capacity,
                            venue_name, address1, address2, address3,
                            city_town, state_province, postal_code, country
                        )
                        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                        "#,
                    )
                    .bind(camp.moniker)
                    .bind(camp.title)
                    .bind(camp.event_date)
                    .bind(camp.length)
                    .bind(camp.capacity)
                    .bind(camp.location.venue_name)
                    .bind(camp.location.address1)
                    .bind(camp.location.address2)
                    .bind(camp.location.address3)
                    .bind(camp.location.city_town)
                    .bind(camp.location.state_province)
                    .bind(camp.location.postal_code)
                    .bind(camp.location.country)
                    .execute(&mut *tx)
                    .await?;

                    rows_affected += result.rows_affected();
                    inserted.push((token, result.last_insert_rowid()));
                }
                PendingChange::AddTalk(token, talk) => {
                    let result = sqlx::query(
                        r#"
                        INSERT INTO talks (camp_id, title, abstract_text, level, speaker_id)
                        VALUES (?, ?, ?, ?, ?)
                        "#,
                    )
                    .bind(talk.camp_id)
                    .bind(talk.title)
                    .bind(talk.abstract_text)
                    .bind(talk.level)
                    .bind(talk.speaker_id)
                    .execute(&mut *tx)
                    .await?;

                    rows_affected += result.rows_affected();
                    inserted.push((token, result.last_insert_rowid()));
                }
                PendingChange::UpdateCamp(camp) => {
                    let result = sqlx::query(
                        r#"
                        UPDATE camps SET
                            moniker = ?, title = ?, event_date = ?, length = ?, capacity = ?,
                            venue_name = ?, address1 = ?, address2 = ?, address3 = ?,
                            city_town = ?, state_province = ?, postal_code = ?, country = ?
                        WHERE id = ?
                        "#,
                    )
                    .bind(camp.moniker)
                    .bind(camp.title)
                    .bind(camp.event_date)
                    .bind(camp.length)
                    .bind(camp.capacity)
                    .bind(camp.location.venue_name)
                    .bind(camp.location.address1)
                    .bind(camp.location.address2)
                    .bind(camp.location.address3)
                    .bind(camp.location.city_town)
                    .bind(camp.location.state_province)
                    .bind(camp.location.postal_code)
                    .bind(camp.location.country)
                    .bind(camp.id)
                    .execute(&mut *tx)
                    .await?;

                    rows_affected += result.rows_affected();
                }
                PendingChange::UpdateTalk(talk) => {
                    let result = sqlx::query("UPDATE talks SET title = ?, abstract_text = ?, level = ?, speaker_id = ? WHERE id = ?")
                        .bind(talk.title)
                        .bind(talk.abstract_text)
                        .bind(talk.level)
                        .bind(talk.speaker_id)
                        .bind(talk.id)
                        .execute(&mut *tx)
                        .await?;

                    rows_affected += result.rows_affected();
                }
                PendingChange::DeleteCamp(camp_id) => {
                    // Talks are owned by their camp and go with it
                    let talks = sqlx::query("DELETE FROM talks WHERE camp_id = ?")
                        .bind(camp_id)
                        .execute(&mut *tx)
                        .await?;
                    let camp = sqlx::query("DELETE FROM camps WHERE id = ?").bind(camp_id).execute(&mut *tx).await?;

                    rows_affected += talks.rows_affected() + camp.rows_affected();
                }
                PendingChange::DeleteTalk(talk_id) => {
                    let result = sqlx::query("DELETE FROM talks WHERE id = ?").bind(talk_id).execute(&mut *tx).await?;

                    rows_affected += result.rows_affected();
                }
            }
        }

        tx.commit().await?;
        self.inserted.extend(inserted);

        tracing::debug!("Saved unit of work, {} rows affected", rows_affected);

        Ok(rows_affected > 0)
    }

    fn inserted_key(&self, staged: Staged) -> Option<i64> {
        self.inserted.get(&staged).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::errors::DbError;
    use crate::test_utils::*;
    use sqlx::SqlitePool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_add_camp_then_get_round_trips(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Camps::new(&mut conn);

        let request = CampCreateDBRequest {
            moniker: "NDCOSLO".to_string(),
            title: "NDC Oslo".to_string(),
            event_date: event_date(2019, 6, 10),
            length: 3,
            capacity: Some(2500),
            location: Location {
                venue_name: Some("Oslo Spektrum".to_string()),
                city_town: Some("Oslo".to_string()),
                country: Some("Norway".to_string()),
                ..Default::default()
            },
        };
        let staged = repo.add_camp(request.clone());

        // Nothing is written before save
        assert!(repo.get_camp("NDCOSLO", false).await.unwrap().is_none());
        assert_eq!(repo.pending_changes(), 1);

        assert!(repo.save_changes().await.unwrap());
        assert_eq!(repo.pending_changes(), 0);

        let camp = repo.get_camp("NDCOSLO", false).await.unwrap().expect("camp should exist");
        assert_eq!(Some(camp.id), repo.inserted_key(staged));
        assert_eq!(camp.moniker, request.moniker);
        assert_eq!(camp.title, request.title);
        assert_eq!(camp.event_date, request.event_date);
        assert_eq!(camp.length, request.length);
        assert_eq!(camp.capacity, request.capacity);
        assert_eq!(camp.location, request.location);
        assert!(camp.talks.is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_camp_is_case_sensitive_and_absent_is_none(pool: SqlitePool) {
        create_test_camp(&pool, "NDCOSLO", event_date(2019, 6, 10)).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Camps::new(&mut conn);

        assert!(repo.get_camp("NDCOSLO", false).await.unwrap().is_some());
        assert!(repo.get_camp("ndcoslo", false).await.unwrap().is_none());
        assert!(repo.get_camp("MISSING", true).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_all_camps_orders_by_event_date(pool: SqlitePool) {
        create_test_camp(&pool, "LATE", event_date(2020, 1, 1)).await;
        create_test_camp(&pool, "EARLY", event_date(2018, 10, 18)).await;
        create_test_camp(&pool, "MIDDLE", event_date(2019, 6, 10)).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Camps::new(&mut conn);

        let monikers: Vec<String> = repo
            .get_all_camps(false)
            .await
            .unwrap()
            .into_iter()
            .map(|camp| camp.moniker)
            .collect();
        assert_eq!(monikers, vec!["EARLY", "MIDDLE", "LATE"]);

        let monikers: Vec<String> = repo
            .get_all_camps(true)
            .await
            .unwrap()
            .into_iter()
            .map(|camp| camp.moniker)
            .collect();
        assert_eq!(monikers, vec!["EARLY", "MIDDLE", "LATE"]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_include_talks_flag_controls_eager_loading(pool: SqlitePool) {
        create_test_camp(&pool, "ATL2018", event_date(2018, 10, 18)).await;
        create_test_camp(&pool, "NDCOSLO", event_date(2019, 6, 10)).await;
        create_test_camp(&pool, "EMPTY", event_date(2019, 9, 1)).await;

        let atl_1 = create_test_talk(&pool, "ATL2018", "Entity Framework", None).await;
        let oslo_1 = create_test_talk(&pool, "NDCOSLO", "Intro", None).await;
        let atl_2 = create_test_talk(&pool, "ATL2018", "Async Rust", None).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Camps::new(&mut conn);

        let camps = repo.get_all_camps(false).await.unwrap();
        assert_eq!(camps.len(), 3);
        assert!(camps.iter().all(|camp| camp.talks.is_none()));

        let camps = repo.get_all_camps(true).await.unwrap();
        assert_eq!(camps.len(), 3);

        let talk_ids = |moniker: &str| -> Vec<TalkId> {
            camps
                .iter()
                .find(|camp| camp.moniker == moniker)
                .and_then(|camp| camp.talks.as_ref())
                .map(|talks| talks.iter().map(|talk| talk.id).collect())
                .unwrap()
        };
        assert_eq!(talk_ids("ATL2018"), vec![atl_1.id, atl_2.id]);
        assert_eq!(talk_ids("NDCOSLO"), vec![oslo_1.id]);
        assert!(talk_ids("EMPTY").is_empty());

        // Talks loaded with a camp never carry speakers
        let camp = repo.get_camp("ATL2018", true).await.unwrap().unwrap();
        let talks = camp.talks.unwrap();
        assert_eq!(talks.len(), 2);
        assert!(talks.iter().all(|talk| talk.speaker.is_none() && talk.camp_id == camp.id));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_all_camps_by_event_date_ignores_time_of_day(pool: SqlitePool) {
        let morning = chrono::NaiveDate::from_ymd_opt(2019, 6, 10)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        create_test_camp(&pool, "NDCOSLO", morning).await;
        create_test_camp(&pool, "SAMEDAY", event_date(2019, 6, 10)).await;
        create_test_camp(&pool, "NEXTDAY", event_date(2019, 6, 11)).await;
        create_test_talk(&pool, "NDCOSLO", "Intro", None).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Camps::new(&mut conn);

        let date = NaiveDate::from_ymd_opt(2019, 6, 10).unwrap();
        let camps = repo.get_all_camps_by_event_date(date, false).await.unwrap();
        let monikers: Vec<&str> = camps.iter().map(|camp| camp.moniker.as_str()).collect();
        assert_eq!(monikers, vec!["SAMEDAY", "NDCOSLO"]);

        let camps = repo.get_all_camps_by_event_date(date, true).await.unwrap();
        let oslo = camps.iter().find(|camp| camp.moniker == "NDCOSLO").unwrap();
        assert_eq!(oslo.talks.as_ref().unwrap().len(), 1);

        let none = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        assert!(repo.get_all_camps_by_event_date(none, true).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_talks_by_moniker(pool: SqlitePool) {
        let speaker = create_test_speaker(&pool, 7).await;
        create_test_camp(&pool, "NDCOSLO", event_date(2019, 6, 10)).await;
        create_test_camp(&pool, "OTHER", event_date(2019, 7, 1)).await;
        let with_speaker = create_test_talk(&pool, "NDCOSLO", "Intro", Some(speaker.id)).await;
        let without_speaker = create_test_talk(&pool, "NDCOSLO", "Lightning", None).await;
        create_test_talk(&pool, "OTHER", "Elsewhere", None).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Camps::new(&mut conn);

        let talks = repo.get_talks_by_moniker("NDCOSLO", false).await.unwrap();
        assert_eq!(talks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![with_speaker.id, without_speaker.id]);
        assert!(talks.iter().all(|t| t.speaker.is_none()));
        assert_eq!(talks[0].speaker_id, Some(speaker.id));

        let talks = repo.get_talks_by_moniker("NDCOSLO", true).await.unwrap();
        assert_eq!(talks[0].speaker.as_ref(), Some(&speaker));
        assert!(talks[1].speaker.is_none());

        // A missing camp is not an error at this layer
        assert!(repo.get_talks_by_moniker("MISSING", true).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_talk_by_moniker_requires_matching_camp(pool: SqlitePool) {
        create_test_camp(&pool, "NDCOSLO", event_date(2019, 6, 10)).await;
        create_test_camp(&pool, "OTHER", event_date(2019, 7, 1)).await;
        let talk = create_test_talk(&pool, "NDCOSLO", "Intro", None).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Camps::new(&mut conn);

        let found = repo.get_talk_by_moniker("NDCOSLO", talk.id, false).await.unwrap();
        assert_eq!(found, Some(talk.clone()));

        assert!(repo.get_talk_by_moniker("OTHER", talk.id, false).await.unwrap().is_none());
        assert!(repo.get_talk_by_moniker("OTHER", talk.id, true).await.unwrap().is_none());
        assert!(repo.get_talk_by_moniker("NDCOSLO", talk.id + 100, false).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_speaker(pool: SqlitePool) {
        let speaker = create_test_speaker(&pool, 7).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Camps::new(&mut conn);

        assert_eq!(repo.get_speaker(7).await.unwrap(), Some(speaker));
        assert!(repo.get_speaker(999).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_save_changes_reports_affected_rows(pool: SqlitePool) {
        create_test_camp(&pool, "NDCOSLO", event_date(2019, 6, 10)).await;
        let talk = create_test_talk(&pool, "NDCOSLO", "Intro", None).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Camps::new(&mut conn);

        // Nothing staged
        assert!(!repo.save_changes().await.unwrap());

        repo.delete_talk(&talk);
        assert!(repo.save_changes().await.unwrap());
        assert!(repo.get_talk_by_moniker("NDCOSLO", talk.id, false).await.unwrap().is_none());

        // Deleting it again touches no rows
        repo.delete_talk(&talk);
        assert!(!repo.save_changes().await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_save_changes_is_atomic(pool: SqlitePool) {
        create_test_camp(&pool, "NDCOSLO", event_date(2019, 6, 10)).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Camps::new(&mut conn);

        let fresh = repo.add_camp(camp_request("FRESH", event_date(2020, 1, 1)));
        repo.add_camp(camp_request("NDCOSLO", event_date(2020, 1, 1)));

        let err = repo.save_changes().await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }), "unexpected error: {err:?}");

        // The first insert was rolled back with the failing one, and nothing stays staged
        assert!(repo.get_camp("FRESH", false).await.unwrap().is_none());
        assert!(repo.inserted_key(fresh).is_none());
        assert_eq!(repo.pending_changes(), 0);
        assert!(!repo.save_changes().await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_camp_cascades_to_talks(pool: SqlitePool) {
        let camp = create_test_camp(&pool, "NDCOSLO", event_date(2019, 6, 10)).await;
        create_test_camp(&pool, "OTHER", event_date(2019, 7, 1)).await;
        create_test_talk(&pool, "NDCOSLO", "Intro", None).await;
        create_test_talk(&pool, "NDCOSLO", "Outro", None).await;
        let survivor = create_test_talk(&pool, "OTHER", "Elsewhere", None).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Camps::new(&mut conn);

        repo.delete_camp(&camp);
        assert!(repo.save_changes().await.unwrap());

        assert!(repo.get_camp("NDCOSLO", false).await.unwrap().is_none());
        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM talks").fetch_one(&mut *repo.db).await.unwrap();
        assert_eq!(remaining, 1);
        assert!(repo.get_talk_by_moniker("OTHER", survivor.id, false).await.unwrap().is_some());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_talk_keeps_owning_camp(pool: SqlitePool) {
        let speaker = create_test_speaker(&pool, 7).await;
        let oslo = create_test_camp(&pool, "NDCOSLO", event_date(2019, 6, 10)).await;
        let other = create_test_camp(&pool, "OTHER", event_date(2019, 7, 1)).await;
        let talk = create_test_talk(&pool, "NDCOSLO", "Intro", None).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Camps::new(&mut conn);

        let mut changed = talk.clone();
        changed.title = "Introduction".to_string();
        changed.level = Some(200);
        changed.speaker_id = Some(speaker.id);
        changed.camp_id = other.id;
        repo.update_talk(&changed);
        assert!(repo.save_changes().await.unwrap());

        let reloaded = repo.get_talk_by_moniker("NDCOSLO", talk.id, true).await.unwrap().unwrap();
        assert_eq!(reloaded.camp_id, oslo.id);
        assert_eq!(reloaded.title, "Introduction");
        assert_eq!(reloaded.level, Some(200));
        assert_eq!(reloaded.speaker, Some(speaker));
        assert!(repo.get_talk_by_moniker("OTHER", talk.id, false).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_camp_writes_scalar_fields(pool: SqlitePool) {
        let mut camp = create_test_camp(&pool, "NDCOSLO", event_date(2019, 6, 10)).await;
        create_test_talk(&pool, "NDCOSLO", "Intro", None).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Camps::new(&mut conn);

        camp.title = "NDC Oslo 2019".to_string();
        camp.capacity = Some(3000);
        camp.location.city_town = Some("Oslo".to_string());
        repo.update_camp(&camp);
        assert!(repo.save_changes().await.unwrap());

        let reloaded = repo.get_camp("NDCOSLO", true).await.unwrap().unwrap();
        assert_eq!(reloaded.title, "NDC Oslo 2019");
        assert_eq!(reloaded.capacity, Some(3000));
        assert_eq!(reloaded.location.city_town.as_deref(), Some("Oslo"));
        assert_eq!(reloaded.talks.unwrap().len(), 1);
    }
}
