//! Test utilities shared by the unit and HTTP tests.

use crate::db::handlers::{CampRepository, Camps};
use crate::db::models::camps::{Camp, CampCreateDBRequest, Location};
use crate::db::models::speakers::Speaker;
use crate::db::models::talks::{Talk, TalkCreateDBRequest};
use crate::types::SpeakerId;
use axum_test::TestServer;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::SqlitePool;

pub async fn create_test_app(pool: SqlitePool) -> TestServer {
    create_test_app_with_config(pool, create_test_config()).await
}

pub async fn create_test_app_with_config(pool: SqlitePool, config: crate::config::Config) -> TestServer {
    let app = crate::Application::new_with_pool(config, Some(pool))
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

pub fn create_test_config() -> crate::config::Config {
    crate::config::Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        // Unused: tests hand in their own pool
        database: crate::config::DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            pool: crate::config::PoolSettings {
                max_connections: 1,
                min_connections: 0,
                ..Default::default()
            },
        },
        ..Default::default()
    }
}

/// Midnight on the given day
pub fn event_date(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("valid test date")
}

pub fn camp_request(moniker: &str, event_date: NaiveDateTime) -> CampCreateDBRequest {
    CampCreateDBRequest {
        moniker: moniker.to_string(),
        title: format!("{moniker} conference"),
        event_date,
        length: 1,
        capacity: None,
        location: Location {
            city_town: Some("Atlanta".to_string()),
            ..Default::default()
        },
    }
}

pub async fn create_test_camp(pool: &SqlitePool, moniker: &str, event_date: NaiveDateTime) -> Camp {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Camps::new(&mut conn);

    repo.add_camp(camp_request(moniker, event_date));
    assert!(repo.save_changes().await.expect("Failed to save test camp"));

    repo.get_camp(moniker, false)
        .await
        .expect("Failed to reload test camp")
        .expect("Test camp missing after save")
}

pub async fn create_test_talk(pool: &SqlitePool, moniker: &str, title: &str, speaker_id: Option<SpeakerId>) -> Talk {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Camps::new(&mut conn);

    let camp = repo
        .get_camp(moniker, false)
        .await
        .expect("Failed to load camp")
        .expect("Camp for test talk does not exist");

    let staged = repo.add_talk(TalkCreateDBRequest {
        camp_id: camp.id,
        title: title.to_string(),
        abstract_text: None,
        level: Some(100),
        speaker_id,
    });
    assert!(repo.save_changes().await.expect("Failed to save test talk"));

    let talk_id = repo.inserted_key(staged).expect("No id for saved test talk");
    repo.get_talk_by_moniker(moniker, talk_id, false)
        .await
        .expect("Failed to reload test talk")
        .expect("Test talk missing after save")
}

/// Insert a speaker with a fixed id. Speakers have no write path in the service.
pub async fn create_test_speaker(pool: &SqlitePool, id: SpeakerId) -> Speaker {
    sqlx::query_as::<_, Speaker>(
        "INSERT INTO speakers (id, first_name, last_name, company, twitter, github)
         VALUES (?, 'Test', ?, 'Contoso', ?, ?)
         RETURNING id, first_name, middle_name, last_name, bio, company, company_url, blog_url, twitter, github",
    )
    .bind(id)
    .bind(format!("Speaker {id}"))
    .bind(format!("@speaker{id}"))
    .bind(format!("speaker{id}"))
    .fetch_one(pool)
    .await
    .expect("Failed to create test speaker")
}
