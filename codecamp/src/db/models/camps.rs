use crate::db::models::talks::Talk;
use crate::types::CampId;
use chrono::NaiveDateTime;

/// Where a camp takes place. Stored inline on the camp row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub venue_name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub city_town: Option<String>,
    pub state_province: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// A camp as loaded from storage
#[derive(Debug, Clone, PartialEq)]
pub struct Camp {
    pub id: CampId,
    pub moniker: String,
    pub title: String,
    pub event_date: NaiveDateTime,
    /// Length of the event in days
    pub length: i32,
    pub capacity: Option<i32>,
    pub location: Location,
    /// `None` unless the talks were eagerly loaded with the camp
    pub talks: Option<Vec<Talk>>,
}

/// Database request for creating a new camp
#[derive(Debug, Clone)]
pub struct CampCreateDBRequest {
    pub moniker: String,
    pub title: String,
    pub event_date: NaiveDateTime,
    pub length: i32,
    pub capacity: Option<i32>,
    pub location: Location,
}
