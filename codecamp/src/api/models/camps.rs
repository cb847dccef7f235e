//! API request/response models for camps.

use super::talks::TalkResponse;
use super::validation::ValidationErrors;
use crate::db::models::camps::{Camp, CampCreateDBRequest, Location};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

const MONIKER_MAX: usize = 30;
/// Path segments routed ahead of `/camps/{moniker}/...`; a camp with one of these monikers could
/// never be addressed
const RESERVED_MONIKERS: &[&str] = &["searchByDate"];
const TITLE_MAX: usize = 100;
const LOCATION_PART_MAX: usize = 100;
const LENGTH_MIN: i32 = 1;
const LENGTH_MAX: i32 = 30;
const DEFAULT_LENGTH: i32 = 1;

/// Parse an event date as sent by clients.
///
/// Accepts a bare calendar date (`2019-06-10`, midnight assumed), a local date-time
/// (`2019-06-10T09:30:00`, optionally with fractional seconds or a space separator) or an RFC 3339
/// timestamp, whose offset is dropped.
pub fn parse_event_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
}

/// Serde adapter for optional event dates in request bodies
mod event_date_format {
    use super::parse_event_date;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, de::Error};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|raw| parse_event_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid event date `{raw}`"))))
            .transpose()
    }
}

/// Query parameters for reading camps
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CampQuery {
    /// Embed each camp's talks in the response
    #[serde(default)]
    pub include_talks: bool,
}

/// Where a camp takes place. In updates, only provided parts are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationModel {
    #[schema(example = "Oslo Spektrum")]
    pub venue_name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    #[schema(example = "Oslo")]
    pub city_town: Option<String>,
    pub state_province: Option<String>,
    pub postal_code: Option<String>,
    #[schema(example = "Norway")]
    pub country: Option<String>,
}

impl LocationModel {
    fn validate(&self, errors: &mut ValidationErrors) {
        for (field, value) in [
            ("location.venueName", &self.venue_name),
            ("location.address1", &self.address1),
            ("location.address2", &self.address2),
            ("location.address3", &self.address3),
            ("location.cityTown", &self.city_town),
            ("location.stateProvince", &self.state_province),
            ("location.postalCode", &self.postal_code),
            ("location.country", &self.country),
        ] {
            errors.check_max_length(field, value.as_deref(), LOCATION_PART_MAX);
        }
    }

    fn overlay(self, location: &mut Location) {
        let parts = [
            (self.venue_name, &mut location.venue_name),
            (self.address1, &mut location.address1),
            (self.address2, &mut location.address2),
            (self.address3, &mut location.address3),
            (self.city_town, &mut location.city_town),
            (self.state_province, &mut location.state_province),
            (self.postal_code, &mut location.postal_code),
            (self.country, &mut location.country),
        ];
        for (value, target) in parts {
            if value.is_some() {
                *target = value;
            }
        }
    }
}

impl From<LocationModel> for Location {
    fn from(model: LocationModel) -> Self {
        Self {
            venue_name: model.venue_name,
            address1: model.address1,
            address2: model.address2,
            address3: model.address3,
            city_town: model.city_town,
            state_province: model.state_province,
            postal_code: model.postal_code,
            country: model.country,
        }
    }
}

impl From<Location> for LocationModel {
    fn from(location: Location) -> Self {
        Self {
            venue_name: location.venue_name,
            address1: location.address1,
            address2: location.address2,
            address3: location.address3,
            city_town: location.city_town,
            state_province: location.state_province,
            postal_code: location.postal_code,
            country: location.country,
        }
    }
}

fn check_moniker(errors: &mut ValidationErrors, moniker: &str) {
    if moniker.is_empty() || moniker.chars().count() > MONIKER_MAX {
        errors.add("moniker", format!("The moniker field must be between 1 and {MONIKER_MAX} characters"));
    } else if !moniker.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        errors.add("moniker", "The moniker field may only contain letters, digits, '-' and '_'");
    } else if RESERVED_MONIKERS.contains(&moniker) {
        errors.add("moniker", format!("'{moniker}' is reserved and cannot be used as a moniker"));
    }
}

fn check_capacity(errors: &mut ValidationErrors, capacity: Option<i32>) {
    if capacity.is_some_and(|capacity| capacity < 0) {
        errors.add("capacity", "The capacity field must not be negative");
    }
}

/// Request body for creating a new camp.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampCreate {
    /// Unique, URL-safe identifier chosen by the client
    #[schema(example = "NDCOSLO")]
    pub moniker: Option<String>,
    #[schema(example = "NDC Oslo")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "event_date_format::deserialize")]
    #[schema(value_type = Option<String>, example = "2019-06-10")]
    pub event_date: Option<NaiveDateTime>,
    /// Length of the event in days (defaults to 1)
    pub length: Option<i32>,
    pub capacity: Option<i32>,
    pub location: Option<LocationModel>,
}

impl CampCreate {
    /// Validate the payload field by field and map it onto a create request.
    ///
    /// Moniker uniqueness needs storage and is checked by the handler.
    pub fn into_db_request(self) -> Result<CampCreateDBRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        match self.moniker.as_deref() {
            Some(moniker) => check_moniker(&mut errors, moniker),
            None => errors.add("moniker", "The moniker field is required"),
        }
        errors.require_text("title", self.title.as_deref(), TITLE_MAX);
        if self.event_date.is_none() {
            errors.add("eventDate", "The eventDate field is required");
        }
        errors.check_range("length", self.length, LENGTH_MIN, LENGTH_MAX);
        check_capacity(&mut errors, self.capacity);
        if let Some(location) = &self.location {
            location.validate(&mut errors);
        }

        let (Some(moniker), Some(title), Some(event_date)) = (self.moniker, self.title, self.event_date) else {
            return Err(errors);
        };

        errors.into_result(CampCreateDBRequest {
            moniker,
            title,
            event_date,
            length: self.length.unwrap_or(DEFAULT_LENGTH),
            capacity: self.capacity,
            location: self.location.map(Location::from).unwrap_or_default(),
        })
    }
}

/// Request body for updating a camp. All fields are optional; only provided fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampUpdate {
    /// Must match the addressed camp if given; monikers cannot be changed
    pub moniker: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "event_date_format::deserialize")]
    #[schema(value_type = Option<String>, example = "2019-06-10")]
    pub event_date: Option<NaiveDateTime>,
    pub length: Option<i32>,
    pub capacity: Option<i32>,
    pub location: Option<LocationModel>,
}

impl CampUpdate {
    pub fn validate(&self, current_moniker: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(moniker) = self.moniker.as_deref()
            && moniker != current_moniker
        {
            errors.add("moniker", "The moniker of an existing camp cannot be changed");
        }
        if let Some(title) = self.title.as_deref() {
            errors.check_text("title", title, TITLE_MAX);
        }
        errors.check_range("length", self.length, LENGTH_MIN, LENGTH_MAX);
        check_capacity(&mut errors, self.capacity);
        if let Some(location) = &self.location {
            location.validate(&mut errors);
        }

        errors.into_result(())
    }

    /// Apply the fields present in this update onto `camp`, leaving the rest untouched
    pub fn overlay(self, camp: &mut Camp) {
        if let Some(title) = self.title {
            camp.title = title;
        }
        if let Some(event_date) = self.event_date {
            camp.event_date = event_date;
        }
        if let Some(length) = self.length {
            camp.length = length;
        }
        if let Some(capacity) = self.capacity {
            camp.capacity = Some(capacity);
        }
        if let Some(location) = self.location {
            location.overlay(&mut camp.location);
        }
    }
}

/// A camp as returned by the API. Camps are identified by moniker; the storage key is not exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampResponse {
    pub moniker: String,
    pub title: String,
    #[schema(value_type = String, example = "2019-06-10T00:00:00")]
    pub event_date: NaiveDateTime,
    pub length: i32,
    pub capacity: Option<i32>,
    pub location: LocationModel,
    /// Only present when talks were requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub talks: Option<Vec<TalkResponse>>,
}

impl From<Camp> for CampResponse {
    fn from(camp: Camp) -> Self {
        Self {
            moniker: camp.moniker,
            title: camp.title,
            event_date: camp.event_date,
            length: camp.length,
            capacity: camp.capacity,
            location: LocationModel::from(camp.location),
            talks: camp.talks.map(|talks| talks.into_iter().map(TalkResponse::from).collect()),
        }
    }
}
