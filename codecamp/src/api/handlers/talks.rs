use crate::AppState;
use crate::api::models::talks::{TalkCreate, TalkQuery, TalkResponse, TalkUpdate};
use crate::api::models::validation::ValidationErrors;
use crate::db::handlers::{CampRepository, Camps};
use crate::db::models::talks::Talk;
use crate::errors::{Error, Result};
use crate::types::{SpeakerId, TalkId};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderName, StatusCode, header},
};

use super::camps::camp_location;

fn talk_not_found(moniker: &str, talk_id: TalkId) -> Error {
    Error::NotFound {
        resource: "Talk".to_string(),
        id: format!("{talk_id} in camp {moniker}"),
    }
}

/// Point `talk` at the requested speaker.
///
/// Nothing changes when no speaker was requested, when it is already the current one, or when no
/// speaker with that id exists.
async fn reattach_speaker<R>(repo: &mut R, talk: &mut Talk, requested: Option<SpeakerId>) -> Result<()>
where
    R: CampRepository + ?Sized,
{
    let Some(speaker_id) = requested else {
        return Ok(());
    };
    if talk.speaker_id == Some(speaker_id) {
        return Ok(());
    }

    match repo.get_speaker(speaker_id).await? {
        Some(speaker) => {
            talk.speaker_id = Some(speaker.id);
            talk.speaker = Some(speaker);
        }
        None => tracing::debug!(speaker_id, talk_id = talk.id, "Requested speaker does not exist, keeping current"),
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/camps/{moniker}/talks",
    tag = "talks",
    summary = "List talks",
    description = "Talks of a camp ordered by id. An unknown camp has no talks.",
    params(
        ("moniker" = String, Path, description = "Camp moniker"),
        TalkQuery
    ),
    responses(
        (status = 200, description = "List of talks", body = Vec<TalkResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_talks(
    State(state): State<AppState>,
    Path(moniker): Path<String>,
    Query(query): Query<TalkQuery>,
) -> Result<Json<Vec<TalkResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Camps::new(&mut conn);

    let talks = repo.get_talks_by_moniker(&moniker, query.include_speakers).await?;
    Ok(Json(talks.into_iter().map(TalkResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/camps/{moniker}/talks/{talk_id}",
    tag = "talks",
    summary = "Get talk",
    params(
        ("moniker" = String, Path, description = "Camp moniker"),
        ("talk_id" = i64, Path, description = "Talk ID"),
        TalkQuery
    ),
    responses(
        (status = 200, description = "Talk details", body = TalkResponse),
        (status = 404, description = "Talk not found in this camp"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_talk(
    State(state): State<AppState>,
    Path((moniker, talk_id)): Path<(String, TalkId)>,
    Query(query): Query<TalkQuery>,
) -> Result<Json<TalkResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Camps::new(&mut conn);

    let talk = repo
        .get_talk_by_moniker(&moniker, talk_id, query.include_speakers)
        .await?
        .ok_or_else(|| talk_not_found(&moniker, talk_id))?;
    Ok(Json(TalkResponse::from(talk)))
}

#[utoipa::path(
    post,
    path = "/camps/{moniker}/talks",
    tag = "talks",
    summary = "Create talk",
    description = "Adds a talk to the camp. A speaker reference to a speaker that does not exist is ignored.",
    request_body = TalkCreate,
    params(("moniker" = String, Path, description = "Camp moniker")),
    responses(
        (status = 201, description = "Talk created successfully", body = TalkResponse,
            headers(("Location" = String, description = "URL of the new talk"))),
        (status = 400, description = "Invalid request", body = ValidationErrors),
        (status = 404, description = "Camp not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_talk(
    State(state): State<AppState>,
    Path(moniker): Path<String>,
    payload: std::result::Result<Json<TalkCreate>, JsonRejection>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<TalkResponse>)> {
    let Json(create) = payload?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Camps::new(&mut conn);

    let camp = repo.get_camp(&moniker, false).await?.ok_or_else(|| Error::NotFound {
        resource: "Camp".to_string(),
        id: moniker.clone(),
    })?;

    let requested_speaker = create.speaker.map(|speaker| speaker.speaker_id);
    let mut request = create.into_db_request(&camp)?;
    if let Some(speaker_id) = requested_speaker
        && let Some(speaker) = repo.get_speaker(speaker_id).await?
    {
        request.speaker_id = Some(speaker.id);
    }

    let staged = repo.add_talk(request);
    if !repo.save_changes().await? {
        return Err(Error::Internal {
            operation: format!("save new talk for camp {moniker}"),
        });
    }

    let talk_id = repo.inserted_key(staged).ok_or_else(|| Error::Internal {
        operation: format!("resolve id of new talk for camp {moniker}"),
    })?;
    let talk = repo
        .get_talk_by_moniker(&camp.moniker, talk_id, true)
        .await?
        .ok_or_else(|| Error::Internal {
            operation: format!("reload talk {talk_id}"),
        })?;
    tracing::info!(moniker = %camp.moniker, talk_id, "Created talk");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("{}/talks/{talk_id}", camp_location(&camp.moniker)))],
        Json(TalkResponse::from(talk)),
    ))
}

#[utoipa::path(
    put,
    path = "/camps/{moniker}/talks/{talk_id}",
    tag = "talks",
    summary = "Update talk",
    description = "Applies the fields present in the body onto the talk. The speaker only changes when the \
                   referenced speaker differs from the current one and exists.",
    request_body = TalkUpdate,
    params(
        ("moniker" = String, Path, description = "Camp moniker"),
        ("talk_id" = i64, Path, description = "Talk ID"),
    ),
    responses(
        (status = 200, description = "Talk updated successfully", body = TalkResponse),
        (status = 400, description = "Invalid request", body = ValidationErrors),
        (status = 404, description = "Talk not found in this camp"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_talk(
    State(state): State<AppState>,
    Path((moniker, talk_id)): Path<(String, TalkId)>,
    payload: std::result::Result<Json<TalkUpdate>, JsonRejection>,
) -> Result<Json<TalkResponse>> {
    let Json(update) = payload?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Camps::new(&mut conn);

    let mut talk = repo
        .get_talk_by_moniker(&moniker, talk_id, true)
        .await?
        .ok_or_else(|| talk_not_found(&moniker, talk_id))?;

    update.validate()?;
    update.overlay(&mut talk);
    reattach_speaker(&mut repo, &mut talk, update.requested_speaker_id()).await?;

    repo.update_talk(&talk);
    if !repo.save_changes().await? {
        return Err(Error::Internal {
            operation: format!("save talk {talk_id}"),
        });
    }

    Ok(Json(TalkResponse::from(talk)))
}

#[utoipa::path(
    delete,
    path = "/camps/{moniker}/talks/{talk_id}",
    tag = "talks",
    summary = "Delete talk",
    params(
        ("moniker" = String, Path, description = "Camp moniker"),
        ("talk_id" = i64, Path, description = "Talk ID"),
    ),
    responses(
        (status = 200, description = "Talk deleted successfully"),
        (status = 404, description = "Talk not found in this camp"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_talk(
    State(state): State<AppState>,
    Path((moniker, talk_id)): Path<(String, TalkId)>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Camps::new(&mut conn);

    let talk = repo
        .get_talk_by_moniker(&moniker, talk_id, false)
        .await?
        .ok_or_else(|| talk_not_found(&moniker, talk_id))?;

    repo.delete_talk(&talk);
    if !repo.save_changes().await? {
        return Err(Error::Internal {
            operation: format!("delete talk {talk_id}"),
        });
    }

    Ok(StatusCode::OK)
}
