use crate::AppState;
use crate::api::models::camps::{CampCreate, CampQuery, CampResponse, CampUpdate, parse_event_date};
use crate::api::models::validation::ValidationErrors;
use crate::db::handlers::{CampRepository, Camps};
use crate::errors::{Error, Result};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderName, StatusCode, header},
};

/// Location of a camp resource, as sent back on create
pub(crate) fn camp_location(moniker: &str) -> String {
    format!("/api/camps/{moniker}")
}

fn camp_not_found(moniker: &str) -> Error {
    Error::NotFound {
        resource: "Camp".to_string(),
        id: moniker.to_string(),
    }
}

#[utoipa::path(
    get,
    path = "/camps",
    tag = "camps",
    summary = "List camps",
    description = "All camps ordered by event date, optionally with their talks.",
    params(CampQuery),
    responses(
        (status = 200, description = "List of camps", body = Vec<CampResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_camps(State(state): State<AppState>, Query(query): Query<CampQuery>) -> Result<Json<Vec<CampResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Camps::new(&mut conn);

    let camps = repo.get_all_camps(query.include_talks).await?;
    Ok(Json(camps.into_iter().map(CampResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/camps/{moniker}",
    tag = "camps",
    summary = "Get camp",
    params(
        ("moniker" = String, Path, description = "Camp moniker (case-sensitive)"),
        CampQuery
    ),
    responses(
        (status = 200, description = "Camp details", body = CampResponse),
        (status = 404, description = "Camp not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_camp(
    State(state): State<AppState>,
    Path(moniker): Path<String>,
    Query(query): Query<CampQuery>,
) -> Result<Json<CampResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Camps::new(&mut conn);

    let camp = repo
        .get_camp(&moniker, query.include_talks)
        .await?
        .ok_or_else(|| camp_not_found(&moniker))?;
    Ok(Json(CampResponse::from(camp)))
}

#[utoipa::path(
    get,
    path = "/camps/searchByDate/{date}",
    tag = "camps",
    summary = "Search camps by date",
    description = "Camps whose event falls on the given calendar day. Any time of day in the path is ignored.",
    params(
        ("date" = String, Path, description = "Event date, e.g. 2019-06-10"),
        CampQuery
    ),
    responses(
        (status = 200, description = "Camps on that day (possibly none)", body = Vec<CampResponse>),
        (status = 400, description = "Unparseable date"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn search_camps_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Query(query): Query<CampQuery>,
) -> Result<Json<Vec<CampResponse>>> {
    let day = parse_event_date(&date)
        .map(|event_date| event_date.date())
        .ok_or_else(|| ValidationErrors::single("eventDate", format!("'{date}' is not a valid date")))?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Camps::new(&mut conn);

    let camps = repo.get_all_camps_by_event_date(day, query.include_talks).await?;
    Ok(Json(camps.into_iter().map(CampResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/camps",
    tag = "camps",
    summary = "Create camp",
    request_body = CampCreate,
    responses(
        (status = 201, description = "Camp created successfully", body = CampResponse,
            headers(("Location" = String, description = "URL of the new camp"))),
        (status = 400, description = "Invalid request, including an already used moniker", body = ValidationErrors),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_camp(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CampCreate>, JsonRejection>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<CampResponse>)> {
    let Json(create) = payload?;
    let request = create.into_db_request()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Camps::new(&mut conn);

    if repo.get_camp(&request.moniker, false).await?.is_some() {
        return Err(ValidationErrors::single("moniker", "Moniker in use").into());
    }

    let moniker = request.moniker.clone();
    repo.add_camp(request);
    if !repo.save_changes().await? {
        return Err(Error::Internal {
            operation: format!("save new camp {moniker}"),
        });
    }

    let camp = repo.get_camp(&moniker, false).await?.ok_or_else(|| Error::Internal {
        operation: format!("reload new camp {moniker}"),
    })?;
    tracing::info!(moniker = %camp.moniker, camp_id = camp.id, "Created camp");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, camp_location(&camp.moniker))],
        Json(CampResponse::from(camp)),
    ))
}

#[utoipa::path(
    put,
    path = "/camps/{moniker}",
    tag = "camps",
    summary = "Update camp",
    description = "Applies the fields present in the body onto the camp. Absent fields are left unchanged.",
    request_body = CampUpdate,
    params(("moniker" = String, Path, description = "Camp moniker")),
    responses(
        (status = 200, description = "Camp updated successfully", body = CampResponse),
        (status = 400, description = "Invalid request", body = ValidationErrors),
        (status = 404, description = "Camp not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_camp(
    State(state): State<AppState>,
    Path(moniker): Path<String>,
    payload: std::result::Result<Json<CampUpdate>, JsonRejection>,
) -> Result<Json<CampResponse>> {
    let Json(update) = payload?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Camps::new(&mut conn);

    let mut camp = repo.get_camp(&moniker, false).await?.ok_or_else(|| camp_not_found(&moniker))?;

    update.validate(&camp.moniker)?;
    update.overlay(&mut camp);

    repo.update_camp(&camp);
    if !repo.save_changes().await? {
        return Err(Error::Internal {
            operation: format!("save camp {moniker}"),
        });
    }

    Ok(Json(CampResponse::from(camp)))
}

#[utoipa::path(
    delete,
    path = "/camps/{moniker}",
    tag = "camps",
    summary = "Delete camp",
    description = "Deletes the camp together with all of its talks.",
    params(("moniker" = String, Path, description = "Camp moniker")),
    responses(
        (status = 200, description = "Camp deleted successfully"),
        (status = 404, description = "Camp not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_camp(State(state): State<AppState>, Path(moniker): Path<String>) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Camps::new(&mut conn);

    let camp = repo.get_camp(&moniker, false).await?.ok_or_else(|| camp_not_found(&moniker))?;

    repo.delete_camp(&camp);
    if !repo.save_changes().await? {
        return Err(Error::Internal {
            operation: format!("delete camp {moniker}"),
        });
    }

    tracing::info!(moniker = %camp.moniker, camp_id = camp.id, "Deleted camp");
    Ok(StatusCode::OK)
}
