//! OpenAPI documentation for the `/api/*` endpoints.
//!
//! Served as JSON at `/api/openapi.json` and rendered with Scalar at `/api/docs`.

use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Code Camp API",
        description = "Manage code camps, the talks given at them and the speakers giving them."
    ),
    servers(
        (url = "/api", description = "Code camp API server")
    ),
    paths(
        api::handlers::camps::list_camps,
        api::handlers::camps::get_camp,
        api::handlers::camps::search_camps_by_date,
        api::handlers::camps::create_camp,
        api::handlers::camps::update_camp,
        api::handlers::camps::delete_camp,
        api::handlers::talks::list_talks,
        api::handlers::talks::get_talk,
        api::handlers::talks::create_talk,
        api::handlers::talks::update_talk,
        api::handlers::talks::delete_talk,
    ),
    components(
        schemas(
            api::models::camps::CampCreate,
            api::models::camps::CampUpdate,
            api::models::camps::CampResponse,
            api::models::camps::LocationModel,
            api::models::talks::TalkCreate,
            api::models::talks::TalkUpdate,
            api::models::talks::TalkResponse,
            api::models::speakers::SpeakerRef,
            api::models::speakers::SpeakerResponse,
            api::models::validation::ValidationErrors,
        )
    ),
    tags(
        (name = "camps", description = "Code camps, addressed by moniker"),
        (name = "talks", description = "Talks within a camp"),
    )
)]
pub struct ApiDoc;
