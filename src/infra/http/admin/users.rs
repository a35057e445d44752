use axum::{Json, extract::State};
use gazette_api_types::{Paginated, UserLookupItem};
use serde::Deserialize;

use crate::application::pagination::parse_page;
use crate::infra::http::{ApiError, ApiQuery, pagination_error_to_api, user_error_to_api};

use super::AdminState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct UserLookupQuery {
    q: Option<String>,
    page: Option<String>,
}

/// Autocomplete source: `{id, username}` pairs, ten per page.
pub(super) async fn admin_user_lookup(
    State(state): State<AdminState>,
    ApiQuery(query): ApiQuery<UserLookupQuery>,
) -> Result<Json<Paginated<UserLookupItem>>, ApiError> {
    let page = parse_page(query.page.as_deref()).map_err(pagination_error_to_api)?;
    let users = state
        .users
        .lookup(query.q.as_deref(), page)
        .await
        .map_err(user_error_to_api)?;

    Ok(Json(users.into_envelope()))
}
