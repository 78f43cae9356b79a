use crate::error::LookupError;
use crate::models::{RankedVideo, SearchRankedResponse};
use crate::services::ranking_service;
use crate::services::ranking_service::{DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT};
use crate::AppState;
use rocket::serde::json::Json;
use rocket::{get, State};

#[get("/?<query>&<max_results>")]
pub async fn search_videos(
    query: Option<String>,
    max_results: Option<String>,
    state: &State<AppState>,
) -> Result<Json<SearchRankedResponse>, LookupError> {
    let query = query.unwrap_or_default();
    // Parsed by hand so that a malformed value is a 400, not an unroutable
    // request.
    let max_results = match max_results {
        Some(raw) => raw.parse::<u8>().map_err(|_| {
            LookupError::InvalidInput(format!(
                "max_results must be a number between 1 and {}",
                MAX_RESULTS_LIMIT
            ))
        })?,
        None => DEFAULT_MAX_RESULTS,
    };

    let results = ranking_service::search_ranked(&state.youtube, &query, max_results).await?;
    Ok(Json(SearchRankedResponse {
        query,
        total: results.len(),
        results,
    }))
}

#[get("/?<input>")]
pub async fn lookup_video(
    input: Option<String>,
    state: &State<AppState>,
) -> Result<Json<RankedVideo>, LookupError> {
    let input = input.unwrap_or_default();
    let ranked = ranking_service::lookup_video(&state.youtube, &input).await?;
    Ok(Json(ranked))
}
