use crate::error::LookupError;
use crate::models::{GenerationRequest, GenerationResponse};
use crate::AppState;
use rocket::serde::json::Json;
use rocket::{post, State};

#[post("/generations", data = "<request>")]
pub async fn generate_images(
    request: Json<GenerationRequest>,
    state: &State<AppState>,
) -> Result<Json<GenerationResponse>, LookupError> {
    let response = state.generator.generate(request.into_inner()).await?;
    Ok(Json(response))
}
