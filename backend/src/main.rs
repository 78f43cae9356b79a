#[macro_use]
extern crate rocket;

mod api;
mod config;
mod error;
mod models;
mod services;
mod utils;

use rocket::{Build, Rocket};

use crate::services::generation_service::ImageGenerator;
use crate::services::youtube_service::YoutubeDataApi;

pub struct AppState {
    pub youtube: YoutubeDataApi,
    pub generator: ImageGenerator,
}

#[get("/")]
fn index() -> &'static str {
    "Outlier Studio backend is running."
}

pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .mount("/", routes![index])
        .mount("/search", routes![api::search_videos])
        .mount("/video", routes![api::lookup_video])
        .mount("/images", routes![api::generate_images])
        .register("/", catchers![error::default_catcher])
}

#[launch]
fn rocket() -> _ {
    config::load_environment();
    config::init_logger();

    let app_config = config::AppConfig::from_env().expect("Configuration failed.");
    let cors = config::create_cors(&app_config.allowed_origin).expect("CORS setup failed.");
    let state = config::create_app_state(app_config).expect("App state setup failed.");

    build_rocket(state).attach(cors)
}
