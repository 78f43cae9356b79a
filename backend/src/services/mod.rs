pub mod generation_service;
pub mod ranking_service;
pub mod youtube_service;
