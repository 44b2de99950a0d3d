pub mod attempt_repo;
pub mod country_repo;
pub mod models;
pub mod player_repo;
pub mod record_repo;
pub mod schema;
