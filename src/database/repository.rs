pub mod game_notes_repository;
pub mod library_repository;
pub mod recent_games_repository;
pub mod search_history_repository;
pub mod users_repository;
