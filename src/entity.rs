//! 数据实体模块
//!
//! 包含所有 SeaORM 实体定义和持久化用的文本枚举。

pub mod prelude;
pub mod status;

// === SeaORM 实体（对应数据库表）===
pub mod game_notes;
pub mod library;
pub mod recent_games;
pub mod search_history;
pub mod users;
