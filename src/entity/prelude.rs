//! 预导入模块
//!
//! 提供常用类型的快捷导入。

pub use super::game_notes::Entity as GameNotes;
pub use super::library::Entity as Library;
pub use super::recent_games::Entity as RecentGames;
pub use super::search_history::Entity as SearchHistory;
pub use super::users::Entity as Users;

pub use super::status::{GameProgress, LibraryStatus};
