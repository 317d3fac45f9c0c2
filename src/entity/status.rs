//! 持久化的文本枚举
//!
//! 数据库中以大写文本保存。读取到未知值时回退：状态为 `None`，进度为 `Pending`。

use serde::{Deserialize, Serialize};

/// 个人库状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LibraryStatus {
    /// 仅用于筛选，表示不限状态
    All,
    Favorite,
    Wishlist,
    Owned,
    #[default]
    None,
}

impl LibraryStatus {
    pub fn as_db(self) -> &'static str {
        match self {
            LibraryStatus::All => "ALL",
            LibraryStatus::Favorite => "FAVORITE",
            LibraryStatus::Wishlist => "WISHLIST",
            LibraryStatus::Owned => "OWNED",
            LibraryStatus::None => "NONE",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "ALL" => LibraryStatus::All,
            "FAVORITE" => LibraryStatus::Favorite,
            "WISHLIST" => LibraryStatus::Wishlist,
            "OWNED" => LibraryStatus::Owned,
            "NONE" => LibraryStatus::None,
            other => {
                log::warn!("未知的库状态 {:?}，按 NONE 处理", other);
                LibraryStatus::None
            }
        }
    }
}

/// 游玩进度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameProgress {
    #[default]
    Pending,
    Playing,
    Completed,
    Abandoned,
}

impl GameProgress {
    pub fn as_db(self) -> &'static str {
        match self {
            GameProgress::Pending => "PENDING",
            GameProgress::Playing => "PLAYING",
            GameProgress::Completed => "COMPLETED",
            GameProgress::Abandoned => "ABANDONED",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "PENDING" => GameProgress::Pending,
            "PLAYING" => GameProgress::Playing,
            "COMPLETED" => GameProgress::Completed,
            "ABANDONED" => GameProgress::Abandoned,
            other => {
                log::warn!("未知的游玩进度 {:?}，按 PENDING 处理", other);
                GameProgress::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_round_trips() {
        for status in [
            LibraryStatus::All,
            LibraryStatus::Favorite,
            LibraryStatus::Wishlist,
            LibraryStatus::Owned,
            LibraryStatus::None,
        ] {
            assert_eq!(LibraryStatus::from_db(status.as_db()), status);
        }
    }

    #[test]
    fn unknown_text_falls_back() {
        assert_eq!(LibraryStatus::from_db("favorite"), LibraryStatus::None);
        assert_eq!(LibraryStatus::from_db(""), LibraryStatus::None);
        assert_eq!(GameProgress::from_db("DONE"), GameProgress::Pending);
        assert_eq!(GameProgress::from_db("PLAYING"), GameProgress::Playing);
    }
}
