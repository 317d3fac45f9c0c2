//! 游戏目录
//!
//! 目录是随程序发布的只读数据，启动时解析一次，之后只做查找和筛选。

pub mod filter;
pub mod model;

use serde::Deserialize;

use crate::error::AppError;

pub use filter::{GameFilter, SortOption, SortOrder};
pub use model::*;

const BUILTIN_CATALOG: &str = include_str!("../resources/catalog.json");

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    genres: Vec<Genre>,
    #[serde(default)]
    platforms: Vec<Platform>,
    #[serde(default)]
    publishers: Vec<Publisher>,
    #[serde(default)]
    stores: Vec<Store>,
    #[serde(default)]
    tags: Vec<Tag>,
    #[serde(default)]
    games: Vec<Game>,
}

impl Catalog {
    /// 内置目录
    pub fn builtin() -> Result<Self, AppError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let catalog: Catalog = serde_json::from_str(json)
            .map_err(|e| AppError::Unknown(format!("目录数据解析失败: {}", e)))?;
        log::debug!("目录已加载: {} 个游戏", catalog.games.len());
        Ok(catalog)
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn find_game(&self, id: i64) -> Option<&Game> {
        self.games.iter().find(|g| g.id == id)
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn publishers(&self) -> &[Publisher] {
        &self.publishers
    }

    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }
}
