//! 游戏笔记与进度实体

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::status::GameProgress;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "game_notes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub game_id: i64,
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub username: String,
    #[sea_orm(column_type = "Text")]
    pub note: String,
    #[sea_orm(column_type = "Text")]
    pub progress_status: String,
    pub last_updated: i64,
}

impl Model {
    pub fn progress(&self) -> GameProgress {
        GameProgress::from_db(&self.progress_status)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
