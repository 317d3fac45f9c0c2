//! 个人库实体
//!
//! 每个 (username, game_id) 只有一行，status 以大写文本保存。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::status::LibraryStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "library")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub username: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub game_id: i64,
    /// 毫秒时间戳
    pub added_date: i64,
    #[sea_orm(column_type = "Text")]
    pub status: String,
}

impl Model {
    pub fn library_status(&self) -> LibraryStatus {
        LibraryStatus::from_db(&self.status)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Username",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
