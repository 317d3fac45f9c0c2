use crate::entity::game_notes;
use crate::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

/// 游戏笔记数据仓库
pub struct GameNotesRepository;

impl GameNotesRepository {
    /// 查询 (game_id, username) 对应的笔记
    pub async fn find<C>(
        db: &C,
        username: &str,
        game_id: i64,
    ) -> Result<Option<game_notes::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        GameNotes::find_by_id((game_id, username.to_owned()))
            .one(db)
            .await
    }

    /// 覆盖写入笔记和进度
    pub async fn upsert<C>(
        db: &C,
        username: &str,
        game_id: i64,
        note: &str,
        progress: GameProgress,
        last_updated: i64,
    ) -> Result<(), DbErr>
    where
        C: ConnectionTrait,
    {
        let entry = game_notes::ActiveModel {
            game_id: Set(game_id),
            username: Set(username.to_owned()),
            note: Set(note.to_owned()),
            progress_status: Set(progress.as_db().to_owned()),
            last_updated: Set(last_updated),
        };

        GameNotes::insert(entry)
            .on_conflict(
                OnConflict::columns([game_notes::Column::GameId, game_notes::Column::Username])
                    .update_columns([
                        game_notes::Column::Note,
                        game_notes::Column::ProgressStatus,
                        game_notes::Column::LastUpdated,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    /// 删除笔记
    pub async fn delete<C>(db: &C, username: &str, game_id: i64) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = GameNotes::delete_by_id((game_id, username.to_owned()))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
