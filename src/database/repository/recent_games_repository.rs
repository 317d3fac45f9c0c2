use crate::entity::prelude::*;
use crate::entity::recent_games;
use sea_orm::*;

/// 最近浏览数据仓库
pub struct RecentGamesRepository;

impl RecentGamesRepository {
    /// 追加一条浏览记录
    pub async fn insert<C>(
        db: &C,
        username: &str,
        game_id: i64,
        timestamp: i64,
    ) -> Result<recent_games::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let entry = recent_games::ActiveModel {
            id: NotSet,
            username: Set(username.to_owned()),
            game_id: Set(game_id),
            timestamp: Set(timestamp),
        };
        entry.insert(db).await
    }

    /// 最近浏览，新的在前
    pub async fn recent<C>(
        db: &C,
        username: &str,
        limit: u64,
    ) -> Result<Vec<recent_games::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        RecentGames::find()
            .filter(recent_games::Column::Username.eq(username))
            .order_by_desc(recent_games::Column::Timestamp)
            .order_by_desc(recent_games::Column::Id)
            .limit(limit)
            .all(db)
            .await
    }

    /// 只保留最近的 `keep` 条，返回删除的行数
    pub async fn prune<C>(db: &C, username: &str, keep: u64) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let kept: Vec<i64> = RecentGames::find()
            .select_only()
            .column(recent_games::Column::Id)
            .filter(recent_games::Column::Username.eq(username))
            .order_by_desc(recent_games::Column::Timestamp)
            .order_by_desc(recent_games::Column::Id)
            .limit(keep)
            .into_tuple()
            .all(db)
            .await?;

        let result = RecentGames::delete_many()
            .filter(recent_games::Column::Username.eq(username))
            .filter(recent_games::Column::Id.is_not_in(kept))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::db::open_in_memory;

    #[tokio::test]
    async fn prune_drops_oldest_entries() {
        let db = open_in_memory().await;
        for game_id in 1..=12 {
            RecentGamesRepository::insert(&db, "user", game_id, game_id * 10)
                .await
                .unwrap();
            RecentGamesRepository::prune(&db, "user", 10).await.unwrap();
        }

        let ids: Vec<i64> = RecentGamesRepository::recent(&db, "user", 20)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.game_id)
            .collect();
        assert_eq!(ids, (3..=12).rev().collect::<Vec<_>>());
    }
}
