use crate::entity::prelude::*;
use crate::entity::search_history;
use sea_orm::*;

/// 搜索历史数据仓库
pub struct SearchHistoryRepository;

impl SearchHistoryRepository {
    /// 追加一条搜索记录
    pub async fn insert<C>(
        db: &C,
        username: &str,
        query: &str,
        timestamp: i64,
    ) -> Result<search_history::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let entry = search_history::ActiveModel {
            id: NotSet,
            username: Set(username.to_owned()),
            query: Set(query.to_owned()),
            timestamp: Set(timestamp),
        };
        entry.insert(db).await
    }

    /// 最近的搜索，新的在前
    pub async fn recent<C>(
        db: &C,
        username: &str,
        limit: u64,
    ) -> Result<Vec<search_history::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        SearchHistory::find()
            .filter(search_history::Column::Username.eq(username))
            .order_by_desc(search_history::Column::Timestamp)
            .order_by_desc(search_history::Column::Id)
            .limit(limit)
            .all(db)
            .await
    }

    /// 只保留最近的 `keep` 条，返回删除的行数
    pub async fn prune<C>(db: &C, username: &str, keep: u64) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let kept: Vec<i64> = SearchHistory::find()
            .select_only()
            .column(search_history::Column::Id)
            .filter(search_history::Column::Username.eq(username))
            .order_by_desc(search_history::Column::Timestamp)
            .order_by_desc(search_history::Column::Id)
            .limit(keep)
            .into_tuple()
            .all(db)
            .await?;

        let result = SearchHistory::delete_many()
            .filter(search_history::Column::Username.eq(username))
            .filter(search_history::Column::Id.is_not_in(kept))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// 删除某个查询词的全部记录
    pub async fn delete_query<C>(db: &C, username: &str, query: &str) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = SearchHistory::delete_many()
            .filter(search_history::Column::Username.eq(username))
            .filter(search_history::Column::Query.eq(query))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// 清空用户的搜索历史
    pub async fn clear<C>(db: &C, username: &str) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = SearchHistory::delete_many()
            .filter(search_history::Column::Username.eq(username))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
