use crate::entity::library;
use crate::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

/// 个人库数据仓库
pub struct LibraryRepository;

impl LibraryRepository {
    /// 查询单条记录
    pub async fn find<C>(
        db: &C,
        username: &str,
        game_id: i64,
    ) -> Result<Option<library::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Library::find_by_id((username.to_owned(), game_id))
            .one(db)
            .await
    }

    /// 查询某个游戏的状态
    pub async fn status<C>(
        db: &C,
        username: &str,
        game_id: i64,
    ) -> Result<Option<LibraryStatus>, DbErr>
    where
        C: ConnectionTrait,
    {
        Ok(Self::find(db, username, game_id)
            .await?
            .map(|entry| entry.library_status()))
    }

    /// 写入状态；已存在时只覆盖 status，保留 added_date
    pub async fn upsert<C>(
        db: &C,
        username: &str,
        game_id: i64,
        status: LibraryStatus,
        added_date: i64,
    ) -> Result<(), DbErr>
    where
        C: ConnectionTrait,
    {
        let entry = library::ActiveModel {
            username: Set(username.to_owned()),
            game_id: Set(game_id),
            added_date: Set(added_date),
            status: Set(status.as_db().to_owned()),
        };

        Library::insert(entry)
            .on_conflict(
                OnConflict::columns([library::Column::Username, library::Column::GameId])
                    .update_column(library::Column::Status)
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    /// 删除 (username, game_id) 对应的一行
    pub async fn delete<C>(db: &C, username: &str, game_id: i64) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = Library::delete_by_id((username.to_owned(), game_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// 按状态列出，`All` 表示全部；最近加入的在前
    pub async fn find_by_status<C>(
        db: &C,
        username: &str,
        status: LibraryStatus,
    ) -> Result<Vec<library::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut query = Library::find().filter(library::Column::Username.eq(username));
        if status != LibraryStatus::All {
            query = query.filter(library::Column::Status.eq(status.as_db()));
        }
        query
            .order_by_desc(library::Column::AddedDate)
            .order_by_asc(library::Column::GameId)
            .all(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::db::open_in_memory;
    use crate::database::repository::users_repository::UsersRepository;

    async fn setup() -> DatabaseConnection {
        let db = open_in_memory().await;
        UsersRepository::ensure_exists(&db, "user").await.unwrap();
        UsersRepository::ensure_exists(&db, "admin").await.unwrap();
        db
    }

    #[tokio::test]
    async fn upsert_overwrites_status_and_keeps_added_date() {
        let db = setup().await;
        LibraryRepository::upsert(&db, "user", 1, LibraryStatus::Favorite, 100)
            .await
            .unwrap();
        LibraryRepository::upsert(&db, "user", 1, LibraryStatus::Wishlist, 200)
            .await
            .unwrap();

        let entry = LibraryRepository::find(&db, "user", 1).await.unwrap().unwrap();
        assert_eq!(entry.library_status(), LibraryStatus::Wishlist);
        assert_eq!(entry.added_date, 100);
        assert_eq!(Library::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_row() {
        let db = setup().await;
        LibraryRepository::upsert(&db, "user", 1, LibraryStatus::Favorite, 1).await.unwrap();
        LibraryRepository::upsert(&db, "user", 2, LibraryStatus::Favorite, 2).await.unwrap();
        LibraryRepository::upsert(&db, "admin", 1, LibraryStatus::Favorite, 3).await.unwrap();

        assert_eq!(LibraryRepository::delete(&db, "user", 1).await.unwrap(), 1);
        assert_eq!(LibraryRepository::delete(&db, "user", 1).await.unwrap(), 0);

        assert_eq!(Library::find().count(&db).await.unwrap(), 2);
        assert!(LibraryRepository::find(&db, "admin", 1).await.unwrap().is_some());
        assert!(LibraryRepository::find(&db, "user", 2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn find_by_status_filters_and_orders() {
        let db = setup().await;
        LibraryRepository::upsert(&db, "user", 1, LibraryStatus::Favorite, 10).await.unwrap();
        LibraryRepository::upsert(&db, "user", 2, LibraryStatus::Wishlist, 20).await.unwrap();
        LibraryRepository::upsert(&db, "user", 3, LibraryStatus::Favorite, 30).await.unwrap();
        LibraryRepository::upsert(&db, "admin", 4, LibraryStatus::Favorite, 40).await.unwrap();

        let favorites: Vec<i64> = LibraryRepository::find_by_status(&db, "user", LibraryStatus::Favorite)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.game_id)
            .collect();
        assert_eq!(favorites, vec![3, 1]);

        let all = LibraryRepository::find_by_status(&db, "user", LibraryStatus::All)
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_library() {
        let db = setup().await;
        LibraryRepository::upsert(&db, "user", 1, LibraryStatus::Owned, 1).await.unwrap();
        LibraryRepository::upsert(&db, "admin", 1, LibraryStatus::Owned, 1).await.unwrap();

        UsersRepository::delete(&db, "user").await.unwrap();

        assert!(LibraryRepository::find(&db, "user", 1).await.unwrap().is_none());
        assert!(LibraryRepository::find(&db, "admin", 1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unknown_stored_status_reads_as_none() {
        let db = setup().await;
        db.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "INSERT INTO library (username, game_id, added_date, status) VALUES ('user', 9, 1, 'LOST')",
        ))
        .await
        .unwrap();

        assert_eq!(
            LibraryRepository::status(&db, "user", 9).await.unwrap(),
            Some(LibraryStatus::None)
        );
    }
}
