use crate::entity::prelude::*;
use crate::entity::users;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

/// 用户数据仓库
pub struct UsersRepository;

impl UsersRepository {
    /// 根据用户名查询
    pub async fn find_by_username<C>(
        db: &C,
        username: &str,
    ) -> Result<Option<users::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Users::find_by_id(username.to_owned()).one(db).await
    }

    /// 插入或更新用户资料
    ///
    /// 使用 ON CONFLICT DO UPDATE 而不是 REPLACE，避免级联删除该用户的库记录。
    pub async fn upsert<C>(db: &C, user: users::Model) -> Result<(), DbErr>
    where
        C: ConnectionTrait,
    {
        let active: users::ActiveModel = user.into();
        Users::insert(active)
            .on_conflict(
                OnConflict::column(users::Column::Username)
                    .update_columns([
                        users::Column::Name,
                        users::Column::Email,
                        users::Column::AvatarUrl,
                        users::Column::Bio,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    /// 确保用户存在，不存在时按用户名生成默认资料
    pub async fn ensure_exists<C>(db: &C, username: &str) -> Result<(), DbErr>
    where
        C: ConnectionTrait,
    {
        let active: users::ActiveModel = default_profile(username).into();
        Users::insert(active)
            .on_conflict(
                OnConflict::column(users::Column::Username)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    /// 删除用户（库记录级联删除）
    pub async fn delete<C>(db: &C, username: &str) -> Result<DeleteResult, DbErr>
    where
        C: ConnectionTrait,
    {
        Users::delete_by_id(username.to_owned()).exec(db).await
    }
}

/// 默认资料：显示名为首字母大写的用户名
pub fn default_profile(username: &str) -> users::Model {
    users::Model {
        username: username.to_owned(),
        name: capitalize(username),
        email: format!("{}@example.com", username),
        avatar_url: None,
        bio: None,
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::db::open_in_memory;

    #[test]
    fn default_profile_capitalizes_name() {
        let user = default_profile("admin");
        assert_eq!(user.name, "Admin");
        assert_eq!(user.email, "admin@example.com");
        assert_eq!(default_profile("").name, "");
    }

    #[tokio::test]
    async fn ensure_exists_keeps_existing_profile() {
        let db = open_in_memory().await;
        let mut user = default_profile("user");
        user.bio = Some("likes puzzles".into());
        UsersRepository::upsert(&db, user.clone()).await.unwrap();

        UsersRepository::ensure_exists(&db, "user").await.unwrap();
        UsersRepository::ensure_exists(&db, "guest").await.unwrap();

        let stored = UsersRepository::find_by_username(&db, "user").await.unwrap();
        assert_eq!(stored, Some(user));
        let guest = UsersRepository::find_by_username(&db, "guest").await.unwrap().unwrap();
        assert_eq!(guest.name, "Guest");
    }

    #[tokio::test]
    async fn upsert_updates_in_place() {
        let db = open_in_memory().await;
        UsersRepository::upsert(&db, default_profile("admin")).await.unwrap();

        let mut changed = default_profile("admin");
        changed.name = "Administrator".into();
        UsersRepository::upsert(&db, changed).await.unwrap();

        let stored = UsersRepository::find_by_username(&db, "admin").await.unwrap().unwrap();
        assert_eq!(stored.name, "Administrator");
        assert_eq!(Users::find().count(&db).await.unwrap(), 1);
    }
}
