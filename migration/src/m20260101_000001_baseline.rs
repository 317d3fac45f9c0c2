//! 基线迁移
//!
//! 创建本地库的五张表：users、library、search_history、recent_games、game_notes。
//! 游戏目录本身是只读的静态数据，不落库；这里只保存用户相关的状态。

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseBackend, Statement, TransactionTrait};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // 开启事务，保证建表的原子性
        let txn = conn.begin().await?;
        create_schema(&txn).await?;
        txn.commit().await?;

        println!("[MIGRATION] baseline schema created successfully");
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // library 依赖 users，先删子表
        for table in [
            "game_notes",
            "recent_games",
            "search_history",
            "library",
            "users",
        ] {
            manager
                .get_connection()
                .execute(Statement::from_string(
                    DatabaseBackend::Sqlite,
                    format!(r#"DROP TABLE IF EXISTS "{}""#, table),
                ))
                .await?;
        }
        Ok(())
    }
}

/// 创建全部表结构
async fn create_schema<C>(conn: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    // 1. 用户表（username 为主键）
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "users" (
            "username" TEXT NOT NULL PRIMARY KEY,
            "name" TEXT NOT NULL,
            "email" TEXT NOT NULL,
            "avatar_url" TEXT,
            "bio" TEXT
        )"#,
    ))
    .await?;

    // 2. 个人库表，每个 (用户, 游戏) 只有一行，状态覆盖写
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "library" (
            "username" TEXT NOT NULL,
            "game_id" INTEGER NOT NULL,
            "added_date" INTEGER NOT NULL,
            "status" TEXT NOT NULL,
            PRIMARY KEY("username", "game_id"),
            FOREIGN KEY("username") REFERENCES "users"("username") ON DELETE CASCADE
        )"#,
    ))
    .await?;

    // 3. 搜索历史（只追加，插入后立即裁剪）
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "search_history" (
            "id" INTEGER PRIMARY KEY AUTOINCREMENT,
            "username" TEXT NOT NULL,
            "query" TEXT NOT NULL,
            "timestamp" INTEGER NOT NULL
        )"#,
    ))
    .await?;

    // 4. 最近浏览的游戏
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "recent_games" (
            "id" INTEGER PRIMARY KEY AUTOINCREMENT,
            "username" TEXT NOT NULL,
            "game_id" INTEGER NOT NULL,
            "timestamp" INTEGER NOT NULL
        )"#,
    ))
    .await?;

    // 5. 游戏笔记与进度，每个 (游戏, 用户) 一行
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "game_notes" (
            "game_id" INTEGER NOT NULL,
            "username" TEXT NOT NULL,
            "note" TEXT NOT NULL DEFAULT '',
            "progress_status" TEXT NOT NULL DEFAULT 'PENDING',
            "last_updated" INTEGER NOT NULL,
            PRIMARY KEY("game_id", "username")
        )"#,
    ))
    .await?;

    Ok(())
}
