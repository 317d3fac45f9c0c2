//! 为按用户查询的表添加索引
//!
//! 1. library(username)
//! 2. search_history(username, timestamp)
//! 3. recent_games(username, timestamp)

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const IDX_LIBRARY_USER: &str = "idx_library_username";
const IDX_SEARCH_USER_TIME: &str = "idx_search_history_username_timestamp";
const IDX_RECENT_USER_TIME: &str = "idx_recent_games_username_timestamp";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name(IDX_LIBRARY_USER)
                    .table(Library::Table)
                    .col(Library::Username)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_SEARCH_USER_TIME)
                    .table(SearchHistory::Table)
                    .col(SearchHistory::Username)
                    .col(SearchHistory::Timestamp)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_RECENT_USER_TIME)
                    .table(RecentGames::Table)
                    .col(RecentGames::Username)
                    .col(RecentGames::Timestamp)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table) in [
            (IDX_RECENT_USER_TIME, "recent_games"),
            (IDX_SEARCH_USER_TIME, "search_history"),
            (IDX_LIBRARY_USER, "library"),
        ] {
            manager
                .drop_index(Index::drop().name(name).table(Alias::new(table)).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Library {
    Table,
    Username,
}

#[derive(DeriveIden)]
enum SearchHistory {
    Table,
    Username,
    Timestamp,
}

#[derive(DeriveIden)]
enum RecentGames {
    Table,
    Username,
    Timestamp,
}
