//! 游戏服务
//!
//! 对界面层暴露的唯一数据入口：目录读取走内存中的静态目录，
//! 个人库、搜索历史、最近浏览和笔记走 SQLite。
//! 写操作提交后广播表变更，`observe_*` 系列据此推送最新结果。

use async_trait::async_trait;
use chrono::{Local, Utc};
use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;

use crate::catalog::filter::{self, GameFilter};
use crate::catalog::{Catalog, Game};
use crate::config::AppConfig;
use crate::database::notifier::{ChangeNotifier, TableChange};
use crate::database::repository::{
    game_notes_repository::GameNotesRepository, library_repository::LibraryRepository,
    recent_games_repository::RecentGamesRepository,
    search_history_repository::SearchHistoryRepository, users_repository::UsersRepository,
};
use crate::entity::prelude::{GameProgress, LibraryStatus};
use crate::error::{AppError, Resource};
use crate::session::SessionManager;

/// 搜索历史保留条数
pub const SEARCH_HISTORY_LIMIT: u64 = 5;
/// 最近浏览保留条数
pub const RECENT_GAMES_LIMIT: u64 = 10;
/// 高分游戏的默认阈值
pub const TOP_RATED_THRESHOLD: f64 = 4.5;
/// 热门游戏的默认数量
pub const POPULAR_LIMIT: usize = 10;

#[async_trait]
pub trait GamesService: Send + Sync {
    // ==================== 目录 ====================
    async fn get_all_games(&self) -> Result<Vec<Game>, AppError>;
    async fn get_filtered_games(&self, filter: &GameFilter) -> Result<Vec<Game>, AppError>;
    async fn get_game_by_id(&self, game_id: i64) -> Result<Game, AppError>;
    async fn top_rated_games(&self, min_rating: f64) -> Result<Vec<Game>, AppError>;
    async fn games_by_max_price(&self, max_price: f64) -> Result<Vec<Game>, AppError>;
    async fn popular_games(&self, limit: usize) -> Result<Vec<Game>, AppError>;

    // ==================== 个人库 ====================
    /// 返回切换后的状态，None 表示已移出个人库
    async fn toggle_favorite(&self, game_id: i64) -> Result<Option<LibraryStatus>, AppError>;
    async fn toggle_wishlist(&self, game_id: i64) -> Result<Option<LibraryStatus>, AppError>;
    async fn set_owned(&self, game_id: i64) -> Result<(), AppError>;
    async fn remove_from_library(&self, game_id: i64) -> Result<(), AppError>;
    async fn library_status(&self, game_id: i64) -> Result<Option<LibraryStatus>, AppError>;
    async fn library_games(&self, status: LibraryStatus) -> Result<Vec<Game>, AppError>;
    async fn observe_library(
        &self,
        status: LibraryStatus,
    ) -> Result<watch::Receiver<Resource<Vec<Game>>>, AppError>;
    async fn observe_favorites(&self) -> Result<watch::Receiver<Resource<Vec<Game>>>, AppError>;
    async fn observe_is_favorite(&self, game_id: i64) -> Result<watch::Receiver<bool>, AppError>;
    async fn observe_is_in_wishlist(&self, game_id: i64)
        -> Result<watch::Receiver<bool>, AppError>;

    // ==================== 搜索历史 ====================
    async fn add_search_query(&self, query: &str) -> Result<(), AppError>;
    async fn recent_searches(&self) -> Result<Vec<String>, AppError>;
    async fn observe_recent_searches(&self) -> Result<watch::Receiver<Vec<String>>, AppError>;
    async fn delete_search_query(&self, query: &str) -> Result<(), AppError>;
    async fn clear_search_history(&self) -> Result<(), AppError>;

    // ==================== 最近浏览 ====================
    async fn add_to_recent_games(&self, game_id: i64) -> Result<(), AppError>;
    async fn recent_games(&self) -> Result<Vec<Game>, AppError>;
    async fn observe_recent_games(&self) -> Result<watch::Receiver<Vec<Game>>, AppError>;

    // ==================== 笔记与进度 ====================
    async fn get_note(&self, game_id: i64) -> Result<Option<String>, AppError>;
    async fn get_progress(&self, game_id: i64) -> Result<GameProgress, AppError>;
    async fn observe_note(&self, game_id: i64) -> Result<watch::Receiver<Option<String>>, AppError>;
    async fn observe_progress(&self, game_id: i64)
        -> Result<watch::Receiver<GameProgress>, AppError>;
    async fn save_note(
        &self,
        game_id: i64,
        note: &str,
        progress: GameProgress,
    ) -> Result<(), AppError>;
    async fn delete_note(&self, game_id: i64) -> Result<(), AppError>;
}

/// 本地实现：静态目录 + SQLite
#[derive(Clone)]
pub struct LocalGamesService {
    db: DatabaseConnection,
    catalog: Arc<Catalog>,
    session: Arc<dyn SessionManager>,
    notifier: ChangeNotifier,
    config: Arc<AppConfig>,
}

impl LocalGamesService {
    pub fn new(
        db: DatabaseConnection,
        catalog: Arc<Catalog>,
        session: Arc<dyn SessionManager>,
        config: AppConfig,
    ) -> Self {
        Self {
            db,
            catalog,
            session,
            notifier: ChangeNotifier::new(),
            config: Arc::new(config),
        }
    }

    /// 当前用户：会话中的用户名，未登录时为访客
    pub fn current_user(&self) -> String {
        self.session
            .username()
            .unwrap_or_else(|| self.config.guest_username.clone())
    }

    async fn simulate_latency(&self) {
        let latency = self.config.network_latency();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn now_millis() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// 把 id 列表映射为目录中的游戏，目录中不存在的 id 被跳过
    fn games_for_ids(&self, ids: impl IntoIterator<Item = i64>) -> Vec<Game> {
        ids.into_iter()
            .filter_map(|id| self.catalog.find_game(id).cloned())
            .collect()
    }

    /// 收藏/愿望单切换
    ///
    /// 先检查再写入的两步放在同一个事务中完成。
    async fn toggle_status(
        &self,
        game_id: i64,
        status: LibraryStatus,
    ) -> Result<Option<LibraryStatus>, AppError> {
        let username = self.current_user();

        let txn = self.db.begin().await.map_err(AppError::unknown)?;
        let outcome = async {
            UsersRepository::ensure_exists(&txn, &username).await?;
            let outcome = match LibraryRepository::find(&txn, &username, game_id).await? {
                Some(entry) if entry.library_status() == status => {
                    LibraryRepository::delete(&txn, &username, game_id).await?;
                    None
                }
                Some(entry) => {
                    LibraryRepository::upsert(&txn, &username, game_id, status, entry.added_date)
                        .await?;
                    Some(status)
                }
                None => {
                    LibraryRepository::upsert(
                        &txn,
                        &username,
                        game_id,
                        status,
                        Self::now_millis(),
                    )
                    .await?;
                    Some(status)
                }
            };
            Ok::<_, DbErr>(outcome)
        }
        .await
        .map_err(AppError::unknown)?;
        txn.commit().await.map_err(AppError::unknown)?;

        log::debug!(
            "切换 {:?}: user={} game={} -> {:?}",
            status,
            username,
            game_id,
            outcome
        );
        self.notifier.notify(TableChange::Library);
        Ok(outcome)
    }

    async fn has_status(&self, game_id: i64, status: LibraryStatus) -> Result<bool, AppError> {
        Ok(self.library_status(game_id).await? == Some(status))
    }

    /// 建立一个持续更新的查询
    ///
    /// 先同步执行一次得到初值，之后每当相关表变更或会话切换时重新查询。
    /// 所有接收端被丢弃后后台任务结束。
    async fn observe_with<T, F, Fut>(
        &self,
        tables: &'static [TableChange],
        query: F,
    ) -> Result<watch::Receiver<T>, AppError>
    where
        T: PartialEq + Send + Sync + 'static,
        F: Fn(LocalGamesService) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, AppError>> + Send + 'static,
    {
        // 先订阅再查询，避免漏掉两者之间的写入
        let mut changes = self.notifier.subscribe();
        let mut session = self.session.observe_username();

        let initial = query(self.clone()).await?;
        let (tx, rx) = watch::channel(initial);
        let this = self.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    change = changes.recv() => match change {
                        Ok(table) if !tables.contains(&table) => continue,
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            log::debug!("变更通知积压 {} 条，直接重新查询", skipped);
                        }
                        Err(RecvError::Closed) => break,
                    },
                    changed = session.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }

                match query(this.clone()).await {
                    Ok(value) => {
                        tx.send_if_modified(|current| {
                            if *current != value {
                                *current = value;
                                true
                            } else {
                                false
                            }
                        });
                    }
                    Err(e) => log::warn!("刷新观察结果失败: {}", e),
                }
            }
        });

        Ok(rx)
    }
}

#[async_trait]
impl GamesService for LocalGamesService {
    async fn get_all_games(&self) -> Result<Vec<Game>, AppError> {
        self.simulate_latency().await;
        Ok(self.catalog.games().to_vec())
    }

    async fn get_filtered_games(&self, game_filter: &GameFilter) -> Result<Vec<Game>, AppError> {
        self.simulate_latency().await;
        let today = Local::now().date_naive();
        Ok(game_filter.apply(self.catalog.games(), today))
    }

    async fn get_game_by_id(&self, game_id: i64) -> Result<Game, AppError> {
        self.simulate_latency().await;
        self.catalog
            .find_game(game_id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn top_rated_games(&self, min_rating: f64) -> Result<Vec<Game>, AppError> {
        self.simulate_latency().await;
        Ok(filter::top_rated(self.catalog.games(), min_rating))
    }

    async fn games_by_max_price(&self, max_price: f64) -> Result<Vec<Game>, AppError> {
        self.simulate_latency().await;
        Ok(filter::by_max_price(self.catalog.games(), max_price))
    }

    async fn popular_games(&self, limit: usize) -> Result<Vec<Game>, AppError> {
        self.simulate_latency().await;
        Ok(filter::popular(self.catalog.games(), limit))
    }

    async fn toggle_favorite(&self, game_id: i64) -> Result<Option<LibraryStatus>, AppError> {
        self.toggle_status(game_id, LibraryStatus::Favorite).await
    }

    async fn toggle_wishlist(&self, game_id: i64) -> Result<Option<LibraryStatus>, AppError> {
        self.toggle_status(game_id, LibraryStatus::Wishlist).await
    }

    async fn set_owned(&self, game_id: i64) -> Result<(), AppError> {
        let username = self.current_user();

        let txn = self.db.begin().await.map_err(AppError::unknown)?;
        async {
            UsersRepository::ensure_exists(&txn, &username).await?;
            LibraryRepository::upsert(
                &txn,
                &username,
                game_id,
                LibraryStatus::Owned,
                Self::now_millis(),
            )
            .await
        }
        .await
        .map_err(AppError::unknown)?;
        txn.commit().await.map_err(AppError::unknown)?;

        self.notifier.notify(TableChange::Library);
        Ok(())
    }

    async fn remove_from_library(&self, game_id: i64) -> Result<(), AppError> {
        let username = self.current_user();
        let removed = LibraryRepository::delete(&self.db, &username, game_id)
            .await
            .map_err(AppError::unknown)?;
        log::debug!("移出个人库: user={} game={} rows={}", username, game_id, removed);
        self.notifier.notify(TableChange::Library);
        Ok(())
    }

    async fn library_status(&self, game_id: i64) -> Result<Option<LibraryStatus>, AppError> {
        LibraryRepository::status(&self.db, &self.current_user(), game_id)
            .await
            .map_err(AppError::unknown)
    }

    async fn library_games(&self, status: LibraryStatus) -> Result<Vec<Game>, AppError> {
        let entries = LibraryRepository::find_by_status(&self.db, &self.current_user(), status)
            .await
            .map_err(AppError::unknown)?;
        Ok(self.games_for_ids(entries.into_iter().map(|e| e.game_id)))
    }

    async fn observe_library(
        &self,
        status: LibraryStatus,
    ) -> Result<watch::Receiver<Resource<Vec<Game>>>, AppError> {
        self.observe_with(&[TableChange::Library], move |svc| async move {
            Ok(Resource::from(svc.library_games(status).await))
        })
        .await
    }

    async fn observe_favorites(&self) -> Result<watch::Receiver<Resource<Vec<Game>>>, AppError> {
        self.observe_library(LibraryStatus::Favorite).await
    }

    async fn observe_is_favorite(&self, game_id: i64) -> Result<watch::Receiver<bool>, AppError> {
        self.observe_with(&[TableChange::Library], move |svc| async move {
            svc.has_status(game_id, LibraryStatus::Favorite).await
        })
        .await
    }

    async fn observe_is_in_wishlist(
        &self,
        game_id: i64,
    ) -> Result<watch::Receiver<bool>, AppError> {
        self.observe_with(&[TableChange::Library], move |svc| async move {
            svc.has_status(game_id, LibraryStatus::Wishlist).await
        })
        .await
    }

    async fn add_search_query(&self, query: &str) -> Result<(), AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }
        let username = self.current_user();

        let txn = self.db.begin().await.map_err(AppError::unknown)?;
        async {
            SearchHistoryRepository::insert(&txn, &username, query, Self::now_millis()).await?;
            SearchHistoryRepository::prune(&txn, &username, SEARCH_HISTORY_LIMIT).await
        }
        .await
        .map_err(AppError::unknown)?;
        txn.commit().await.map_err(AppError::unknown)?;

        self.notifier.notify(TableChange::SearchHistory);
        Ok(())
    }

    async fn recent_searches(&self) -> Result<Vec<String>, AppError> {
        let entries =
            SearchHistoryRepository::recent(&self.db, &self.current_user(), SEARCH_HISTORY_LIMIT)
                .await
                .map_err(AppError::unknown)?;
        Ok(entries.into_iter().map(|e| e.query).collect())
    }

    async fn observe_recent_searches(&self) -> Result<watch::Receiver<Vec<String>>, AppError> {
        self.observe_with(&[TableChange::SearchHistory], |svc| async move {
            svc.recent_searches().await
        })
        .await
    }

    async fn delete_search_query(&self, query: &str) -> Result<(), AppError> {
        SearchHistoryRepository::delete_query(&self.db, &self.current_user(), query)
            .await
            .map_err(AppError::unknown)?;
        self.notifier.notify(TableChange::SearchHistory);
        Ok(())
    }

    async fn clear_search_history(&self) -> Result<(), AppError> {
        let username = self.current_user();
        let removed = SearchHistoryRepository::clear(&self.db, &username)
            .await
            .map_err(AppError::unknown)?;
        log::info!("清空搜索历史: user={} rows={}", username, removed);
        self.notifier.notify(TableChange::SearchHistory);
        Ok(())
    }

    async fn add_to_recent_games(&self, game_id: i64) -> Result<(), AppError> {
        let username = self.current_user();

        let txn = self.db.begin().await.map_err(AppError::unknown)?;
        async {
            RecentGamesRepository::insert(&txn, &username, game_id, Self::now_millis()).await?;
            RecentGamesRepository::prune(&txn, &username, RECENT_GAMES_LIMIT).await
        }
        .await
        .map_err(AppError::unknown)?;
        txn.commit().await.map_err(AppError::unknown)?;

        self.notifier.notify(TableChange::RecentGames);
        Ok(())
    }

    async fn recent_games(&self) -> Result<Vec<Game>, AppError> {
        let entries =
            RecentGamesRepository::recent(&self.db, &self.current_user(), RECENT_GAMES_LIMIT)
                .await
                .map_err(AppError::unknown)?;
        Ok(self.games_for_ids(entries.into_iter().map(|e| e.game_id)))
    }

    async fn observe_recent_games(&self) -> Result<watch::Receiver<Vec<Game>>, AppError> {
        self.observe_with(&[TableChange::RecentGames], |svc| async move {
            svc.recent_games().await
        })
        .await
    }

    async fn get_note(&self, game_id: i64) -> Result<Option<String>, AppError> {
        let note = GameNotesRepository::find(&self.db, &self.current_user(), game_id)
            .await
            .map_err(AppError::unknown)?;
        Ok(note.map(|n| n.note))
    }

    async fn get_progress(&self, game_id: i64) -> Result<GameProgress, AppError> {
        let note = GameNotesRepository::find(&self.db, &self.current_user(), game_id)
            .await
            .map_err(AppError::unknown)?;
        Ok(note.map(|n| n.progress()).unwrap_or_default())
    }

    async fn observe_note(
        &self,
        game_id: i64,
    ) -> Result<watch::Receiver<Option<String>>, AppError> {
        self.observe_with(&[TableChange::GameNotes], move |svc| async move {
            svc.get_note(game_id).await
        })
        .await
    }

    async fn observe_progress(
        &self,
        game_id: i64,
    ) -> Result<watch::Receiver<GameProgress>, AppError> {
        self.observe_with(&[TableChange::GameNotes], move |svc| async move {
            svc.get_progress(game_id).await
        })
        .await
    }

    async fn save_note(
        &self,
        game_id: i64,
        note: &str,
        progress: GameProgress,
    ) -> Result<(), AppError> {
        GameNotesRepository::upsert(
            &self.db,
            &self.current_user(),
            game_id,
            note,
            progress,
            Self::now_millis(),
        )
        .await
        .map_err(AppError::unknown)?;
        self.notifier.notify(TableChange::GameNotes);
        Ok(())
    }

    async fn delete_note(&self, game_id: i64) -> Result<(), AppError> {
        GameNotesRepository::delete(&self.db, &self.current_user(), game_id)
            .await
            .map_err(AppError::unknown)?;
        self.notifier.notify(TableChange::GameNotes);
        Ok(())
    }
}
