//! 首页（目录浏览）状态
//!
//! 搜索词和筛选条件变化时重新加载；只有最新一次加载的结果会写入状态。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use super::scope::{forward, ScreenScope};
use crate::catalog::{DateInterval, Game, GameCategory, GameFilter, PlatformFamily};
use crate::database::service::GamesService;
use crate::error::AppError;
use crate::session::SessionManager;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomeState {
    pub games: Vec<Game>,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub username: Option<String>,

    // === 搜索与筛选 ===
    pub is_search_mode: bool,
    pub is_filter_visible: bool,
    pub search_query: String,
    pub selected_category: GameCategory,
    pub selected_platform: PlatformFamily,
    pub selected_interval: DateInterval,
    pub recent_searches: Vec<String>,
}

impl HomeState {
    pub fn filter(&self) -> GameFilter {
        GameFilter {
            query: self.search_query.clone(),
            category: self.selected_category,
            platform: self.selected_platform,
            interval: self.selected_interval,
            ..GameFilter::default()
        }
    }
}

pub struct HomeScreen {
    state: Arc<watch::Sender<HomeState>>,
    service: Arc<dyn GamesService>,
    load_generation: AtomicU64,
    scope: ScreenScope,
}

impl HomeScreen {
    pub async fn open(
        service: Arc<dyn GamesService>,
        session: Arc<dyn SessionManager>,
    ) -> Result<Self, AppError> {
        let recent = service.observe_recent_searches().await?;
        let initial = HomeState {
            username: session.username(),
            recent_searches: recent.borrow().clone(),
            ..HomeState::default()
        };

        let screen = Self {
            state: Arc::new(watch::Sender::new(initial)),
            service,
            load_generation: AtomicU64::new(0),
            scope: ScreenScope::new(),
        };

        screen.scope.spawn(forward(
            session.observe_username(),
            screen.state.clone(),
            |s, username| s.username = username,
        ));
        screen.scope.spawn(forward(recent, screen.state.clone(), |s, searches| {
            s.recent_searches = searches
        }));

        screen.load_games().await;
        Ok(screen)
    }

    pub fn state(&self) -> watch::Receiver<HomeState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> HomeState {
        self.state.borrow().clone()
    }

    pub async fn load_games(&self) {
        let generation = self.load_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut game_filter = GameFilter::default();
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error_message = None;
            game_filter = s.filter();
        });

        let result = self.service.get_filtered_games(&game_filter).await;

        if self.load_generation.load(Ordering::SeqCst) != generation {
            log::debug!("丢弃过期的加载结果 #{}", generation);
            return;
        }
        self.state.send_modify(|s| {
            s.is_loading = false;
            match result {
                Ok(games) => {
                    s.games = games;
                    s.error_message = None;
                }
                Err(e) => s.error_message = Some(e.user_message()),
            }
        });
    }

    pub async fn on_search_query_change(&self, query: &str) {
        self.state.send_modify(|s| s.search_query = query.to_owned());
        if !query.trim().is_empty() {
            if let Err(e) = self.service.add_search_query(query).await {
                log::warn!("记录搜索历史失败: {}", e);
            }
        }
        self.load_games().await;
    }

    /// 打开搜索时收起筛选面板；关闭搜索时清空搜索词并重新加载
    pub async fn toggle_search_mode(&self) {
        let mut closed = false;
        self.state.send_modify(|s| {
            s.is_search_mode = !s.is_search_mode;
            if s.is_search_mode {
                s.is_filter_visible = false;
            } else {
                s.search_query.clear();
                closed = true;
            }
        });
        if closed {
            self.load_games().await;
        }
    }

    pub fn toggle_filter_visibility(&self) {
        self.state
            .send_modify(|s| s.is_filter_visible = !s.is_filter_visible);
    }

    pub async fn on_category_selected(&self, category: GameCategory) {
        self.state.send_modify(|s| s.selected_category = category);
        self.load_games().await;
    }

    pub async fn on_platform_selected(&self, platform: PlatformFamily) {
        self.state.send_modify(|s| s.selected_platform = platform);
        self.load_games().await;
    }

    pub async fn on_interval_selected(&self, interval: DateInterval) {
        self.state.send_modify(|s| s.selected_interval = interval);
        self.load_games().await;
    }

    pub async fn refresh_games(&self) {
        self.load_games().await;
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|s| s.error_message = None);
    }

    pub async fn clear_all_filters(&self) {
        self.state.send_modify(|s| {
            s.search_query.clear();
            s.selected_category = GameCategory::All;
            s.selected_platform = PlatformFamily::All;
            s.selected_interval = DateInterval::AllTime;
        });
        self.load_games().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::AppConfig;
    use crate::database::db::open_in_memory;
    use crate::database::service::LocalGamesService;
    use crate::session::MemorySessionManager;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn screen() -> (HomeScreen, Arc<MemorySessionManager>) {
        let session = Arc::new(MemorySessionManager::logged_in_as("user"));
        let service = Arc::new(LocalGamesService::new(
            open_in_memory().await,
            Arc::new(Catalog::builtin().unwrap()),
            session.clone(),
            AppConfig::without_latency(),
        ));
        let screen = HomeScreen::open(service, session.clone()).await.unwrap();
        (screen, session)
    }

    #[tokio::test]
    async fn opens_with_full_catalog() {
        let (screen, _) = screen().await;
        let state = screen.snapshot();
        assert_eq!(state.games.len(), 10);
        assert!(!state.is_loading);
        assert_eq!(state.error_message, None);
        assert_eq!(state.username.as_deref(), Some("user"));
    }

    #[tokio::test]
    async fn filters_reload_games() {
        let (screen, _) = screen().await;
        screen.on_category_selected(GameCategory::Rpg).await;
        assert_eq!(screen.snapshot().games.len(), 2);

        screen.on_platform_selected(PlatformFamily::Nintendo).await;
        assert!(screen.snapshot().games.is_empty());

        screen.clear_all_filters().await;
        let state = screen.snapshot();
        assert_eq!(state.games.len(), 10);
        assert_eq!(state.selected_category, GameCategory::All);
    }

    #[tokio::test]
    async fn query_is_recorded_in_history() {
        let (screen, _) = screen().await;
        let mut state = screen.state();

        screen.on_search_query_change("hades").await;
        assert_eq!(screen.snapshot().games.len(), 1);

        timeout(
            Duration::from_secs(5),
            state.wait_for(|s| s.recent_searches == vec!["hades".to_string()]),
        )
        .await
        .unwrap()
        .unwrap();
    }

    #[tokio::test]
    async fn search_mode_toggles() {
        let (screen, _) = screen().await;
        screen.toggle_filter_visibility();
        assert!(screen.snapshot().is_filter_visible);

        screen.toggle_search_mode().await;
        let state = screen.snapshot();
        assert!(state.is_search_mode);
        assert!(!state.is_filter_visible);

        screen.on_search_query_change("doom").await;
        assert_eq!(screen.snapshot().games.len(), 1);

        screen.toggle_search_mode().await;
        let state = screen.snapshot();
        assert!(!state.is_search_mode);
        assert_eq!(state.search_query, "");
        assert_eq!(state.games.len(), 10);
    }

    #[tokio::test]
    async fn username_follows_session() {
        let (screen, session) = screen().await;
        let mut state = screen.state();
        session.clear_session().await.unwrap();

        timeout(Duration::from_secs(5), state.wait_for(|s| s.username.is_none()))
            .await
            .unwrap()
            .unwrap();
    }
}
