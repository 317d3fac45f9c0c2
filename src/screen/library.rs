//! 个人库页状态

use std::sync::Arc;
use tokio::sync::watch;

use super::scope::{forward, ScreenScope};
use crate::catalog::Game;
use crate::database::service::GamesService;
use crate::entity::prelude::LibraryStatus;
use crate::error::Resource;

const LIBRARY_OBSERVER: &str = "library";

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryState {
    pub library_games: Resource<Vec<Game>>,
    pub selected_filter: LibraryStatus,
}

impl Default for LibraryState {
    fn default() -> Self {
        Self {
            library_games: Resource::Loading,
            selected_filter: LibraryStatus::All,
        }
    }
}

pub struct LibraryScreen {
    state: Arc<watch::Sender<LibraryState>>,
    service: Arc<dyn GamesService>,
    scope: ScreenScope,
}

impl LibraryScreen {
    pub async fn open(service: Arc<dyn GamesService>) -> Self {
        let screen = Self {
            state: Arc::new(watch::Sender::new(LibraryState::default())),
            service,
            scope: ScreenScope::new(),
        };
        screen.load_library().await;
        screen
    }

    pub fn state(&self) -> watch::Receiver<LibraryState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> LibraryState {
        self.state.borrow().clone()
    }

    /// 按当前筛选重新订阅，旧的订阅被替换
    pub async fn load_library(&self) {
        let mut status = LibraryStatus::All;
        self.state.send_modify(|s| {
            s.library_games = Resource::Loading;
            status = s.selected_filter;
        });
        // 旧筛选的观察者不能在订阅期间覆盖 Loading
        self.scope.cancel(LIBRARY_OBSERVER);

        match self.service.observe_library(status).await {
            Ok(games) => {
                let current = games.borrow().clone();
                self.state.send_modify(|s| s.library_games = current);
                self.scope.spawn_named(
                    LIBRARY_OBSERVER,
                    forward(games, self.state.clone(), |s, v| s.library_games = v),
                );
            }
            Err(e) => self.state.send_modify(|s| s.library_games = Resource::Error(e)),
        }
    }

    /// 选择相同的筛选条件不做任何事
    pub async fn on_filter_selected(&self, status: LibraryStatus) {
        if self.state.borrow().selected_filter == status {
            return;
        }
        self.state.send_modify(|s| s.selected_filter = status);
        self.load_library().await;
    }

    pub async fn remove_from_library(&self, game_id: i64) {
        if let Err(e) = self.service.remove_from_library(game_id).await {
            log::error!("移出个人库失败: game={} {}", game_id, e);
        }
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

    const HADES: i64 = 891238;
    const DOOM: i64 = 983381;

    async fn service() -> Arc<LocalGamesService> {
        Arc::new(LocalGamesService::new(
            open_in_memory().await,
            Arc::new(Catalog::builtin().unwrap()),
            Arc::new(MemorySessionManager::new()),
            AppConfig::without_latency(),
        ))
    }

    fn ids(state: &LibraryState) -> Vec<i64> {
        state
            .library_games
            .data()
            .map(|games| games.iter().map(|g| g.id).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn defaults_to_all_and_filters_by_status() {
        let service = service().await;
        service.toggle_favorite(HADES).await.unwrap();
        service.toggle_wishlist(DOOM).await.unwrap();

        let screen = LibraryScreen::open(service.clone()).await;
        let state = screen.snapshot();
        assert_eq!(state.selected_filter, LibraryStatus::All);
        assert_eq!(ids(&state).len(), 2);

        screen.on_filter_selected(LibraryStatus::Wishlist).await;
        assert_eq!(ids(&screen.snapshot()), vec![DOOM]);
    }

    #[tokio::test]
    async fn same_filter_is_a_no_op() {
        let screen = LibraryScreen::open(service().await).await;
        let state = screen.state();

        screen.on_filter_selected(LibraryStatus::All).await;
        assert!(!state.has_changed().unwrap());
    }

    #[tokio::test]
    async fn removal_updates_list() {
        let service = service().await;
        service.toggle_favorite(HADES).await.unwrap();
        service.toggle_favorite(DOOM).await.unwrap();

        let screen = LibraryScreen::open(service.clone()).await;
        let mut state = screen.state();
        screen.remove_from_library(HADES).await;

        timeout(Duration::from_secs(5), state.wait_for(|s| ids(s) == vec![DOOM]))
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn old_observer_stops_while_switching() {
        let service = service().await;
        service.toggle_favorite(HADES).await.unwrap();
        let screen = LibraryScreen::open(service.clone()).await;

        screen.state.send_modify(|s| s.selected_filter = LibraryStatus::Wishlist);
        screen.scope.cancel(LIBRARY_OBSERVER);
        screen.state.send_modify(|s| s.library_games = Resource::Loading);

        // All 筛选的观察者已停止，库变化不会写回旧列表
        service.toggle_favorite(DOOM).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(screen.snapshot().library_games, Resource::Loading);
        assert_eq!(screen.scope.active_tasks(), 0);

        screen.load_library().await;
        assert!(ids(&screen.snapshot()).is_empty());
        assert_eq!(screen.scope.active_tasks(), 1);
    }

    #[tokio::test]
    async fn switching_filter_replaces_observer() {
        let service = service().await;
        let screen = LibraryScreen::open(service.clone()).await;
        screen.on_filter_selected(LibraryStatus::Favorite).await;
        let mut state = screen.state();

        // 愿望单的变化不应出现在收藏筛选下
        service.toggle_wishlist(DOOM).await.unwrap();
        service.toggle_favorite(HADES).await.unwrap();
        timeout(Duration::from_secs(5), state.wait_for(|s| ids(s) == vec![HADES]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(screen.scope.active_tasks(), 1);
    }
}
