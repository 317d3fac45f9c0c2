//! 详情页状态
//!
//! 打开时记录一次最近浏览，收藏、愿望单、笔记和进度都持续跟随数据库。

use std::sync::Arc;
use tokio::sync::watch;

use super::scope::{forward, ScreenScope};
use crate::catalog::Game;
use crate::database::service::GamesService;
use crate::entity::prelude::GameProgress;
use crate::error::{AppError, Resource};

#[derive(Debug, Clone, PartialEq)]
pub struct DetailState {
    pub game: Resource<Game>,
    pub is_favorite: bool,
    pub is_in_wishlist: bool,
    pub note: String,
    pub progress: GameProgress,
}

impl Default for DetailState {
    fn default() -> Self {
        Self {
            game: Resource::Loading,
            is_favorite: false,
            is_in_wishlist: false,
            note: String::new(),
            progress: GameProgress::Pending,
        }
    }
}

pub struct DetailScreen {
    game_id: i64,
    state: Arc<watch::Sender<DetailState>>,
    service: Arc<dyn GamesService>,
    scope: ScreenScope,
}

impl DetailScreen {
    pub async fn open(service: Arc<dyn GamesService>, game_id: i64) -> Result<Self, AppError> {
        let is_favorite = service.observe_is_favorite(game_id).await?;
        let is_in_wishlist = service.observe_is_in_wishlist(game_id).await?;
        let note = service.observe_note(game_id).await?;
        let progress = service.observe_progress(game_id).await?;

        let initial = DetailState {
            is_favorite: *is_favorite.borrow(),
            is_in_wishlist: *is_in_wishlist.borrow(),
            note: note.borrow().clone().unwrap_or_default(),
            progress: *progress.borrow(),
            ..DetailState::default()
        };

        let screen = Self {
            game_id,
            state: Arc::new(watch::Sender::new(initial)),
            service,
            scope: ScreenScope::new(),
        };

        let state = &screen.state;
        screen
            .scope
            .spawn(forward(is_favorite, state.clone(), |s, v| s.is_favorite = v));
        screen
            .scope
            .spawn(forward(is_in_wishlist, state.clone(), |s, v| s.is_in_wishlist = v));
        screen.scope.spawn(forward(note, state.clone(), |s, v| {
            s.note = v.unwrap_or_default()
        }));
        screen
            .scope
            .spawn(forward(progress, state.clone(), |s, v| s.progress = v));

        if let Err(e) = screen.service.add_to_recent_games(game_id).await {
            log::warn!("记录最近浏览失败: game={} {}", game_id, e);
        }

        let game = screen.service.get_game_by_id(game_id).await;
        screen.state.send_modify(|s| s.game = Resource::from(game));

        Ok(screen)
    }

    pub fn game_id(&self) -> i64 {
        self.game_id
    }

    pub fn state(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub async fn toggle_favorite(&self) {
        if let Err(e) = self.service.toggle_favorite(self.game_id).await {
            log::error!("切换收藏失败: game={} {}", self.game_id, e);
        }
    }

    pub async fn toggle_wishlist(&self) {
        if let Err(e) = self.service.toggle_wishlist(self.game_id).await {
            log::error!("切换愿望单失败: game={} {}", self.game_id, e);
        }
    }

    pub async fn save_note(&self, note: &str, progress: GameProgress) {
        match self.service.save_note(self.game_id, note, progress).await {
            Ok(()) => self.state.send_modify(|s| {
                s.note = note.to_owned();
                s.progress = progress;
            }),
            Err(e) => log::error!("保存笔记失败: game={} {}", self.game_id, e),
        }
    }
}
