pub mod auth;
pub mod catalog;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod screen;
pub mod session;
pub mod utils;

use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use std::sync::Arc;

use auth::{AuthRepository, LocalAuthRepository};
use catalog::Catalog;
use config::AppConfig;
use database::db;
use database::service::{GamesService, LocalGamesService};
use error::AppError;
use screen::{DetailScreen, HomeScreen, LibraryScreen, LoginScreen, RegisterScreen, SplashScreen};
use session::{FileSessionManager, SessionManager};
use utils::logs::init_logger;

/// 应用运行期间共享的依赖
pub struct AppContext {
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub db: DatabaseConnection,
    pub catalog: Arc<Catalog>,
    pub session: Arc<dyn SessionManager>,
    pub games: Arc<dyn GamesService>,
    pub auth: Arc<dyn AuthRepository>,
}

/// 读取配置、初始化日志并装配全部依赖
pub async fn run() -> Result<AppContext, AppError> {
    let base_dir = store_path::get_base_data_dir().map_err(AppError::Unknown)?;
    let config = AppConfig::load(&store_path::config_path_in(&base_dir));
    init_logger(&config.log_level);
    bootstrap(config).await
}

/// 按给定配置装配依赖：数据库（含迁移）、会话、目录和服务
pub async fn bootstrap(config: AppConfig) -> Result<AppContext, AppError> {
    let data_dir = config.resolve_data_dir()?;
    log::info!("数据目录: {}", data_dir.display());

    // 执行 SeaORM 数据库迁移
    let db_path = store_path::db_path_in(&data_dir);
    let conn = match db::open_database(&db_path).await {
        Ok(conn) => {
            log::info!("数据库连接建立成功");
            conn
        }
        Err(e) => {
            log::error!("数据库初始化失败: {}", e);
            return Err(e.into());
        }
    };

    let session: Arc<dyn SessionManager> = Arc::new(FileSessionManager::open(
        store_path::session_path_in(&data_dir),
    ));
    let catalog = Arc::new(Catalog::builtin()?);

    let games: Arc<dyn GamesService> = Arc::new(LocalGamesService::new(
        conn.clone(),
        catalog.clone(),
        session.clone(),
        config.clone(),
    ));
    let auth: Arc<dyn AuthRepository> =
        Arc::new(LocalAuthRepository::new(conn.clone(), config.auth_latency()));

    Ok(AppContext {
        config,
        data_dir,
        db: conn,
        catalog,
        session,
        games,
        auth,
    })
}

impl AppContext {
    pub fn splash_screen(&self) -> SplashScreen {
        SplashScreen::new(self.session.clone())
    }

    pub fn login_screen(&self) -> LoginScreen {
        LoginScreen::new(self.auth.clone(), self.session.clone())
    }

    pub fn register_screen(&self) -> RegisterScreen {
        RegisterScreen::new(self.auth.clone(), self.session.clone())
    }

    pub async fn home_screen(&self) -> Result<HomeScreen, AppError> {
        HomeScreen::open(self.games.clone(), self.session.clone()).await
    }

    pub async fn detail_screen(&self, game_id: i64) -> Result<DetailScreen, AppError> {
        DetailScreen::open(self.games.clone(), game_id).await
    }

    pub async fn library_screen(&self) -> LibraryScreen {
        LibraryScreen::open(self.games.clone()).await
    }

    /// 退出登录
    pub async fn logout(&self) -> Result<(), AppError> {
        self.session.clear_session().await
    }

    /// 关闭数据库连接
    pub async fn shutdown(self) -> Result<(), AppError> {
        db::close_connection(self.db).await?;
        log::info!("数据库连接已关闭");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::prelude::LibraryStatus;
    use crate::screen::{Destination, LoginPhase};

    fn config_in(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            data_dir: Some(dir.to_path_buf()),
            ..AppConfig::without_latency()
        }
    }

    #[tokio::test]
    async fn login_flow_persists_across_restarts() {
        let dir = tempfile::tempdir().unwrap();

        let ctx = bootstrap(config_in(dir.path())).await.unwrap();
        assert_eq!(ctx.splash_screen().start_destination(), Destination::Login);

        let login = ctx.login_screen();
        login.on_username_change("user");
        login.on_password_change("password");
        login.login().await;
        assert_eq!(login.snapshot().phase, LoginPhase::Success);

        ctx.games.toggle_favorite(891238).await.unwrap();
        ctx.shutdown().await.unwrap();

        let ctx = bootstrap(config_in(dir.path())).await.unwrap();
        assert_eq!(ctx.splash_screen().start_destination(), Destination::Home);
        assert_eq!(
            ctx.games.library_status(891238).await.unwrap(),
            Some(LibraryStatus::Favorite)
        );

        ctx.logout().await.unwrap();
        assert_eq!(ctx.splash_screen().start_destination(), Destination::Login);
        // 访客看不到 user 的个人库
        assert_eq!(ctx.games.library_status(891238).await.unwrap(), None);
        ctx.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn relative_data_dir_boots() {
        let dir = tempfile::Builder::new()
            .prefix("relative-data")
            .tempdir_in(".")
            .unwrap();
        assert!(dir.path().is_relative());

        let ctx = bootstrap(config_in(dir.path())).await.unwrap();
        assert!(store_path::db_path_in(dir.path()).exists());
        ctx.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn screens_open_from_context() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = bootstrap(config_in(dir.path())).await.unwrap();

        let home = ctx.home_screen().await.unwrap();
        assert_eq!(home.snapshot().games.len(), 10);

        let detail = ctx.detail_screen(983381).await.unwrap();
        assert!(detail.snapshot().game.data().is_some());

        let library = ctx.library_screen().await;
        assert!(library.snapshot().library_games.data().is_some());

        let register = ctx.register_screen();
        register.on_username_change("tester");
        assert_eq!(register.snapshot().username, "tester");
    }
}
