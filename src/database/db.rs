use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, RuntimeErr};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

// ==================== 数据库连接管理 ====================

/// Establish a SeaORM database connection.
pub async fn establish_connection(db_path: &Path) -> Result<DatabaseConnection, DbErr> {
    // 相对路径（如配置中的 data_dir）按当前工作目录展开，Url 只接受绝对路径
    let db_path = std::path::absolute(db_path).map_err(|e| {
        DbErr::Conn(RuntimeErr::Internal(format!("无法解析数据库路径: {}", e)))
    })?;
    let db_path = db_path.as_path();

    // 1. 如果数据库不存在，创建目录
    if !db_path.exists() {
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DbErr::Conn(RuntimeErr::Internal(format!("无法创建数据库目录: {}", e)))
            })?;
        }
        log::info!("首次启动，创建数据库: {}", db_path.display());
    } else {
        log::info!("使用数据库: {}", db_path.display());
    }

    // 2. 使用 `url` crate 安全地构建连接字符串
    let db_url = Url::from_file_path(db_path).map_err(|_| {
        DbErr::Conn(RuntimeErr::Internal(format!(
            "Invalid database path: {}",
            db_path.display()
        )))
    })?;

    connect_url(&format!("sqlite:{}?mode=rwc", db_url.path())).await
}

/// 按连接字符串连接（测试中使用 `sqlite::memory:`）
pub async fn connect_url(connection_string: &str) -> Result<DatabaseConnection, DbErr> {
    // 单连接：所有读写在同一个连接上串行执行
    let mut options = ConnectOptions::new(connection_string.to_owned());
    options
        .max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    Database::connect(options).await
}

/// 连接并执行迁移
pub async fn open_database(db_path: &Path) -> Result<DatabaseConnection, DbErr> {
    let conn = establish_connection(db_path).await?;
    run_migrations(&conn).await?;
    Ok(conn)
}

/// 执行全部未应用的迁移
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<(), DbErr> {
    log::info!("开始执行数据库迁移...");
    match Migrator::up(conn, None).await {
        Ok(_) => {
            log::info!("数据库迁移完成");
            Ok(())
        }
        Err(e) => {
            log::error!("数据库迁移失败: {}", e);
            Err(e)
        }
    }
}

/// 关闭数据库连接
pub async fn close_connection(conn: DatabaseConnection) -> Result<(), DbErr> {
    conn.close().await?;
    Ok(())
}

/// 内存数据库，已执行迁移
#[cfg(test)]
pub(crate) async fn open_in_memory() -> DatabaseConnection {
    let conn = connect_url("sqlite::memory:").await.unwrap();
    run_migrations(&conn).await.unwrap();
    conn
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    async fn table_names(conn: &DatabaseConnection) -> Vec<String> {
        conn.query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        ))
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.try_get::<String>("", "name").unwrap())
        .collect()
    }

    #[tokio::test]
    async fn migrations_create_all_tables() {
        let conn = open_in_memory().await;
        let tables = table_names(&conn).await;
        for table in ["game_notes", "library", "recent_games", "search_history", "users"] {
            assert!(tables.iter().any(|t| t == table), "missing table {}", table);
        }
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let conn = open_in_memory().await;
        run_migrations(&conn).await.unwrap();
        assert_eq!(Migrator::get_pending_migrations(&conn).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn open_database_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("mygamestore.db");

        let conn = open_database(&path).await.unwrap();
        assert!(path.exists());
        close_connection(conn).await.unwrap();

        // 再次打开不会重复迁移
        let conn = open_database(&path).await.unwrap();
        assert!(table_names(&conn).await.iter().any(|t| t == "library"));
        close_connection(conn).await.unwrap();
    }

    #[tokio::test]
    async fn relative_path_is_resolved_against_cwd() {
        // tempdir_in(".") 返回的是相对路径
        let dir = tempfile::Builder::new()
            .prefix("relative-data")
            .tempdir_in(".")
            .unwrap();
        assert!(dir.path().is_relative());
        let path = dir.path().join("data").join("mygamestore.db");

        let conn = open_database(&path).await.unwrap();
        assert!(path.exists());
        close_connection(conn).await.unwrap();
    }
}
