//! 会话存储
//!
//! 只保存当前登录的用户名。文件中有两个键：`is_logged_in` 和 `username`，
//! 退出登录时两个键都被清除。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::{watch, Mutex};

use crate::error::AppError;

#[async_trait]
pub trait SessionManager: Send + Sync {
    /// 登录/注册成功后写入会话
    async fn save_session(&self, username: &str) -> Result<(), AppError>;
    /// 退出登录，清除全部会话数据
    async fn clear_session(&self) -> Result<(), AppError>;

    fn username(&self) -> Option<String>;
    fn is_logged_in(&self) -> bool;
    fn observe_username(&self) -> watch::Receiver<Option<String>>;
    fn observe_logged_in(&self) -> watch::Receiver<bool>;
}

/// 会话文件内容
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_logged_in: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
}

impl SessionFile {
    fn logged_in_as(&self) -> Option<String> {
        match (self.is_logged_in, &self.username) {
            (Some(true), Some(name)) if !name.is_empty() => Some(name.clone()),
            _ => None,
        }
    }
}

/// 两个观察通道，写入时同时更新
struct SessionChannels {
    username: watch::Sender<Option<String>>,
    logged_in: watch::Sender<bool>,
}

impl SessionChannels {
    fn new(initial: Option<String>) -> Self {
        let logged_in = initial.is_some();
        Self {
            username: watch::Sender::new(initial),
            logged_in: watch::Sender::new(logged_in),
        }
    }

    fn publish(&self, username: Option<String>) {
        let logged_in = username.is_some();
        self.username.send_if_modified(|current| {
            if *current != username {
                *current = username;
                true
            } else {
                false
            }
        });
        self.logged_in.send_if_modified(|current| {
            if *current != logged_in {
                *current = logged_in;
                true
            } else {
                false
            }
        });
    }
}

// ==================== 文件会话 ====================

/// 以 JSON 文件持久化的会话
pub struct FileSessionManager {
    path: PathBuf,
    channels: SessionChannels,
    write_lock: Mutex<()>,
}

impl FileSessionManager {
    /// 打开会话文件，文件损坏时视为未登录
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = load_session_file(&path);
        let username = file.logged_in_as();
        match &username {
            Some(name) => log::info!("恢复会话: {}", name),
            None => log::debug!("没有已保存的会话"),
        }

        Self {
            path,
            channels: SessionChannels::new(username),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, file: &SessionFile) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(file)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

fn load_session_file(path: &Path) -> SessionFile {
    if !path.exists() {
        return SessionFile::default();
    }
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("读取会话文件失败: {}", e);
            return SessionFile::default();
        }
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        log::warn!("会话文件已损坏，按未登录处理: {}", e);
        SessionFile::default()
    })
}

#[async_trait]
impl SessionManager for FileSessionManager {
    async fn save_session(&self, username: &str) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let file = SessionFile {
            is_logged_in: Some(true),
            username: Some(username.to_owned()),
        };
        self.persist(&file).await?;
        self.channels.publish(Some(username.to_owned()));
        log::info!("会话已保存: {}", username);
        Ok(())
    }

    async fn clear_session(&self) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        self.persist(&SessionFile::default()).await?;
        self.channels.publish(None);
        log::info!("会话已清除");
        Ok(())
    }

    fn username(&self) -> Option<String> {
        self.channels.username.borrow().clone()
    }

    fn is_logged_in(&self) -> bool {
        *self.channels.logged_in.borrow()
    }

    fn observe_username(&self) -> watch::Receiver<Option<String>> {
        self.channels.username.subscribe()
    }

    fn observe_logged_in(&self) -> watch::Receiver<bool> {
        self.channels.logged_in.subscribe()
    }
}

// ==================== 内存会话 ====================

/// 不落盘的会话
pub struct MemorySessionManager {
    channels: SessionChannels,
}

impl MemorySessionManager {
    pub fn new() -> Self {
        Self {
            channels: SessionChannels::new(None),
        }
    }

    pub fn logged_in_as(username: &str) -> Self {
        Self {
            channels: SessionChannels::new(Some(username.to_owned())),
        }
    }
}

impl Default for MemorySessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionManager for MemorySessionManager {
    async fn save_session(&self, username: &str) -> Result<(), AppError> {
        self.channels.publish(Some(username.to_owned()));
        Ok(())
    }

    async fn clear_session(&self) -> Result<(), AppError> {
        self.channels.publish(None);
        Ok(())
    }

    fn username(&self) -> Option<String> {
        self.channels.username.borrow().clone()
    }

    fn is_logged_in(&self) -> bool {
        *self.channels.logged_in.borrow()
    }

    fn observe_username(&self) -> watch::Receiver<Option<String>> {
        self.channels.username.subscribe()
    }

    fn observe_logged_in(&self) -> watch::Receiver<bool> {
        self.channels.logged_in.subscribe()
    }
}
