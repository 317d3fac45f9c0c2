//! 应用配置
//!
//! 配置保存在数据目录下的 `config.json`，所有字段都有默认值。
//! 文件缺失或损坏时回退到默认配置，不会阻止启动。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 覆盖默认的数据目录
    pub data_dir: Option<PathBuf>,
    /// 目录读取的模拟网络延迟（毫秒）
    pub network_latency_ms: u64,
    /// 登录/注册的模拟延迟（毫秒）
    pub auth_latency_ms: u64,
    /// 未登录时使用的用户名
    pub guest_username: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            network_latency_ms: 800,
            auth_latency_ms: 1500,
            guest_username: "guest".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// 从文件读取配置
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::info!("未找到配置文件，使用默认配置: {}", path.display());
            return Self::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("读取配置文件失败，使用默认配置: {}", e);
                return Self::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("解析配置文件失败，使用默认配置: {}", e);
            Self::default()
        })
    }

    /// 写回配置文件
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 测试用配置：没有延迟
    pub fn without_latency() -> Self {
        Self {
            network_latency_ms: 0,
            auth_latency_ms: 0,
            ..Self::default()
        }
    }

    /// 实际使用的数据目录
    pub fn resolve_data_dir(&self) -> Result<PathBuf, AppError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => store_path::get_base_data_dir().map_err(AppError::Unknown),
        }
    }

    pub fn network_latency(&self) -> Duration {
        Duration::from_millis(self.network_latency_ms)
    }

    pub fn auth_latency(&self) -> Duration {
        Duration::from_millis(self.auth_latency_ms)
    }
}
