use log::LevelFilter;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

fn parse_level(level: &str) -> Result<LevelFilter, String> {
    match level.trim().to_lowercase().as_str() {
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        "off" => Ok(LevelFilter::Off),
        other => Err(format!("无效的日志级别: {}", other)),
    }
}

/// 初始化日志输出（重复调用只调整级别）
///
/// 后端允许所有级别通过，实际输出级别由 `log::max_level` 控制，
/// 这样运行时可以动态调整。
pub fn init_logger(level: &str) {
    let filter = parse_level(level).unwrap_or_else(|e| {
        eprintln!("{}，使用 info", e);
        LevelFilter::Info
    });

    let result = env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .format_timestamp_millis()
        .try_init();
    if result.is_err() {
        log::debug!("日志已初始化，仅调整级别");
    }
    log::set_max_level(filter);
}

/// 动态设置日志输出级别（不持久化）
pub fn set_log_level(level: &str) -> Result<(), String> {
    log::set_max_level(parse_level(level)?);
    Ok(())
}

/// 获取当前日志级别
pub fn get_log_level() -> LogLevel {
    match log::max_level() {
        LevelFilter::Error => LogLevel::Error,
        LevelFilter::Warn => LogLevel::Warn,
        LevelFilter::Info => LogLevel::Info,
        LevelFilter::Debug => LogLevel::Debug,
        LevelFilter::Trace => LogLevel::Trace,
        LevelFilter::Off => LogLevel::Off,
    }
}
