pub mod db;
pub mod notifier;
pub mod repository;
pub mod service;

// 重新导出 service 中的所有内容方便使用
pub use service::*;
