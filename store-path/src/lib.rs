use std::path::{Path, PathBuf};

/// 数据库相关路径常量
pub const DB_DATA_DIR: &str = "data";
pub const DB_FILE_NAME: &str = "mygamestore.db";
pub const RESOURCE_DIR: &str = "resources";

/// 会话与配置文件名
pub const SESSION_FILE_NAME: &str = "session.json";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// 判断是否处于便携模式
///
/// 检测逻辑：检查可执行文件同级目录下是否存在 resources/data/mygamestore.db
pub fn is_portable_mode() -> bool {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return is_portable_dir(exe_dir);
        }
    }
    false
}

/// 判断指定目录是否包含便携模式的数据库
pub fn is_portable_dir(exe_dir: &Path) -> bool {
    let portable_data_dir = exe_dir.join(RESOURCE_DIR).join(DB_DATA_DIR);
    let portable_db_file = portable_data_dir.join(DB_FILE_NAME);
    portable_data_dir.exists() && portable_db_file.exists()
}

/// 获取基础数据目录
pub fn get_base_data_dir() -> Result<PathBuf, String> {
    get_base_data_dir_for_mode(is_portable_mode())
}

/// 获取指定模式的基础数据目录
pub fn get_base_data_dir_for_mode(portable: bool) -> Result<PathBuf, String> {
    if portable {
        // 便携模式：使用可执行文件所在目录的 resources 子目录
        let exe_path =
            std::env::current_exe().map_err(|e| format!("无法获取可执行文件路径: {}", e))?;
        let exe_dir = exe_path
            .parent()
            .ok_or_else(|| "无法获取可执行文件父目录".to_string())?;
        Ok(exe_dir.join(RESOURCE_DIR))
    } else {
        // 标准模式：使用系统应用数据目录
        get_system_data_dir()
    }
}

/// 获取系统数据目录（跨平台）
fn get_system_data_dir() -> Result<PathBuf, String> {
    use directories::BaseDirs;

    let base_dirs = BaseDirs::new().ok_or_else(|| "无法获取系统目录信息".to_string())?;

    #[cfg(any(target_os = "windows", target_os = "macos"))]
    {
        Ok(base_dirs.data_dir().join("com.mygamestore.app"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        Ok(base_dirs.data_dir().join("mygamestore"))
    }
}

/// 获取数据库文件路径
pub fn db_path_in(base_dir: &Path) -> PathBuf {
    base_dir.join(DB_DATA_DIR).join(DB_FILE_NAME)
}

/// 获取会话文件路径
pub fn session_path_in(base_dir: &Path) -> PathBuf {
    base_dir.join(SESSION_FILE_NAME)
}

/// 获取配置文件路径
pub fn config_path_in(base_dir: &Path) -> PathBuf {
    base_dir.join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_are_laid_out_under_base_dir() {
        let base = Path::new("/tmp/mgs");
        assert_eq!(db_path_in(base), base.join("data").join("mygamestore.db"));
        assert_eq!(session_path_in(base), base.join("session.json"));
        assert_eq!(config_path_in(base), base.join("config.json"));
    }

    #[test]
    fn portable_dir_requires_existing_db_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_portable_dir(dir.path()));

        let data_dir = dir.path().join(RESOURCE_DIR).join(DB_DATA_DIR);
        std::fs::create_dir_all(&data_dir).unwrap();
        assert!(!is_portable_dir(dir.path()));

        std::fs::write(data_dir.join(DB_FILE_NAME), b"").unwrap();
        assert!(is_portable_dir(dir.path()));
    }
}
