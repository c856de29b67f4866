//! 路径管理与文件系统辅助

use parking_lot::Mutex;
use sea_orm::DatabaseConnection;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tauri::{command, AppHandle, Manager};

// ==================== 路径相关常量 ====================

pub const DB_DATA_DIR: &str = "data";
pub const DB_FILE_NAME: &str = "collector_desk.db";
pub const DB_BACKUP_SUBDIR: &str = "backups";

// ==================== 路径基础函数（直接使用 Tauri API） ====================

/// 获取应用数据目录
pub fn get_app_data_dir(app: &AppHandle) -> Result<PathBuf, String> {
    app.path()
        .app_data_dir()
        .map_err(|e| format!("无法获取应用数据目录: {}", e))
}

/// 获取数据库文件路径
pub fn get_db_path(app: &AppHandle) -> Result<PathBuf, String> {
    Ok(get_app_data_dir(app)?.join(DB_DATA_DIR).join(DB_FILE_NAME))
}

/// 获取默认的数据库备份目录
pub fn get_default_backup_dir(app: &AppHandle) -> Result<PathBuf, String> {
    Ok(get_app_data_dir(app)?
        .join(DB_DATA_DIR)
        .join(DB_BACKUP_SUBDIR))
}

/// 确保数据库目录存在
pub fn ensure_db_dir_exists(app: &AppHandle) -> Result<(), String> {
    let db_path = get_db_path(app)?;
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("无法创建数据库目录: {}", e))?;
    }
    Ok(())
}

// ==================== 路径管理器 ====================

/// 路径缓存，用于在应用运行期间复用已计算的路径
#[derive(Debug, Default)]
struct PathCache {
    db_backup_path: Option<PathBuf>,
}

/// 全局路径管理器
pub struct PathManager {
    cache: Mutex<PathCache>,
}

impl Default for PathManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PathManager {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(PathCache::default()),
        }
    }

    /// 获取数据库备份路径
    ///
    /// 优先使用设置中的自定义路径，否则退回默认的 data/backups 目录
    pub async fn get_db_backup_path(
        &self,
        app: &AppHandle,
        db: &DatabaseConnection,
    ) -> Result<PathBuf, String> {
        // 检查缓存
        {
            let cache = self.cache.lock();
            if let Some(path) = &cache.db_backup_path {
                return Ok(path.clone());
            }
        }

        // 从数据库读取配置
        use crate::database::repository::settings_repository::SettingsRepository;

        let custom = SettingsRepository::get_db_backup_path(db)
            .await
            .map_err(|e| format!("读取备份路径配置失败: {}", e))?;

        let path = if custom.trim().is_empty() {
            get_default_backup_dir(app)?
        } else {
            PathBuf::from(custom.trim())
        };

        // 缓存路径
        {
            let mut cache = self.cache.lock();
            cache.db_backup_path = Some(path.clone());
        }

        Ok(path)
    }

    /// 清除缓存，下次获取时重新计算路径
    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock();
        *cache = PathCache::default();
    }
}

// ==================== 文件系统 commands ====================

/// 在系统文件管理器中打开目录
#[command]
pub async fn open_directory(dir_path: String) -> Result<(), String> {
    if !Path::new(&dir_path).exists() {
        return Err(format!("路径不存在: {}", dir_path));
    }

    #[cfg(target_os = "windows")]
    {
        // Explorer 更偏好原生的反斜杠格式
        let normalized_path = dir_path.replace('/', "\\");
        Command::new("explorer")
            .arg(&normalized_path)
            .spawn()
            .map_err(|e| format!("无法打开目录: {}", e))?;
        Ok(())
    }

    #[cfg(target_os = "macos")]
    {
        Command::new("open")
            .arg(&dir_path)
            .spawn()
            .map_err(|e| format!("无法打开目录: {}", e))?;
        Ok(())
    }

    #[cfg(all(not(target_os = "windows"), not(target_os = "macos")))]
    {
        Command::new("xdg-open")
            .arg(&dir_path)
            .spawn()
            .map_err(|e| format!("无法打开目录: {}", e))?;
        Ok(())
    }
}
