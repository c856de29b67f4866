use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, RuntimeErr};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tauri::{command, AppHandle, Manager};
use url::Url;

use crate::utils::fs::{ensure_db_dir_exists, get_db_path, PathManager};

/// 数据库备份结果
#[derive(Debug, Serialize, Deserialize)]
pub struct BackupResult {
    pub success: bool,
    pub path: Option<String>,
    pub message: String,
}

/// 数据库导入结果
#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: bool,
    pub message: String,
    pub backup_path: Option<String>,
}

// ==================== 数据库连接管理 ====================

/// Establish a SeaORM database connection.
pub async fn establish_connection(app: &AppHandle) -> Result<DatabaseConnection, DbErr> {
    // 1. 解析数据库文件路径
    let db_path = get_db_path(app).map_err(|e| DbErr::Conn(RuntimeErr::Internal(e)))?;

    // 2. 确保数据库所在的目录存在
    ensure_db_dir_exists(app).map_err(|e| DbErr::Conn(RuntimeErr::Internal(e)))?;

    if !db_path.exists() {
        log::info!("首次启动，创建数据库: {}", db_path.display());
    }

    // 3. 使用 `url` crate 安全地构建连接字符串
    let db_url = Url::from_file_path(&db_path).map_err(|_| {
        DbErr::Conn(RuntimeErr::Internal(format!(
            "Invalid database path: {}",
            db_path.display()
        )))
    })?;

    let connection_string = format!("sqlite:{}?mode=rwc", db_url.path());

    // 4. 设置连接选项（本地 SQLite 连接池大小为 1 即可）
    let mut options = ConnectOptions::new(connection_string);
    options
        .max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8));
    options.sqlx_logging(false);

    // 5. 连接数据库
    Database::connect(options).await
}

/// 关闭数据库连接
pub async fn close_connection(conn: DatabaseConnection) -> Result<(), DbErr> {
    conn.close().await?;
    Ok(())
}

// ==================== 数据库备份和导入 ====================

/// 生成带时间戳的备份文件名
fn generate_backup_filename() -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    format!("collector_desk_{}.db", timestamp)
}

/// 解析备份目标目录（使用统一的路径管理器）
async fn resolve_backup_dir(
    app_handle: &AppHandle,
    db: &DatabaseConnection,
) -> Result<std::path::PathBuf, String> {
    let path_manager = app_handle.state::<PathManager>();
    let backup_dir = path_manager.get_db_backup_path(app_handle, db).await?;

    // 确保目录存在
    if !backup_dir.exists() {
        fs::create_dir_all(&backup_dir).map_err(|e| format!("无法创建备份目录: {}", e))?;
    }

    Ok(backup_dir)
}

/// 使用 VACUUM INTO 进行数据库热备份
///
/// VACUUM INTO 可以在数据库正在使用时安全地创建一个优化后的副本。
/// 备份目录优先取设置中的 db_backup_path，否则使用默认的 data/backups。
#[command]
pub async fn backup_database(app_handle: AppHandle) -> Result<BackupResult, String> {
    let db = app_handle
        .try_state::<DatabaseConnection>()
        .ok_or("数据库连接不可用")?;

    let backup_name = generate_backup_filename();
    let backup_dir = resolve_backup_dir(&app_handle, &db).await?;
    let target_path = backup_dir.join(&backup_name);

    // SQLite 在 Windows 上也支持正斜杠，统一使用正斜杠避免转义问题
    let target_path_str = target_path
        .to_str()
        .ok_or("备份路径包含无效字符")?
        .replace('\\', "/");

    // 只需要转义单引号
    let escaped_path = target_path_str.replace('\'', "''");
    let vacuum_sql = format!("VACUUM INTO '{}'", escaped_path);

    db.execute_unprepared(&vacuum_sql)
        .await
        .map_err(|e| format!("VACUUM INTO 备份失败: {}", e))?;

    log::info!("数据库热备份成功: {}", target_path_str);

    Ok(BackupResult {
        success: true,
        path: Some(target_path_str),
        message: "数据库备份成功".to_string(),
    })
}

/// 导入数据库文件（覆盖现有数据库）
///
/// 导入前先关闭连接并做一次冷备份；导入成功后由前端负责重启应用。
#[command]
pub async fn import_database(
    source_path: String,
    app_handle: AppHandle,
) -> Result<ImportResult, String> {
    let src_path = Path::new(&source_path);

    if !src_path.exists() {
        return Err(format!("源数据库文件不存在: {}", source_path));
    }

    if src_path.extension().and_then(|e| e.to_str()) != Some("db") {
        return Err("无效的数据库文件，请选择 .db 文件".to_string());
    }

    // 在关闭连接前读取备份配置
    let backup_dir = if let Some(conn_state) = app_handle.try_state::<DatabaseConnection>() {
        resolve_backup_dir(&app_handle, conn_state.inner()).await.ok()
    } else {
        None
    };

    let target_db_path = get_db_path(&app_handle)?;

    // 步骤1：关闭数据库连接（必须先关闭才能安全备份和覆盖）
    if let Some(conn_state) = app_handle.try_state::<DatabaseConnection>() {
        let conn = conn_state.inner().clone();
        close_connection(conn)
            .await
            .map_err(|e| format!("关闭数据库连接失败: {}", e))?;
        log::info!("数据库连接已关闭，准备备份和导入");
    }

    // 步骤2：冷备份现有数据库
    let result_backup_path = if target_db_path.exists() {
        if let Some(dir) = backup_dir {
            let backup_name = generate_backup_filename();
            let backup_file_path = dir.join(&backup_name);

            match fs::copy(&target_db_path, &backup_file_path) {
                Ok(_) => {
                    let path_str = backup_file_path.to_string_lossy().to_string();
                    log::info!("导入前冷备份成功: {}", path_str);
                    Some(path_str)
                }
                Err(e) => {
                    log::warn!("导入前备份失败: {}，继续导入", e);
                    None
                }
            }
        } else {
            log::warn!("无法确定备份目录，跳过备份");
            None
        }
    } else {
        None
    };

    // 步骤3：复制文件覆盖现有数据库
    fs::copy(src_path, &target_db_path).map_err(|e| format!("复制数据库文件失败: {}", e))?;
    log::info!("数据库文件已复制: {} -> {:?}", source_path, target_db_path);

    Ok(ImportResult {
        success: true,
        message: "数据库导入成功，应用将自动重启".to_string(),
        backup_path: result_backup_path,
    })
}
