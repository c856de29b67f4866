mod database;
mod entity;
mod utils;

use database::db::{backup_database, import_database};
use database::*;
use migration::MigratorTrait;
use tauri::Manager;
use tauri_plugin_log::{Target, TargetKind, TimezoneStrategy};
use utils::{
    fs::{open_directory, PathManager},
    import::import_data_from_json,
    logs::{get_desk_log_level, set_desk_log_level},
    print::{build_collector_round_sheet, build_collectors_summary, save_print_document},
};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_process::init())
        .plugin(tauri_plugin_window_state::Builder::new().build())
        .plugin(tauri_plugin_single_instance::init(|app, _args, _cwd| {
            let window = app.get_webview_window("main").expect("no main window");
            let _ = window.show();
            let _ = window.unminimize();
            let _ = window.set_focus();
        }))
        .plugin(tauri_plugin_shell::init())
        .plugin(tauri_plugin_fs::init())
        .plugin(tauri_plugin_dialog::init())
        .invoke_handler(tauri::generate_handler![
            // 工具类 commands
            open_directory,
            backup_database,
            import_database,
            import_data_from_json,
            // 收款员相关 commands
            insert_collector,
            update_collector,
            find_collector_by_id,
            find_all_collectors,
            find_collectors_with_members,
            set_collector_active,
            delete_collector,
            move_collector_members,
            count_collectors,
            collector_exists_by_number,
            // 会员相关 commands
            insert_member,
            update_member,
            find_member_by_id,
            find_all_members,
            search_members,
            delete_member,
            delete_members_batch,
            count_members,
            member_exists_by_number,
            set_member_verified,
            // 家庭成员相关 commands
            add_family_member,
            get_family_members,
            update_family_member,
            delete_family_member,
            // 备注相关 commands
            add_admin_note,
            get_member_notes,
            update_admin_note,
            delete_admin_note,
            // 注册申请相关 commands
            create_registration,
            find_registrations,
            update_registration_status,
            delete_registration,
            // 财务相关 commands
            record_payment,
            update_payment,
            find_payment_by_id,
            find_payments,
            get_member_payments,
            get_collector_payments,
            delete_payment,
            record_expense,
            update_expense,
            find_expenses,
            delete_expense,
            get_finance_summary,
            // 工单相关 commands
            create_ticket,
            update_ticket,
            find_ticket_by_id,
            find_tickets,
            delete_ticket,
            count_open_tickets,
            add_ticket_response,
            get_ticket_responses,
            delete_ticket_response,
            // 设置与档案相关 commands
            get_all_settings,
            update_settings,
            get_db_backup_path,
            set_db_backup_path,
            get_profiles,
            ensure_default_profile,
            update_profile,
            // 打印相关 commands
            build_collector_round_sheet,
            build_collectors_summary,
            save_print_document,
            // 日志相关 commands（运行时动态调整）
            set_desk_log_level,
            get_desk_log_level,
        ])
        .setup(|app| {
            // 初始化路径管理器
            let path_manager = PathManager::new();
            app.manage(path_manager);

            // 执行 SeaORM 数据库迁移并注册到状态管理
            let app_handle = app.handle().clone();
            tauri::async_runtime::block_on(async move {
                match db::establish_connection(&app_handle).await {
                    Ok(conn) => {
                        log::info!("数据库连接建立成功");

                        // 执行数据库迁移
                        log::info!("开始执行数据库迁移...");
                        match migration::Migrator::up(&conn, None).await {
                            Ok(_) => log::info!("数据库迁移完成"),
                            Err(e) => log::error!("数据库迁移失败: {}", e),
                        }

                        // 将数据库连接注册到 Tauri 状态管理
                        app_handle.manage(conn.clone());

                        // 预热备份目录缓存
                        if let Some(path_manager) = app_handle.try_state::<PathManager>() {
                            match path_manager.get_db_backup_path(&app_handle, &conn).await {
                                Ok(path) => log::info!("备份目录: {}", path.display()),
                                Err(e) => log::warn!("预加载备份目录失败: {}", e),
                            }
                        }
                    }
                    Err(e) => {
                        log::error!("无法建立数据库连接: {}", e);
                        panic!("数据库初始化失败: {}", e);
                    }
                }
            });

            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .timezone_strategy(TimezoneStrategy::UseLocal)
                        .level(log::LevelFilter::Debug) // 允许运行时动态调整到任意级别
                        .targets([
                            Target::new(TargetKind::LogDir {
                                file_name: Some("debug".into()),
                            }),
                            Target::new(TargetKind::Stdout),
                        ])
                        .build(),
                )?;
            } else {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .timezone_strategy(TimezoneStrategy::UseLocal)
                        .level(log::LevelFilter::Debug) // 允许运行时动态调整到任意级别
                        .build(),
                )?;
            }
            log::set_max_level(log::LevelFilter::Error);
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| {
            // 监听应用退出事件
            if let tauri::RunEvent::Exit = event {
                // 同步获取并关闭数据库连接
                if let Some(conn_state) = app_handle.try_state::<sea_orm::DatabaseConnection>() {
                    let conn = conn_state.inner().clone();

                    // 使用 block_on 确保数据库连接在应用退出前完全关闭
                    tauri::async_runtime::block_on(async {
                        match db::close_connection(conn).await {
                            Ok(_) => log::info!("数据库连接已成功关闭"),
                            Err(e) => log::error!("关闭数据库连接时出错: {}", e),
                        }
                    });
                }
            }
        });
}
