pub mod collectors_repository;
pub mod finance_repository;
pub mod members_repository;
pub mod settings_repository;
pub mod tickets_repository;

#[cfg(test)]
pub(crate) mod test_utils {
    use migration::MigratorTrait;
    use sea_orm::{ConnectOptions, Database, DatabaseConnection};

    /// 在内存 SQLite 上执行全部迁移，供各仓库测试复用
    ///
    /// 连接池固定为 1，内存库在多个连接间不共享
    pub async fn setup_db() -> DatabaseConnection {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1);

        let db = Database::connect(options)
            .await
            .expect("failed to open in-memory sqlite");
        migration::Migrator::up(&db, None)
            .await
            .expect("failed to run migrations");
        db
    }
}
