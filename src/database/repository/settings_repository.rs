//! 应用设置与管理员档案仓库

use crate::entity::prelude::*;
use crate::entity::{profiles, settings};
use sea_orm::*;

/// 应用设置仓库
pub struct SettingsRepository;

impl SettingsRepository {
    /// 确保设置记录存在（ID 固定为 1）
    async fn ensure_settings_exists(db: &DatabaseConnection) -> Result<(), DbErr> {
        let existing = Settings::find_by_id(1).one(db).await?;

        if existing.is_none() {
            let record = settings::ActiveModel {
                id: Set(1),
                org_name: Set(None),
                db_backup_path: Set(None),
                currency: Set(None),
            };

            record.insert(db).await?;
        }

        Ok(())
    }

    /// 获取组织名称
    pub async fn get_org_name(db: &DatabaseConnection) -> Result<String, DbErr> {
        Self::ensure_settings_exists(db).await?;

        let record = Settings::find_by_id(1)
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Settings record not found".to_string()))?;

        Ok(record.org_name.unwrap_or_default())
    }

    /// 获取货币符号（缺省为 £）
    pub async fn get_currency(db: &DatabaseConnection) -> Result<String, DbErr> {
        Self::ensure_settings_exists(db).await?;

        let record = Settings::find_by_id(1)
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Settings record not found".to_string()))?;

        Ok(record
            .currency
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "£".to_string()))
    }

    /// 获取数据库备份保存路径
    pub async fn get_db_backup_path(db: &DatabaseConnection) -> Result<String, DbErr> {
        Self::ensure_settings_exists(db).await?;

        let record = Settings::find_by_id(1)
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Settings record not found".to_string()))?;

        Ok(record.db_backup_path.unwrap_or_default())
    }

    /// 设置数据库备份保存路径
    pub async fn set_db_backup_path(db: &DatabaseConnection, path: String) -> Result<(), DbErr> {
        Self::ensure_settings_exists(db).await?;

        let record = Settings::find_by_id(1)
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Settings record not found".to_string()))?;

        let mut active: settings::ActiveModel = record.into();
        active.db_backup_path = Set(Some(path));

        active.update(db).await?;
        Ok(())
    }

    /// 获取所有设置
    pub async fn get_all_settings(db: &DatabaseConnection) -> Result<settings::Model, DbErr> {
        Self::ensure_settings_exists(db).await?;

        Settings::find_by_id(1)
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Settings record not found".to_string()))
    }

    /// 批量更新设置
    pub async fn update_settings(
        db: &DatabaseConnection,
        org_name: Option<String>,
        currency: Option<String>,
        db_backup_path: Option<String>,
    ) -> Result<(), DbErr> {
        Self::ensure_settings_exists(db).await?;

        let record = Settings::find_by_id(1)
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Settings record not found".to_string()))?;

        let mut active: settings::ActiveModel = record.into();

        if let Some(name) = org_name {
            active.org_name = Set(Some(name));
        }

        if let Some(currency) = currency {
            active.currency = Set(Some(currency));
        }

        if let Some(path) = db_backup_path {
            active.db_backup_path = Set(Some(path));
        }

        active.update(db).await?;
        Ok(())
    }

    // ==================== 管理员档案 ====================

    /// 确保默认管理员档案存在，返回其 ID
    pub async fn ensure_default_profile(db: &DatabaseConnection) -> Result<i32, DbErr> {
        if let Some(first) = Profiles::find()
            .order_by_asc(profiles::Column::Id)
            .one(db)
            .await?
        {
            return Ok(first.id);
        }

        let now = chrono::Utc::now().timestamp() as i32;
        let record = profiles::ActiveModel {
            id: NotSet,
            display_name: Set(Some("Administrator".to_string())),
            email: Set(None),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };

        let result = record.insert(db).await?;
        Ok(result.id)
    }

    /// 获取所有管理员档案
    pub async fn get_profiles(db: &DatabaseConnection) -> Result<Vec<profiles::Model>, DbErr> {
        Profiles::find()
            .order_by_asc(profiles::Column::Id)
            .all(db)
            .await
    }

    /// 更新管理员档案
    pub async fn update_profile(
        db: &DatabaseConnection,
        id: i32,
        display_name: Option<String>,
        email: Option<String>,
    ) -> Result<profiles::Model, DbErr> {
        let record = Profiles::find_by_id(id)
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Profile not found".to_string()))?;

        let mut active: profiles::ActiveModel = record.into();

        if let Some(name) = display_name {
            active.display_name = Set(Some(name));
        }
        if let Some(email) = email {
            active.email = Set(Some(email));
        }
        active.updated_at = Set(Some(chrono::Utc::now().timestamp() as i32));

        active.update(db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repository::test_utils::setup_db;

    #[tokio::test]
    async fn settings_row_is_created_on_first_access() {
        let db = setup_db().await;

        // 首次访问自动补建 id = 1 的记录
        assert_eq!(SettingsRepository::get_org_name(&db).await.unwrap(), "");
        assert_eq!(SettingsRepository::get_currency(&db).await.unwrap(), "£");

        SettingsRepository::update_settings(
            &db,
            Some("Community Welfare Trust".to_string()),
            Some("€".to_string()),
            None,
        )
        .await
        .unwrap();

        let all = SettingsRepository::get_all_settings(&db).await.unwrap();
        assert_eq!(all.org_name.as_deref(), Some("Community Welfare Trust"));
        assert_eq!(all.currency.as_deref(), Some("€"));
        assert_eq!(all.db_backup_path, None);
    }

    #[tokio::test]
    async fn default_profile_is_created_once() {
        let db = setup_db().await;

        let first = SettingsRepository::ensure_default_profile(&db).await.unwrap();
        let second = SettingsRepository::ensure_default_profile(&db).await.unwrap();
        assert_eq!(first, second);

        let profiles = SettingsRepository::get_profiles(&db).await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].display_name.as_deref(), Some("Administrator"));
    }
}
