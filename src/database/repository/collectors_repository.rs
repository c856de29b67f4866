//! 收款员数据仓库
//!
//! 收款员与会员是一对多关系，由 members.collector_id 外键维护。
//! 删除收款员不会删除会员（外键置空），批量转移由 move_members 完成。

use crate::database::dto::{InsertCollectorData, UpdateCollectorData};
use crate::entity::prelude::*;
use crate::entity::{collectors, members};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::{Deserialize, Serialize};

/// 收款员数据仓库
pub struct CollectorsRepository;

/// 收款员及其名下会员
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorWithMembers {
    pub id: i32,
    pub name: String,
    pub number: String,
    pub prefix: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub active: Option<i32>,
    pub member_count: u64,
    pub members: Vec<members::Model>,
}

impl CollectorsRepository {
    // ==================== 收款员 CRUD 操作 ====================

    /// 新建收款员
    pub async fn insert(db: &DatabaseConnection, data: InsertCollectorData) -> Result<i32, DbErr> {
        let now = chrono::Utc::now().timestamp() as i32;

        let collector = collectors::ActiveModel {
            id: NotSet,
            name: Set(data.name),
            number: Set(data.number),
            prefix: Set(data.prefix),
            phone: Set(data.phone),
            email: Set(data.email),
            active: Set(Some(data.active.unwrap_or(1))),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };

        let result = collector.insert(db).await?;
        Ok(result.id)
    }

    /// 更新收款员数据
    ///
    /// 支持部分更新，未提供的字段保持不变
    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        updates: UpdateCollectorData,
    ) -> Result<collectors::Model, DbErr> {
        let now = chrono::Utc::now().timestamp() as i32;

        let collector = collectors::ActiveModel {
            id: Set(id),
            name: updates.name.map_or(NotSet, Set),
            number: updates.number.map_or(NotSet, Set),
            prefix: updates.prefix.map_or(NotSet, Set),
            phone: updates.phone.map_or(NotSet, Set),
            email: updates.email.map_or(NotSet, Set),
            active: updates.active.map_or(NotSet, |a| Set(Some(a))),
            updated_at: Set(Some(now)),
            ..Default::default()
        };

        collector.update(db).await
    }

    /// 根据 ID 查询收款员
    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<collectors::Model>, DbErr> {
        Collectors::find_by_id(id).one(db).await
    }

    /// 获取所有收款员（按前缀和编号排序）
    pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<collectors::Model>, DbErr> {
        Collectors::find()
            .order_by_asc(collectors::Column::Prefix)
            .order_by_asc(collectors::Column::Number)
            .all(db)
            .await
    }

    /// 删除收款员
    ///
    /// 名下会员由外键置空，不会被级联删除
    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<DeleteResult, DbErr> {
        Collectors::delete_by_id(id).exec(db).await
    }

    /// 获取收款员总数
    pub async fn count(db: &DatabaseConnection) -> Result<u64, DbErr> {
        Collectors::find().count(db).await
    }

    /// 检查指定前缀下的编号是否已存在
    pub async fn exists_number(
        db: &DatabaseConnection,
        prefix: &str,
        number: &str,
    ) -> Result<bool, DbErr> {
        Ok(Collectors::find()
            .filter(
                collectors::Column::Prefix
                    .eq(prefix)
                    .and(collectors::Column::Number.eq(number)),
            )
            .count(db)
            .await?
            > 0)
    }

    // ==================== 状态操作 ====================

    /// 设置收款员在职状态
    pub async fn set_active(
        db: &DatabaseConnection,
        id: i32,
        active: bool,
    ) -> Result<collectors::Model, DbErr> {
        let existing = Collectors::find_by_id(id)
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Collector not found".to_string()))?;

        let mut model: collectors::ActiveModel = existing.into();
        model.active = Set(Some(if active { 1 } else { 0 }));
        model.updated_at = Set(Some(chrono::Utc::now().timestamp() as i32));

        model.update(db).await
    }

    /// 将某收款员名下的所有会员转移给另一位收款员
    ///
    /// 只更新 collector_id 等于 from_id 的会员行，返回受影响的行数
    pub async fn move_members(
        db: &DatabaseConnection,
        from_id: i32,
        to_id: i32,
    ) -> Result<u64, DbErr> {
        if from_id == to_id {
            return Err(DbErr::Custom(
                "Source and destination collector are the same".to_string(),
            ));
        }

        // 目标收款员必须存在，否则外键会让整批更新失败
        let exists = Collectors::find_by_id(to_id).count(db).await? > 0;
        if !exists {
            return Err(DbErr::RecordNotFound(
                "Destination collector not found".to_string(),
            ));
        }

        let now = chrono::Utc::now().timestamp() as i32;

        let result = Members::update_many()
            .col_expr(members::Column::CollectorId, Expr::value(Some(to_id)))
            .col_expr(members::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(members::Column::CollectorId.eq(from_id))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }

    // ==================== 前端友好的组合 API ====================

    /// 获取所有收款员及其名下会员
    ///
    /// search 为可选的搜索词，在内存中按收款员姓名或编号过滤
    pub async fn find_with_members(
        db: &DatabaseConnection,
        search: Option<String>,
    ) -> Result<Vec<CollectorWithMembers>, DbErr> {
        let rows = Collectors::find()
            .order_by_asc(collectors::Column::Prefix)
            .order_by_asc(collectors::Column::Number)
            .find_with_related(Members)
            .all(db)
            .await?;

        let term = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let result = rows
            .into_iter()
            .filter(|(collector, _)| match &term {
                Some(t) => {
                    let label = format!("{}{}", collector.prefix, collector.number);
                    collector.name.to_lowercase().contains(t)
                        || label.to_lowercase().contains(t)
                }
                None => true,
            })
            .map(|(collector, members)| CollectorWithMembers {
                id: collector.id,
                name: collector.name,
                number: collector.number,
                prefix: collector.prefix,
                phone: collector.phone,
                email: collector.email,
                active: collector.active,
                member_count: members.len() as u64,
                members,
            })
            .collect();

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::dto::InsertMemberData;
    use crate::database::repository::members_repository::MembersRepository;
    use crate::database::repository::test_utils::setup_db;

    fn collector(name: &str, number: &str) -> InsertCollectorData {
        InsertCollectorData {
            name: name.to_string(),
            number: number.to_string(),
            prefix: "C".to_string(),
            phone: None,
            email: None,
            active: None,
        }
    }

    fn member(name: &str, number: &str, collector_id: Option<i32>) -> InsertMemberData {
        InsertMemberData {
            full_name: name.to_string(),
            member_number: number.to_string(),
            email: None,
            phone: None,
            address: None,
            town: None,
            postcode: None,
            date_of_birth: None,
            gender: None,
            marital_status: None,
            membership_type: None,
            status: None,
            verified: None,
            collector_id,
        }
    }

    #[tokio::test]
    async fn toggle_active_persists() {
        let db = setup_db().await;
        let id = CollectorsRepository::insert(&db, collector("Ali Hassan", "001"))
            .await
            .unwrap();

        // 新建时默认在职
        let created = CollectorsRepository::find_by_id(&db, id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.active, Some(1));

        CollectorsRepository::set_active(&db, id, false).await.unwrap();
        let fetched = CollectorsRepository::find_by_id(&db, id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.active, Some(0));

        CollectorsRepository::set_active(&db, id, true).await.unwrap();
        let fetched = CollectorsRepository::find_by_id(&db, id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.active, Some(1));
    }

    #[tokio::test]
    async fn move_members_only_touches_source_collector() {
        let db = setup_db().await;
        let from = CollectorsRepository::insert(&db, collector("From", "001"))
            .await
            .unwrap();
        let to = CollectorsRepository::insert(&db, collector("To", "002"))
            .await
            .unwrap();
        let other = CollectorsRepository::insert(&db, collector("Other", "003"))
            .await
            .unwrap();

        let m1 = MembersRepository::insert(&db, member("A", "M001", Some(from)))
            .await
            .unwrap();
        let m2 = MembersRepository::insert(&db, member("B", "M002", Some(from)))
            .await
            .unwrap();
        let m3 = MembersRepository::insert(&db, member("C", "M003", Some(other)))
            .await
            .unwrap();

        let moved = CollectorsRepository::move_members(&db, from, to).await.unwrap();
        assert_eq!(moved, 2);

        for id in [m1, m2] {
            let m = MembersRepository::find_by_id(&db, id).await.unwrap().unwrap();
            assert_eq!(m.collector_id, Some(to));
        }
        // 无关收款员的会员不受影响
        let untouched = MembersRepository::find_by_id(&db, m3).await.unwrap().unwrap();
        assert_eq!(untouched.collector_id, Some(other));
    }

    #[tokio::test]
    async fn move_members_rejects_same_collector() {
        let db = setup_db().await;
        let id = CollectorsRepository::insert(&db, collector("Solo", "001"))
            .await
            .unwrap();

        let result = CollectorsRepository::move_members(&db, id, id).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn delete_collector_orphans_members() {
        let db = setup_db().await;
        let id = CollectorsRepository::insert(&db, collector("Leaving", "001"))
            .await
            .unwrap();
        let member_id = MembersRepository::insert(&db, member("Stays", "M001", Some(id)))
            .await
            .unwrap();

        let result = CollectorsRepository::delete(&db, id).await.unwrap();
        assert_eq!(result.rows_affected, 1);

        // 会员保留，collector_id 被外键置空
        let m = MembersRepository::find_by_id(&db, member_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(m.collector_id, None);
    }

    #[tokio::test]
    async fn find_with_members_filters_by_search_term() {
        let db = setup_db().await;
        let a = CollectorsRepository::insert(&db, collector("Ahmed Khan", "001"))
            .await
            .unwrap();
        CollectorsRepository::insert(&db, collector("Bilal Shah", "002"))
            .await
            .unwrap();

        MembersRepository::insert(&db, member("X", "M001", Some(a)))
            .await
            .unwrap();
        MembersRepository::insert(&db, member("Y", "M002", Some(a)))
            .await
            .unwrap();

        let all = CollectorsRepository::find_with_members(&db, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].member_count, 2);

        let hit = CollectorsRepository::find_with_members(&db, Some("ahmed".to_string()))
            .await
            .unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].name, "Ahmed Khan");

        // 按前缀 + 编号搜索
        let by_number = CollectorsRepository::find_with_members(&db, Some("C002".to_string()))
            .await
            .unwrap();
        assert_eq!(by_number.len(), 1);
        assert_eq!(by_number[0].name, "Bilal Shah");
    }

    #[tokio::test]
    async fn exists_number_is_scoped_to_prefix() {
        let db = setup_db().await;
        CollectorsRepository::insert(&db, collector("Ali", "001"))
            .await
            .unwrap();

        assert!(CollectorsRepository::exists_number(&db, "C", "001").await.unwrap());
        assert!(!CollectorsRepository::exists_number(&db, "D", "001").await.unwrap());
        assert!(!CollectorsRepository::exists_number(&db, "C", "002").await.unwrap());
    }
}
