//! 会员数据仓库
//!
//! 除会员本身的 CRUD 外，还负责家庭成员、管理员备注和注册申请
//! 这三类以会员为父表的关联数据。

use crate::database::dto::{InsertMemberData, UpdateMemberData};
use crate::entity::prelude::*;
use crate::entity::{admin_notes, family_members, members, registrations};
use sea_orm::*;
use serde::{Deserialize, Serialize};

/// 会员列表筛选
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberFilter {
    All,
    Active,
    Inactive,
    Pending,
    Unverified,
    Unassigned,
}

/// 会员列表排序选项
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    Addtime,
    Name,
    MemberNumber,
}

/// 排序方向
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// 会员数据仓库
pub struct MembersRepository;

impl MembersRepository {
    // ==================== 会员 CRUD 操作 ====================

    /// 新建会员
    pub async fn insert(db: &DatabaseConnection, data: InsertMemberData) -> Result<i32, DbErr> {
        let now = chrono::Utc::now().timestamp() as i32;

        let member = members::ActiveModel {
            id: NotSet,
            full_name: Set(data.full_name),
            member_number: Set(data.member_number),
            email: Set(data.email),
            phone: Set(data.phone),
            address: Set(data.address),
            town: Set(data.town),
            postcode: Set(data.postcode),
            date_of_birth: Set(data.date_of_birth),
            gender: Set(data.gender),
            marital_status: Set(data.marital_status),
            membership_type: Set(data.membership_type),
            status: Set(Some(data.status.unwrap_or_else(|| "active".to_string()))),
            verified: Set(Some(data.verified.unwrap_or(0))),
            collector_id: Set(data.collector_id),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };

        let result = member.insert(db).await?;
        Ok(result.id)
    }

    /// 更新会员数据
    ///
    /// 支持部分更新，未提供的字段保持不变
    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        updates: UpdateMemberData,
    ) -> Result<members::Model, DbErr> {
        let now = chrono::Utc::now().timestamp() as i32;

        let member = members::ActiveModel {
            id: Set(id),
            full_name: updates.full_name.map_or(NotSet, Set),
            member_number: updates.member_number.map_or(NotSet, Set),
            email: updates.email.map_or(NotSet, Set),
            phone: updates.phone.map_or(NotSet, Set),
            address: updates.address.map_or(NotSet, Set),
            town: updates.town.map_or(NotSet, Set),
            postcode: updates.postcode.map_or(NotSet, Set),
            date_of_birth: updates.date_of_birth.map_or(NotSet, Set),
            gender: updates.gender.map_or(NotSet, Set),
            marital_status: updates.marital_status.map_or(NotSet, Set),
            membership_type: updates.membership_type.map_or(NotSet, Set),
            status: updates.status.map_or(NotSet, Set),
            verified: updates.verified.map_or(NotSet, Set),
            collector_id: updates.collector_id.map_or(NotSet, Set),
            updated_at: Set(Some(now)),
            ..Default::default()
        };

        member.update(db).await
    }

    /// 根据 ID 查询会员
    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<members::Model>, DbErr> {
        Members::find_by_id(id).one(db).await
    }

    /// 获取所有会员，支持筛选和排序
    pub async fn find_all(
        db: &DatabaseConnection,
        filter: MemberFilter,
        sort_option: SortOption,
        sort_order: SortOrder,
    ) -> Result<Vec<members::Model>, DbErr> {
        let order = match sort_order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };

        let query = Self::build_base_query(filter);
        let query = match sort_option {
            SortOption::Addtime => query.order_by(members::Column::Id, order),
            SortOption::Name => query.order_by(members::Column::FullName, order),
            SortOption::MemberNumber => query.order_by(members::Column::MemberNumber, order),
        };

        query.all(db).await
    }

    /// 按姓名或会员编号搜索
    pub async fn search(
        db: &DatabaseConnection,
        term: &str,
    ) -> Result<Vec<members::Model>, DbErr> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        Members::find()
            .filter(
                members::Column::FullName
                    .contains(term)
                    .or(members::Column::MemberNumber.contains(term)),
            )
            .order_by_asc(members::Column::FullName)
            .all(db)
            .await
    }

    /// 删除会员
    ///
    /// 家庭成员、备注、注册申请和工单级联删除；缴费记录保留
    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<DeleteResult, DbErr> {
        Members::delete_by_id(id).exec(db).await
    }

    /// 批量删除会员
    pub async fn delete_many(
        db: &DatabaseConnection,
        ids: Vec<i32>,
    ) -> Result<DeleteResult, DbErr> {
        Members::delete_many()
            .filter(members::Column::Id.is_in(ids))
            .exec(db)
            .await
    }

    /// 获取会员总数
    pub async fn count(db: &DatabaseConnection) -> Result<u64, DbErr> {
        Members::find().count(db).await
    }

    /// 检查会员编号是否已存在
    pub async fn exists_number(db: &DatabaseConnection, number: &str) -> Result<bool, DbErr> {
        Ok(Members::find()
            .filter(members::Column::MemberNumber.eq(number))
            .count(db)
            .await?
            > 0)
    }

    /// 设置会员核实状态
    pub async fn set_verified(
        db: &DatabaseConnection,
        id: i32,
        verified: bool,
    ) -> Result<members::Model, DbErr> {
        let existing = Members::find_by_id(id)
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Member not found".to_string()))?;

        let mut model: members::ActiveModel = existing.into();
        model.verified = Set(Some(if verified { 1 } else { 0 }));
        model.updated_at = Set(Some(chrono::Utc::now().timestamp() as i32));

        model.update(db).await
    }

    // ==================== 私有方法 ====================

    /// 通用的查询构建器：应用状态筛选
    fn build_base_query(filter: MemberFilter) -> Select<Members> {
        let query = Members::find();

        match filter {
            MemberFilter::All => query,
            MemberFilter::Active => query.filter(members::Column::Status.eq("active")),
            MemberFilter::Inactive => query.filter(members::Column::Status.eq("inactive")),
            MemberFilter::Pending => query.filter(members::Column::Status.eq("pending")),
            MemberFilter::Unverified => query.filter(members::Column::Verified.eq(0)),
            MemberFilter::Unassigned => query.filter(members::Column::CollectorId.is_null()),
        }
    }

    // ==================== 家庭成员 ====================

    /// 添加家庭成员
    pub async fn add_family_member(
        db: &DatabaseConnection,
        member_id: i32,
        name: &str,
        relationship: &str,
        date_of_birth: Option<String>,
        gender: Option<String>,
    ) -> Result<i32, DbErr> {
        let now = chrono::Utc::now().timestamp() as i32;

        let record = family_members::ActiveModel {
            id: NotSet,
            member_id: Set(member_id),
            name: Set(name.to_string()),
            relationship: Set(relationship.to_string()),
            date_of_birth: Set(date_of_birth),
            gender: Set(gender),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };

        let result = record.insert(db).await?;
        Ok(result.id)
    }

    /// 获取指定会员的家庭成员
    pub async fn get_family_members(
        db: &DatabaseConnection,
        member_id: i32,
    ) -> Result<Vec<family_members::Model>, DbErr> {
        FamilyMembers::find()
            .filter(family_members::Column::MemberId.eq(member_id))
            .order_by_asc(family_members::Column::Id)
            .all(db)
            .await
    }

    /// 更新家庭成员
    pub async fn update_family_member(
        db: &DatabaseConnection,
        id: i32,
        name: Option<String>,
        relationship: Option<String>,
        date_of_birth: Option<Option<String>>,
        gender: Option<Option<String>>,
    ) -> Result<family_members::Model, DbErr> {
        let record = family_members::ActiveModel {
            id: Set(id),
            name: name.map_or(NotSet, Set),
            relationship: relationship.map_or(NotSet, Set),
            date_of_birth: date_of_birth.map_or(NotSet, Set),
            gender: gender.map_or(NotSet, Set),
            updated_at: Set(Some(chrono::Utc::now().timestamp() as i32)),
            ..Default::default()
        };

        record.update(db).await
    }

    /// 删除家庭成员
    pub async fn delete_family_member(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<DeleteResult, DbErr> {
        FamilyMembers::delete_by_id(id).exec(db).await
    }

    // ==================== 管理员备注 ====================

    /// 添加备注
    pub async fn add_note(
        db: &DatabaseConnection,
        member_id: i32,
        admin_id: Option<i32>,
        note: &str,
    ) -> Result<i32, DbErr> {
        let now = chrono::Utc::now().timestamp() as i32;

        let record = admin_notes::ActiveModel {
            id: NotSet,
            member_id: Set(member_id),
            admin_id: Set(admin_id),
            note: Set(note.to_string()),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };

        let result = record.insert(db).await?;
        Ok(result.id)
    }

    /// 获取指定会员的备注（按时间倒序）
    pub async fn get_notes(
        db: &DatabaseConnection,
        member_id: i32,
    ) -> Result<Vec<admin_notes::Model>, DbErr> {
        AdminNotes::find()
            .filter(admin_notes::Column::MemberId.eq(member_id))
            .order_by_desc(admin_notes::Column::CreatedAt)
            .all(db)
            .await
    }

    /// 更新备注内容
    pub async fn update_note(
        db: &DatabaseConnection,
        id: i32,
        note: &str,
    ) -> Result<admin_notes::Model, DbErr> {
        let record = admin_notes::ActiveModel {
            id: Set(id),
            note: Set(note.to_string()),
            updated_at: Set(Some(chrono::Utc::now().timestamp() as i32)),
            ..Default::default()
        };

        record.update(db).await
    }

    /// 删除备注
    pub async fn delete_note(db: &DatabaseConnection, id: i32) -> Result<DeleteResult, DbErr> {
        AdminNotes::delete_by_id(id).exec(db).await
    }

    // ==================== 注册申请 ====================

    /// 新建注册申请（初始状态 pending）
    pub async fn create_registration(
        db: &DatabaseConnection,
        member_id: i32,
    ) -> Result<i32, DbErr> {
        let now = chrono::Utc::now().timestamp() as i32;

        let record = registrations::ActiveModel {
            id: NotSet,
            member_id: Set(member_id),
            status: Set(Some("pending".to_string())),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };

        let result = record.insert(db).await?;
        Ok(result.id)
    }

    /// 获取注册申请，可按状态筛选
    pub async fn find_registrations(
        db: &DatabaseConnection,
        status: Option<String>,
    ) -> Result<Vec<registrations::Model>, DbErr> {
        let mut query = Registrations::find();

        if let Some(status) = status {
            query = query.filter(registrations::Column::Status.eq(status));
        }

        query
            .order_by_desc(registrations::Column::CreatedAt)
            .all(db)
            .await
    }

    /// 更新注册申请状态
    pub async fn update_registration_status(
        db: &DatabaseConnection,
        id: i32,
        status: &str,
    ) -> Result<registrations::Model, DbErr> {
        let record = registrations::ActiveModel {
            id: Set(id),
            status: Set(Some(status.to_string())),
            updated_at: Set(Some(chrono::Utc::now().timestamp() as i32)),
            ..Default::default()
        };

        record.update(db).await
    }

    /// 删除注册申请
    pub async fn delete_registration(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<DeleteResult, DbErr> {
        Registrations::delete_by_id(id).exec(db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repository::test_utils::setup_db;

    fn member(name: &str, number: &str) -> crate::database::dto::InsertMemberData {
        crate::database::dto::InsertMemberData {
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
            collector_id: None,
        }
    }

    #[tokio::test]
    async fn partial_update_keeps_unset_fields() {
        let db = setup_db().await;
        let mut data = member("Fatima Noor", "M100");
        data.email = Some("fatima@example.com".to_string());
        data.town = Some("Bradford".to_string());
        let id = MembersRepository::insert(&db, data).await.unwrap();

        let updates = UpdateMemberData {
            full_name: Some("Fatima N. Malik".to_string()),
            member_number: None,
            email: None,
            phone: None,
            address: None,
            town: Some(None), // 显式置空
            postcode: None,
            date_of_birth: None,
            gender: None,
            marital_status: None,
            membership_type: None,
            status: None,
            verified: None,
            collector_id: None,
        };
        MembersRepository::update(&db, id, updates).await.unwrap();

        let m = MembersRepository::find_by_id(&db, id).await.unwrap().unwrap();
        assert_eq!(m.full_name, "Fatima N. Malik");
        // 未提供的字段保持不变，显式 null 的字段被清空
        assert_eq!(m.email.as_deref(), Some("fatima@example.com"));
        assert_eq!(m.town, None);
        assert_eq!(m.member_number, "M100");
    }

    #[tokio::test]
    async fn filter_and_sort_members() {
        let db = setup_db().await;
        let mut a = member("Zafar", "M003");
        a.status = Some("inactive".to_string());
        MembersRepository::insert(&db, a).await.unwrap();
        MembersRepository::insert(&db, member("Aisha", "M001")).await.unwrap();
        MembersRepository::insert(&db, member("Bashir", "M002")).await.unwrap();

        let active = MembersRepository::find_all(
            &db,
            MemberFilter::Active,
            SortOption::Name,
            SortOrder::Asc,
        )
        .await
        .unwrap();
        let names: Vec<&str> = active.iter().map(|m| m.full_name.as_str()).collect();
        assert_eq!(names, vec!["Aisha", "Bashir"]);

        let by_number_desc = MembersRepository::find_all(
            &db,
            MemberFilter::All,
            SortOption::MemberNumber,
            SortOrder::Desc,
        )
        .await
        .unwrap();
        assert_eq!(by_number_desc[0].member_number, "M003");
    }

    #[tokio::test]
    async fn search_matches_name_or_number() {
        let db = setup_db().await;
        MembersRepository::insert(&db, member("Imran Qureshi", "M010")).await.unwrap();
        MembersRepository::insert(&db, member("Sana Iqbal", "M020")).await.unwrap();

        let by_name = MembersRepository::search(&db, "imran").await;
        // contains 在 SQLite 默认对 ASCII 大小写不敏感
        assert_eq!(by_name.unwrap().len(), 1);

        let by_number = MembersRepository::search(&db, "M02").await.unwrap();
        assert_eq!(by_number.len(), 1);
        assert_eq!(by_number[0].full_name, "Sana Iqbal");

        let blank = MembersRepository::search(&db, "   ").await.unwrap();
        assert!(blank.is_empty());
    }

    #[tokio::test]
    async fn delete_member_cascades_related_rows() {
        let db = setup_db().await;
        let id = MembersRepository::insert(&db, member("Parent", "M001")).await.unwrap();

        MembersRepository::add_family_member(&db, id, "Child", "son", None, None)
            .await
            .unwrap();
        MembersRepository::add_note(&db, id, None, "first visit").await.unwrap();
        MembersRepository::create_registration(&db, id).await.unwrap();

        MembersRepository::delete(&db, id).await.unwrap();

        assert!(MembersRepository::get_family_members(&db, id).await.unwrap().is_empty());
        assert!(MembersRepository::get_notes(&db, id).await.unwrap().is_empty());
        let regs = MembersRepository::find_registrations(&db, None).await.unwrap();
        assert!(regs.is_empty());
    }

    #[tokio::test]
    async fn registration_status_workflow() {
        let db = setup_db().await;
        let member_id = MembersRepository::insert(&db, member("New", "M001")).await.unwrap();
        let reg_id = MembersRepository::create_registration(&db, member_id).await.unwrap();

        let pending = MembersRepository::find_registrations(&db, Some("pending".to_string()))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);

        MembersRepository::update_registration_status(&db, reg_id, "approved")
            .await
            .unwrap();

        let pending = MembersRepository::find_registrations(&db, Some("pending".to_string()))
            .await
            .unwrap();
        assert!(pending.is_empty());
        let approved = MembersRepository::find_registrations(&db, Some("approved".to_string()))
            .await
            .unwrap();
        assert_eq!(approved.len(), 1);
    }
}
