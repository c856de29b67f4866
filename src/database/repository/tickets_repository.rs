//! 工单数据仓库
//!
//! 工单与回复是一对多关系，删除工单时回复级联删除。

use crate::database::dto::{InsertTicketData, UpdateTicketData};
use crate::entity::prelude::*;
use crate::entity::{support_tickets, ticket_responses};
use sea_orm::*;

/// 工单数据仓库
pub struct TicketsRepository;

impl TicketsRepository {
    // ==================== 工单 CRUD 操作 ====================

    /// 新建工单
    pub async fn create(db: &DatabaseConnection, data: InsertTicketData) -> Result<i32, DbErr> {
        let now = chrono::Utc::now().timestamp() as i32;

        let ticket = support_tickets::ActiveModel {
            id: NotSet,
            member_id: Set(data.member_id),
            subject: Set(data.subject),
            description: Set(data.description),
            status: Set(Some(data.status.unwrap_or_else(|| "open".to_string()))),
            priority: Set(Some(data.priority.unwrap_or_else(|| "normal".to_string()))),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };

        let result = ticket.insert(db).await?;
        Ok(result.id)
    }

    /// 更新工单
    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        updates: UpdateTicketData,
    ) -> Result<support_tickets::Model, DbErr> {
        let ticket = support_tickets::ActiveModel {
            id: Set(id),
            subject: updates.subject.map_or(NotSet, Set),
            description: updates.description.map_or(NotSet, Set),
            status: updates.status.map_or(NotSet, Set),
            priority: updates.priority.map_or(NotSet, Set),
            updated_at: Set(Some(chrono::Utc::now().timestamp() as i32)),
            ..Default::default()
        };

        ticket.update(db).await
    }

    /// 根据 ID 查询工单
    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<support_tickets::Model>, DbErr> {
        SupportTickets::find_by_id(id).one(db).await
    }

    /// 查询工单（最新在前），支持按状态和会员筛选
    pub async fn find_all(
        db: &DatabaseConnection,
        status: Option<String>,
        member_id: Option<i32>,
    ) -> Result<Vec<support_tickets::Model>, DbErr> {
        let mut query = SupportTickets::find();

        if let Some(status) = status {
            query = query.filter(support_tickets::Column::Status.eq(status));
        }
        if let Some(member_id) = member_id {
            query = query.filter(support_tickets::Column::MemberId.eq(member_id));
        }

        query
            .order_by_desc(support_tickets::Column::CreatedAt)
            .order_by_desc(support_tickets::Column::Id)
            .all(db)
            .await
    }

    /// 删除工单（回复级联删除）
    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<DeleteResult, DbErr> {
        SupportTickets::delete_by_id(id).exec(db).await
    }

    /// 获取未关闭工单数量
    pub async fn count_open(db: &DatabaseConnection) -> Result<u64, DbErr> {
        SupportTickets::find()
            .filter(support_tickets::Column::Status.ne("closed"))
            .count(db)
            .await
    }

    // ==================== 工单回复 ====================

    /// 添加工单回复
    pub async fn add_response(
        db: &DatabaseConnection,
        ticket_id: i32,
        responder_id: Option<i32>,
        response: &str,
    ) -> Result<i32, DbErr> {
        let now = chrono::Utc::now().timestamp() as i32;

        let record = ticket_responses::ActiveModel {
            id: NotSet,
            ticket_id: Set(ticket_id),
            responder_id: Set(responder_id),
            response: Set(response.to_string()),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };

        let result = record.insert(db).await?;
        Ok(result.id)
    }

    /// 获取指定工单的回复（按时间正序）
    pub async fn get_responses(
        db: &DatabaseConnection,
        ticket_id: i32,
    ) -> Result<Vec<ticket_responses::Model>, DbErr> {
        TicketResponses::find()
            .filter(ticket_responses::Column::TicketId.eq(ticket_id))
            .order_by_asc(ticket_responses::Column::Id)
            .all(db)
            .await
    }

    /// 删除工单回复
    pub async fn delete_response(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<DeleteResult, DbErr> {
        TicketResponses::delete_by_id(id).exec(db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repository::test_utils::setup_db;

    fn ticket(subject: &str) -> InsertTicketData {
        InsertTicketData {
            member_id: None,
            subject: subject.to_string(),
            description: "details".to_string(),
            status: None,
            priority: None,
        }
    }

    #[tokio::test]
    async fn status_filter_and_open_count() {
        let db = setup_db().await;
        let a = TicketsRepository::create(&db, ticket("Address change")).await.unwrap();
        TicketsRepository::create(&db, ticket("Card lost")).await.unwrap();

        assert_eq!(TicketsRepository::count_open(&db).await.unwrap(), 2);

        TicketsRepository::update(
            &db,
            a,
            UpdateTicketData {
                subject: None,
                description: None,
                status: Some(Some("closed".to_string())),
                priority: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(TicketsRepository::count_open(&db).await.unwrap(), 1);

        let open = TicketsRepository::find_all(&db, Some("open".to_string()), None)
            .await
            .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].subject, "Card lost");
    }

    #[tokio::test]
    async fn responses_cascade_with_ticket() {
        let db = setup_db().await;
        let id = TicketsRepository::create(&db, ticket("Question")).await.unwrap();

        TicketsRepository::add_response(&db, id, None, "first reply").await.unwrap();
        TicketsRepository::add_response(&db, id, None, "second reply").await.unwrap();

        let responses = TicketsRepository::get_responses(&db, id).await.unwrap();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].response, "first reply");

        TicketsRepository::delete(&db, id).await.unwrap();
        assert!(TicketsRepository::get_responses(&db, id).await.unwrap().is_empty());
    }
}
