//! 财务数据仓库
//!
//! 缴费（payments）与支出（expenses）两类账目记录，以及财务汇总。
//! 账目行在会员或收款员被删除后仍然保留（外键置空）。

use crate::database::dto::{
    InsertExpenseData, InsertPaymentData, UpdateExpenseData, UpdatePaymentData,
};
use crate::entity::prelude::*;
use crate::entity::{expenses, payments};
use sea_orm::*;
use serde::{Deserialize, Serialize};

/// 缴费记录筛选
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentFilter {
    pub member_id: Option<i32>,
    pub collector_id: Option<i32>,
    pub status: Option<String>,
}

/// 财务汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceSummary {
    pub total_payments: f64,
    pub payment_count: u64,
    pub total_expenses: f64,
    pub expense_count: u64,
    pub net_balance: f64,
}

/// 财务数据仓库
pub struct FinanceRepository;

impl FinanceRepository {
    // ==================== 缴费记录 ====================

    /// 录入缴费记录
    pub async fn record_payment(
        db: &DatabaseConnection,
        data: InsertPaymentData,
    ) -> Result<i32, DbErr> {
        let now = chrono::Utc::now().timestamp() as i32;

        let payment = payments::ActiveModel {
            id: NotSet,
            member_id: Set(data.member_id),
            collector_id: Set(data.collector_id),
            amount: Set(data.amount),
            payment_type: Set(data.payment_type),
            payment_date: Set(data.payment_date),
            status: Set(Some(data.status.unwrap_or_else(|| "completed".to_string()))),
            notes: Set(data.notes),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };

        let result = payment.insert(db).await?;
        Ok(result.id)
    }

    /// 更新缴费记录
    pub async fn update_payment(
        db: &DatabaseConnection,
        id: i32,
        updates: UpdatePaymentData,
    ) -> Result<payments::Model, DbErr> {
        let payment = payments::ActiveModel {
            id: Set(id),
            member_id: updates.member_id.map_or(NotSet, Set),
            collector_id: updates.collector_id.map_or(NotSet, Set),
            amount: updates.amount.map_or(NotSet, Set),
            payment_type: updates.payment_type.map_or(NotSet, Set),
            payment_date: updates.payment_date.map_or(NotSet, Set),
            status: updates.status.map_or(NotSet, Set),
            notes: updates.notes.map_or(NotSet, Set),
            updated_at: Set(Some(chrono::Utc::now().timestamp() as i32)),
            ..Default::default()
        };

        payment.update(db).await
    }

    /// 根据 ID 查询缴费记录
    pub async fn find_payment_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<payments::Model>, DbErr> {
        Payments::find_by_id(id).one(db).await
    }

    /// 查询缴费记录（按日期倒序），支持按会员、收款员和状态筛选
    pub async fn find_payments(
        db: &DatabaseConnection,
        filter: PaymentFilter,
    ) -> Result<Vec<payments::Model>, DbErr> {
        let mut query = Payments::find();

        if let Some(member_id) = filter.member_id {
            query = query.filter(payments::Column::MemberId.eq(member_id));
        }
        if let Some(collector_id) = filter.collector_id {
            query = query.filter(payments::Column::CollectorId.eq(collector_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(payments::Column::Status.eq(status));
        }

        query
            .order_by_desc(payments::Column::PaymentDate)
            .order_by_desc(payments::Column::Id)
            .all(db)
            .await
    }

    /// 删除缴费记录
    pub async fn delete_payment(db: &DatabaseConnection, id: i32) -> Result<DeleteResult, DbErr> {
        Payments::delete_by_id(id).exec(db).await
    }

    // ==================== 支出记录 ====================

    /// 录入支出记录
    pub async fn record_expense(
        db: &DatabaseConnection,
        data: InsertExpenseData,
    ) -> Result<i32, DbErr> {
        let now = chrono::Utc::now().timestamp() as i32;

        let expense = expenses::ActiveModel {
            id: NotSet,
            amount: Set(data.amount),
            category: Set(data.category),
            description: Set(data.description),
            expense_date: Set(data.expense_date),
            status: Set(Some(data.status.unwrap_or_else(|| "approved".to_string()))),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };

        let result = expense.insert(db).await?;
        Ok(result.id)
    }

    /// 更新支出记录
    pub async fn update_expense(
        db: &DatabaseConnection,
        id: i32,
        updates: UpdateExpenseData,
    ) -> Result<expenses::Model, DbErr> {
        let expense = expenses::ActiveModel {
            id: Set(id),
            amount: updates.amount.map_or(NotSet, Set),
            category: updates.category.map_or(NotSet, Set),
            description: updates.description.map_or(NotSet, Set),
            expense_date: updates.expense_date.map_or(NotSet, Set),
            status: updates.status.map_or(NotSet, Set),
            updated_at: Set(Some(chrono::Utc::now().timestamp() as i32)),
            ..Default::default()
        };

        expense.update(db).await
    }

    /// 查询支出记录（按日期倒序），支持按类别筛选
    pub async fn find_expenses(
        db: &DatabaseConnection,
        category: Option<String>,
    ) -> Result<Vec<expenses::Model>, DbErr> {
        let mut query = Expenses::find();

        if let Some(category) = category {
            query = query.filter(expenses::Column::Category.eq(category));
        }

        query
            .order_by_desc(expenses::Column::ExpenseDate)
            .order_by_desc(expenses::Column::Id)
            .all(db)
            .await
    }

    /// 删除支出记录
    pub async fn delete_expense(db: &DatabaseConnection, id: i32) -> Result<DeleteResult, DbErr> {
        Expenses::delete_by_id(id).exec(db).await
    }

    // ==================== 财务汇总 ====================

    /// 计算财务汇总，可选按 ISO 日期范围（闭区间）过滤
    ///
    /// 桌面端数据量有限，直接取回记录在内存中累加
    pub async fn get_summary(
        db: &DatabaseConnection,
        from_date: Option<String>,
        to_date: Option<String>,
    ) -> Result<FinanceSummary, DbErr> {
        let mut payment_query = Payments::find();
        let mut expense_query = Expenses::find();

        if let Some(from) = &from_date {
            payment_query = payment_query.filter(payments::Column::PaymentDate.gte(from.clone()));
            expense_query = expense_query.filter(expenses::Column::ExpenseDate.gte(from.clone()));
        }
        if let Some(to) = &to_date {
            payment_query = payment_query.filter(payments::Column::PaymentDate.lte(to.clone()));
            expense_query = expense_query.filter(expenses::Column::ExpenseDate.lte(to.clone()));
        }

        let payments = payment_query.all(db).await?;
        let expenses = expense_query.all(db).await?;

        let total_payments: f64 = payments.iter().map(|p| p.amount).sum();
        let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();

        Ok(FinanceSummary {
            total_payments,
            payment_count: payments.len() as u64,
            total_expenses,
            expense_count: expenses.len() as u64,
            net_balance: total_payments - total_expenses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::dto::InsertMemberData;
    use crate::database::repository::members_repository::MembersRepository;
    use crate::database::repository::test_utils::setup_db;

    fn payment(amount: f64, date: &str, member_id: Option<i32>) -> InsertPaymentData {
        InsertPaymentData {
            member_id,
            collector_id: None,
            amount,
            payment_type: "membership".to_string(),
            payment_date: date.to_string(),
            status: None,
            notes: None,
        }
    }

    fn expense(amount: f64, date: &str, category: &str) -> InsertExpenseData {
        InsertExpenseData {
            amount,
            category: category.to_string(),
            description: None,
            expense_date: date.to_string(),
            status: None,
        }
    }

    #[tokio::test]
    async fn summary_with_date_range() {
        let db = setup_db().await;
        FinanceRepository::record_payment(&db, payment(10.0, "2026-01-15", None))
            .await
            .unwrap();
        FinanceRepository::record_payment(&db, payment(20.0, "2026-02-15", None))
            .await
            .unwrap();
        FinanceRepository::record_expense(&db, expense(5.0, "2026-02-01", "hall hire"))
            .await
            .unwrap();
        FinanceRepository::record_expense(&db, expense(7.5, "2026-03-01", "printing"))
            .await
            .unwrap();

        let all = FinanceRepository::get_summary(&db, None, None).await.unwrap();
        assert_eq!(all.payment_count, 2);
        assert_eq!(all.expense_count, 2);
        assert!((all.total_payments - 30.0).abs() < f64::EPSILON);
        assert!((all.net_balance - 17.5).abs() < f64::EPSILON);

        // 闭区间：只有二月的记录
        let feb = FinanceRepository::get_summary(
            &db,
            Some("2026-02-01".to_string()),
            Some("2026-02-28".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(feb.payment_count, 1);
        assert_eq!(feb.expense_count, 1);
        assert!((feb.net_balance - 15.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn payments_survive_member_deletion() {
        let db = setup_db().await;
        let member_id = MembersRepository::insert(
            &db,
            InsertMemberData {
                full_name: "Left".to_string(),
                member_number: "M001".to_string(),
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
            },
        )
        .await
        .unwrap();

        let payment_id =
            FinanceRepository::record_payment(&db, payment(12.0, "2026-05-01", Some(member_id)))
                .await
                .unwrap();

        MembersRepository::delete(&db, member_id).await.unwrap();

        // 账目保留，member_id 被外键置空
        let p = FinanceRepository::find_payment_by_id(&db, payment_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.member_id, None);
        assert!((p.amount - 12.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn find_payments_applies_filters() {
        let db = setup_db().await;
        FinanceRepository::record_payment(&db, payment(10.0, "2026-01-01", None))
            .await
            .unwrap();
        let mut failed = payment(99.0, "2026-01-02", None);
        failed.status = Some("failed".to_string());
        FinanceRepository::record_payment(&db, failed).await.unwrap();

        let completed = FinanceRepository::find_payments(
            &db,
            PaymentFilter {
                status: Some("completed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(completed.len(), 1);
        assert!((completed[0].amount - 10.0).abs() < f64::EPSILON);

        // 日期倒序
        let all = FinanceRepository::find_payments(&db, PaymentFilter::default())
            .await
            .unwrap();
        assert_eq!(all[0].payment_date, "2026-01-02");
    }
}
