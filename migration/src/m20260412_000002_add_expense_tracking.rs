//! 添加支出记录功能
//!
//! 此迁移包含两部分：
//! 1. 新建 expenses 表，用于记录组织支出
//! 2. settings 表添加 currency 字段，用于打印文档与财务汇总的货币符号

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. 创建 expenses 表
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::Amount).double().not_null())
                    .col(ColumnDef::new(Expenses::Category).text().not_null())
                    .col(ColumnDef::new(Expenses::Description).text().null())
                    .col(ColumnDef::new(Expenses::ExpenseDate).text().not_null())
                    .col(
                        ColumnDef::new(Expenses::Status)
                            .text()
                            .default("approved"),
                    )
                    .col(ColumnDef::new(Expenses::CreatedAt).integer().null())
                    .col(ColumnDef::new(Expenses::UpdatedAt).integer().null())
                    .to_owned(),
            )
            .await?;

        // 2. expenses 按日期查询的索引
        manager
            .create_index(
                Index::create()
                    .name("idx_expenses_expense_date")
                    .table(Expenses::Table)
                    .col(Expenses::ExpenseDate)
                    .to_owned(),
            )
            .await?;

        // 3. 给 settings 表添加 currency 列
        manager
            .alter_table(
                Table::alter()
                    .table(Settings::Table)
                    .add_column(ColumnDef::new(Settings::Currency).text().null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;

        // SQLite 不支持 DROP COLUMN 之前的版本已不在支持范围，
        // currency 列保留为空即可
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Expenses {
    Table,
    Id,
    Amount,
    Category,
    Description,
    ExpenseDate,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Settings {
    Table,
    Currency,
}
