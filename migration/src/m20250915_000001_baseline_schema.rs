use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseBackend, Statement, TransactionTrait};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // 单个事务内建表，保证 schema 原子性
        let txn = conn.begin().await?;

        create_core_tables(&txn).await?;
        create_member_related_tables(&txn).await?;
        create_support_tables(&txn).await?;
        create_indexes(&txn).await?;

        txn.commit().await?;

        println!("[MIGRATION] v1 baseline schema created successfully");
        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        Err(DbErr::Custom(
            "Baseline migration cannot be rolled back".to_string(),
        ))
    }
}

/// 创建核心表：collectors、members、settings、profiles
async fn create_core_tables<C>(conn: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    // 1. 收款员表
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "collectors" (
            "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "name" TEXT NOT NULL,
            "number" TEXT NOT NULL,
            "prefix" TEXT NOT NULL,
            "phone" TEXT,
            "email" TEXT,
            "active" INTEGER DEFAULT 1,
            "created_at" INTEGER DEFAULT (strftime('%s', 'now')),
            "updated_at" INTEGER DEFAULT (strftime('%s', 'now'))
        )"#,
    ))
    .await?;

    // 2. 会员表
    // collector_id 使用 ON DELETE SET NULL：删除收款员不会删除会员，
    // 会员成为未分配状态
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "members" (
            "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "full_name" TEXT NOT NULL,
            "member_number" TEXT NOT NULL,
            "email" TEXT,
            "phone" TEXT,
            "address" TEXT,
            "town" TEXT,
            "postcode" TEXT,
            "date_of_birth" TEXT,
            "gender" TEXT,
            "marital_status" TEXT,
            "membership_type" TEXT,
            "status" TEXT DEFAULT 'active',
            "verified" INTEGER DEFAULT 0,
            "collector_id" INTEGER,
            "created_at" INTEGER DEFAULT (strftime('%s', 'now')),
            "updated_at" INTEGER DEFAULT (strftime('%s', 'now')),
            FOREIGN KEY("collector_id") REFERENCES "collectors"("id") ON DELETE SET NULL
        )"#,
    ))
    .await?;

    // 3. 应用设置表（固定 id = 1）
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "settings" (
            "id" INTEGER PRIMARY KEY,
            "org_name" TEXT,
            "db_backup_path" TEXT
        )"#,
    ))
    .await?;

    // 4. 管理员档案表（备注与工单回复的署名来源）
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "profiles" (
            "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "display_name" TEXT,
            "email" TEXT,
            "created_at" INTEGER DEFAULT (strftime('%s', 'now')),
            "updated_at" INTEGER DEFAULT (strftime('%s', 'now'))
        )"#,
    ))
    .await?;

    Ok(())
}

/// 创建会员关联表（家庭成员、缴费、备注、注册申请）
async fn create_member_related_tables<C>(conn: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    // 家庭成员表
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "family_members" (
            "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "member_id" INTEGER NOT NULL,
            "name" TEXT NOT NULL,
            "relationship" TEXT NOT NULL,
            "date_of_birth" TEXT,
            "gender" TEXT,
            "created_at" INTEGER DEFAULT (strftime('%s', 'now')),
            "updated_at" INTEGER DEFAULT (strftime('%s', 'now')),
            FOREIGN KEY("member_id") REFERENCES "members"("id") ON DELETE CASCADE
        )"#,
    ))
    .await?;

    // 缴费记录表
    // member_id / collector_id 使用 SET NULL：账目记录在会员或收款员
    // 被删除后仍然保留
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "payments" (
            "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "member_id" INTEGER,
            "collector_id" INTEGER,
            "amount" REAL NOT NULL,
            "payment_type" TEXT NOT NULL,
            "payment_date" TEXT NOT NULL,
            "status" TEXT DEFAULT 'completed',
            "notes" TEXT,
            "created_at" INTEGER DEFAULT (strftime('%s', 'now')),
            "updated_at" INTEGER DEFAULT (strftime('%s', 'now')),
            FOREIGN KEY("member_id") REFERENCES "members"("id") ON DELETE SET NULL,
            FOREIGN KEY("collector_id") REFERENCES "collectors"("id") ON DELETE SET NULL
        )"#,
    ))
    .await?;

    // 管理员备注表
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "admin_notes" (
            "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "member_id" INTEGER NOT NULL,
            "admin_id" INTEGER,
            "note" TEXT NOT NULL,
            "created_at" INTEGER DEFAULT (strftime('%s', 'now')),
            "updated_at" INTEGER DEFAULT (strftime('%s', 'now')),
            FOREIGN KEY("member_id") REFERENCES "members"("id") ON DELETE CASCADE,
            FOREIGN KEY("admin_id") REFERENCES "profiles"("id") ON DELETE SET NULL
        )"#,
    ))
    .await?;

    // 注册申请表
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "registrations" (
            "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "member_id" INTEGER NOT NULL,
            "status" TEXT DEFAULT 'pending',
            "created_at" INTEGER DEFAULT (strftime('%s', 'now')),
            "updated_at" INTEGER DEFAULT (strftime('%s', 'now')),
            FOREIGN KEY("member_id") REFERENCES "members"("id") ON DELETE CASCADE
        )"#,
    ))
    .await?;

    Ok(())
}

/// 创建工单相关表
async fn create_support_tables<C>(conn: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    // 工单表
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "support_tickets" (
            "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "member_id" INTEGER,
            "subject" TEXT NOT NULL,
            "description" TEXT NOT NULL,
            "status" TEXT DEFAULT 'open',
            "priority" TEXT DEFAULT 'normal',
            "created_at" INTEGER DEFAULT (strftime('%s', 'now')),
            "updated_at" INTEGER DEFAULT (strftime('%s', 'now')),
            FOREIGN KEY("member_id") REFERENCES "members"("id") ON DELETE CASCADE
        )"#,
    ))
    .await?;

    // 工单回复表
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "ticket_responses" (
            "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "ticket_id" INTEGER NOT NULL,
            "responder_id" INTEGER,
            "response" TEXT NOT NULL,
            "created_at" INTEGER DEFAULT (strftime('%s', 'now')),
            "updated_at" INTEGER DEFAULT (strftime('%s', 'now')),
            FOREIGN KEY("ticket_id") REFERENCES "support_tickets"("id") ON DELETE CASCADE,
            FOREIGN KEY("responder_id") REFERENCES "profiles"("id") ON DELETE SET NULL
        )"#,
    ))
    .await?;

    Ok(())
}

/// 创建索引
async fn create_indexes<C>(conn: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    // 唯一索引：会员编号全局唯一，收款员编号在前缀内唯一
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE UNIQUE INDEX "idx_members_member_number" ON "members" ("member_number")"#,
    ))
    .await?;

    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE UNIQUE INDEX "idx_collectors_prefix_number" ON "collectors" ("prefix", "number")"#,
    ))
    .await?;

    let indexes = [
        ("idx_collectors_active", "collectors", "active"),
        ("idx_members_collector_id", "members", "collector_id"),
        ("idx_members_status", "members", "status"),
        ("idx_members_full_name", "members", "full_name"),
        ("idx_family_members_member_id", "family_members", "member_id"),
        ("idx_payments_member_id", "payments", "member_id"),
        ("idx_payments_collector_id", "payments", "collector_id"),
        ("idx_payments_payment_date", "payments", "payment_date"),
        ("idx_admin_notes_member_id", "admin_notes", "member_id"),
        ("idx_registrations_member_id", "registrations", "member_id"),
        ("idx_registrations_status", "registrations", "status"),
        ("idx_support_tickets_member_id", "support_tickets", "member_id"),
        ("idx_support_tickets_status", "support_tickets", "status"),
        (
            "idx_ticket_responses_ticket_id",
            "ticket_responses",
            "ticket_id",
        ),
    ];

    for (index_name, table_name, column_name) in &indexes {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            format!(
                r#"CREATE INDEX IF NOT EXISTS "{}" ON "{}" ("{}")"#,
                index_name, table_name, column_name
            ),
        ))
        .await?;
    }

    Ok(())
}
