use sea_orm::DatabaseConnection;
use tauri::{AppHandle, Manager, State};

use crate::database::dto::{
    InsertCollectorData, InsertExpenseData, InsertMemberData, InsertPaymentData, InsertTicketData,
    UpdateCollectorData, UpdateExpenseData, UpdateMemberData, UpdatePaymentData, UpdateTicketData,
};
use crate::database::repository::{
    collectors_repository::{CollectorWithMembers, CollectorsRepository},
    finance_repository::{FinanceRepository, FinanceSummary, PaymentFilter},
    members_repository::{MemberFilter, MembersRepository, SortOption, SortOrder},
    settings_repository::SettingsRepository,
    tickets_repository::TicketsRepository,
};
use crate::entity::{
    admin_notes, collectors, expenses, family_members, members, payments, profiles, registrations,
    settings, support_tickets, ticket_responses,
};

// ==================== 收款员相关 ====================

/// 新建收款员
#[tauri::command]
pub async fn insert_collector(
    db: State<'_, DatabaseConnection>,
    data: InsertCollectorData,
) -> Result<i32, String> {
    CollectorsRepository::insert(&db, data)
        .await
        .map_err(|e| format!("新建收款员失败: {}", e))
}

/// 更新收款员数据
#[tauri::command]
pub async fn update_collector(
    db: State<'_, DatabaseConnection>,
    id: i32,
    updates: UpdateCollectorData,
) -> Result<collectors::Model, String> {
    CollectorsRepository::update(&db, id, updates)
        .await
        .map_err(|e| format!("更新收款员失败: {}", e))
}

/// 根据 ID 查询收款员
#[tauri::command]
pub async fn find_collector_by_id(
    db: State<'_, DatabaseConnection>,
    id: i32,
) -> Result<Option<collectors::Model>, String> {
    CollectorsRepository::find_by_id(&db, id)
        .await
        .map_err(|e| format!("查询收款员失败: {}", e))
}

/// 获取所有收款员
#[tauri::command]
pub async fn find_all_collectors(
    db: State<'_, DatabaseConnection>,
) -> Result<Vec<collectors::Model>, String> {
    CollectorsRepository::find_all(&db)
        .await
        .map_err(|e| format!("获取收款员列表失败: {}", e))
}

/// 获取所有收款员及其名下会员，支持搜索词过滤
#[tauri::command]
pub async fn find_collectors_with_members(
    db: State<'_, DatabaseConnection>,
    search: Option<String>,
) -> Result<Vec<CollectorWithMembers>, String> {
    CollectorsRepository::find_with_members(&db, search)
        .await
        .map_err(|e| format!("获取收款员及会员失败: {}", e))
}

/// 设置收款员在职状态
#[tauri::command]
pub async fn set_collector_active(
    db: State<'_, DatabaseConnection>,
    id: i32,
    active: bool,
) -> Result<collectors::Model, String> {
    CollectorsRepository::set_active(&db, id, active)
        .await
        .map_err(|e| {
            if active {
                format!("启用收款员失败: {}", e)
            } else {
                format!("停用收款员失败: {}", e)
            }
        })
}

/// 删除收款员（名下会员变为未分配）
#[tauri::command]
pub async fn delete_collector(db: State<'_, DatabaseConnection>, id: i32) -> Result<u64, String> {
    CollectorsRepository::delete(&db, id)
        .await
        .map(|result| result.rows_affected)
        .map_err(|e| format!("删除收款员失败: {}", e))
}

/// 将收款员名下所有会员转移给另一位收款员
#[tauri::command]
pub async fn move_collector_members(
    db: State<'_, DatabaseConnection>,
    from_id: i32,
    to_id: i32,
) -> Result<u64, String> {
    CollectorsRepository::move_members(&db, from_id, to_id)
        .await
        .map_err(|e| format!("转移会员失败: {}", e))
}

/// 获取收款员总数
#[tauri::command]
pub async fn count_collectors(db: State<'_, DatabaseConnection>) -> Result<u64, String> {
    CollectorsRepository::count(&db)
        .await
        .map_err(|e| format!("获取收款员总数失败: {}", e))
}

/// 检查收款员编号是否已存在
#[tauri::command]
pub async fn collector_exists_by_number(
    db: State<'_, DatabaseConnection>,
    prefix: String,
    number: String,
) -> Result<bool, String> {
    CollectorsRepository::exists_number(&db, &prefix, &number)
        .await
        .map_err(|e| format!("检查收款员编号失败: {}", e))
}

// ==================== 会员相关 ====================

/// 新建会员
#[tauri::command]
pub async fn insert_member(
    db: State<'_, DatabaseConnection>,
    data: InsertMemberData,
) -> Result<i32, String> {
    MembersRepository::insert(&db, data)
        .await
        .map_err(|e| format!("新建会员失败: {}", e))
}

/// 更新会员数据
#[tauri::command]
pub async fn update_member(
    db: State<'_, DatabaseConnection>,
    id: i32,
    updates: UpdateMemberData,
) -> Result<members::Model, String> {
    MembersRepository::update(&db, id, updates)
        .await
        .map_err(|e| format!("更新会员失败: {}", e))
}

/// 根据 ID 查询会员
#[tauri::command]
pub async fn find_member_by_id(
    db: State<'_, DatabaseConnection>,
    id: i32,
) -> Result<Option<members::Model>, String> {
    MembersRepository::find_by_id(&db, id)
        .await
        .map_err(|e| format!("查询会员失败: {}", e))
}

/// 获取所有会员，支持筛选和排序
#[tauri::command]
pub async fn find_all_members(
    db: State<'_, DatabaseConnection>,
    filter: MemberFilter,
    sort_option: SortOption,
    sort_order: SortOrder,
) -> Result<Vec<members::Model>, String> {
    MembersRepository::find_all(&db, filter, sort_option, sort_order)
        .await
        .map_err(|e| format!("获取会员列表失败: {}", e))
}

/// 按姓名或会员编号搜索会员
#[tauri::command]
pub async fn search_members(
    db: State<'_, DatabaseConnection>,
    term: String,
) -> Result<Vec<members::Model>, String> {
    MembersRepository::search(&db, &term)
        .await
        .map_err(|e| format!("搜索会员失败: {}", e))
}

/// 删除会员
#[tauri::command]
pub async fn delete_member(db: State<'_, DatabaseConnection>, id: i32) -> Result<u64, String> {
    MembersRepository::delete(&db, id)
        .await
        .map(|result| result.rows_affected)
        .map_err(|e| format!("删除会员失败: {}", e))
}

/// 批量删除会员
#[tauri::command]
pub async fn delete_members_batch(
    db: State<'_, DatabaseConnection>,
    ids: Vec<i32>,
) -> Result<u64, String> {
    MembersRepository::delete_many(&db, ids)
        .await
        .map(|result| result.rows_affected)
        .map_err(|e| format!("批量删除会员失败: {}", e))
}

/// 获取会员总数
#[tauri::command]
pub async fn count_members(db: State<'_, DatabaseConnection>) -> Result<u64, String> {
    MembersRepository::count(&db)
        .await
        .map_err(|e| format!("获取会员总数失败: {}", e))
}

/// 检查会员编号是否已存在
#[tauri::command]
pub async fn member_exists_by_number(
    db: State<'_, DatabaseConnection>,
    number: String,
) -> Result<bool, String> {
    MembersRepository::exists_number(&db, &number)
        .await
        .map_err(|e| format!("检查会员编号失败: {}", e))
}

/// 设置会员核实状态
#[tauri::command]
pub async fn set_member_verified(
    db: State<'_, DatabaseConnection>,
    id: i32,
    verified: bool,
) -> Result<members::Model, String> {
    MembersRepository::set_verified(&db, id, verified)
        .await
        .map_err(|e| format!("设置会员核实状态失败: {}", e))
}

// ==================== 家庭成员相关 ====================

/// 添加家庭成员
#[tauri::command]
pub async fn add_family_member(
    db: State<'_, DatabaseConnection>,
    member_id: i32,
    name: String,
    relationship: String,
    date_of_birth: Option<String>,
    gender: Option<String>,
) -> Result<i32, String> {
    MembersRepository::add_family_member(&db, member_id, &name, &relationship, date_of_birth, gender)
        .await
        .map_err(|e| format!("添加家庭成员失败: {}", e))
}

/// 获取指定会员的家庭成员
#[tauri::command]
pub async fn get_family_members(
    db: State<'_, DatabaseConnection>,
    member_id: i32,
) -> Result<Vec<family_members::Model>, String> {
    MembersRepository::get_family_members(&db, member_id)
        .await
        .map_err(|e| format!("获取家庭成员失败: {}", e))
}

/// 更新家庭成员
#[tauri::command]
pub async fn update_family_member(
    db: State<'_, DatabaseConnection>,
    id: i32,
    name: Option<String>,
    relationship: Option<String>,
    date_of_birth: Option<Option<String>>,
    gender: Option<Option<String>>,
) -> Result<family_members::Model, String> {
    MembersRepository::update_family_member(&db, id, name, relationship, date_of_birth, gender)
        .await
        .map_err(|e| format!("更新家庭成员失败: {}", e))
}

/// 删除家庭成员
#[tauri::command]
pub async fn delete_family_member(
    db: State<'_, DatabaseConnection>,
    id: i32,
) -> Result<u64, String> {
    MembersRepository::delete_family_member(&db, id)
        .await
        .map(|result| result.rows_affected)
        .map_err(|e| format!("删除家庭成员失败: {}", e))
}

// ==================== 管理员备注相关 ====================

/// 添加会员备注
#[tauri::command]
pub async fn add_admin_note(
    db: State<'_, DatabaseConnection>,
    member_id: i32,
    admin_id: Option<i32>,
    note: String,
) -> Result<i32, String> {
    MembersRepository::add_note(&db, member_id, admin_id, &note)
        .await
        .map_err(|e| format!("添加备注失败: {}", e))
}

/// 获取指定会员的备注
#[tauri::command]
pub async fn get_member_notes(
    db: State<'_, DatabaseConnection>,
    member_id: i32,
) -> Result<Vec<admin_notes::Model>, String> {
    MembersRepository::get_notes(&db, member_id)
        .await
        .map_err(|e| format!("获取备注失败: {}", e))
}

/// 更新备注内容
#[tauri::command]
pub async fn update_admin_note(
    db: State<'_, DatabaseConnection>,
    id: i32,
    note: String,
) -> Result<admin_notes::Model, String> {
    MembersRepository::update_note(&db, id, &note)
        .await
        .map_err(|e| format!("更新备注失败: {}", e))
}

/// 删除备注
#[tauri::command]
pub async fn delete_admin_note(db: State<'_, DatabaseConnection>, id: i32) -> Result<u64, String> {
    MembersRepository::delete_note(&db, id)
        .await
        .map(|result| result.rows_affected)
        .map_err(|e| format!("删除备注失败: {}", e))
}

// ==================== 注册申请相关 ====================

/// 新建注册申请
#[tauri::command]
pub async fn create_registration(
    db: State<'_, DatabaseConnection>,
    member_id: i32,
) -> Result<i32, String> {
    MembersRepository::create_registration(&db, member_id)
        .await
        .map_err(|e| format!("新建注册申请失败: {}", e))
}

/// 获取注册申请，可按状态筛选
#[tauri::command]
pub async fn find_registrations(
    db: State<'_, DatabaseConnection>,
    status: Option<String>,
) -> Result<Vec<registrations::Model>, String> {
    MembersRepository::find_registrations(&db, status)
        .await
        .map_err(|e| format!("获取注册申请失败: {}", e))
}

/// 更新注册申请状态
#[tauri::command]
pub async fn update_registration_status(
    db: State<'_, DatabaseConnection>,
    id: i32,
    status: String,
) -> Result<registrations::Model, String> {
    MembersRepository::update_registration_status(&db, id, &status)
        .await
        .map_err(|e| format!("更新注册申请状态失败: {}", e))
}

/// 删除注册申请
#[tauri::command]
pub async fn delete_registration(
    db: State<'_, DatabaseConnection>,
    id: i32,
) -> Result<u64, String> {
    MembersRepository::delete_registration(&db, id)
        .await
        .map(|result| result.rows_affected)
        .map_err(|e| format!("删除注册申请失败: {}", e))
}

// ==================== 财务相关 ====================

/// 录入缴费记录
#[tauri::command]
pub async fn record_payment(
    db: State<'_, DatabaseConnection>,
    data: InsertPaymentData,
) -> Result<i32, String> {
    FinanceRepository::record_payment(&db, data)
        .await
        .map_err(|e| format!("录入缴费记录失败: {}", e))
}

/// 更新缴费记录
#[tauri::command]
pub async fn update_payment(
    db: State<'_, DatabaseConnection>,
    id: i32,
    updates: UpdatePaymentData,
) -> Result<payments::Model, String> {
    FinanceRepository::update_payment(&db, id, updates)
        .await
        .map_err(|e| format!("更新缴费记录失败: {}", e))
}

/// 根据 ID 查询缴费记录
#[tauri::command]
pub async fn find_payment_by_id(
    db: State<'_, DatabaseConnection>,
    id: i32,
) -> Result<Option<payments::Model>, String> {
    FinanceRepository::find_payment_by_id(&db, id)
        .await
        .map_err(|e| format!("查询缴费记录失败: {}", e))
}

/// 查询缴费记录，支持按会员、收款员和状态筛选
#[tauri::command]
pub async fn find_payments(
    db: State<'_, DatabaseConnection>,
    filter: PaymentFilter,
) -> Result<Vec<payments::Model>, String> {
    FinanceRepository::find_payments(&db, filter)
        .await
        .map_err(|e| format!("查询缴费记录失败: {}", e))
}

/// 获取指定会员的缴费记录
#[tauri::command]
pub async fn get_member_payments(
    db: State<'_, DatabaseConnection>,
    member_id: i32,
) -> Result<Vec<payments::Model>, String> {
    FinanceRepository::find_payments(
        &db,
        PaymentFilter {
            member_id: Some(member_id),
            ..Default::default()
        },
    )
    .await
    .map_err(|e| format!("获取会员缴费记录失败: {}", e))
}

/// 获取指定收款员经手的缴费记录
#[tauri::command]
pub async fn get_collector_payments(
    db: State<'_, DatabaseConnection>,
    collector_id: i32,
) -> Result<Vec<payments::Model>, String> {
    FinanceRepository::find_payments(
        &db,
        PaymentFilter {
            collector_id: Some(collector_id),
            ..Default::default()
        },
    )
    .await
    .map_err(|e| format!("获取收款员缴费记录失败: {}", e))
}

/// 删除缴费记录
#[tauri::command]
pub async fn delete_payment(db: State<'_, DatabaseConnection>, id: i32) -> Result<u64, String> {
    FinanceRepository::delete_payment(&db, id)
        .await
        .map(|result| result.rows_affected)
        .map_err(|e| format!("删除缴费记录失败: {}", e))
}

/// 录入支出记录
#[tauri::command]
pub async fn record_expense(
    db: State<'_, DatabaseConnection>,
    data: InsertExpenseData,
) -> Result<i32, String> {
    FinanceRepository::record_expense(&db, data)
        .await
        .map_err(|e| format!("录入支出记录失败: {}", e))
}

/// 更新支出记录
#[tauri::command]
pub async fn update_expense(
    db: State<'_, DatabaseConnection>,
    id: i32,
    updates: UpdateExpenseData,
) -> Result<expenses::Model, String> {
    FinanceRepository::update_expense(&db, id, updates)
        .await
        .map_err(|e| format!("更新支出记录失败: {}", e))
}

/// 查询支出记录，可按类别筛选
#[tauri::command]
pub async fn find_expenses(
    db: State<'_, DatabaseConnection>,
    category: Option<String>,
) -> Result<Vec<expenses::Model>, String> {
    FinanceRepository::find_expenses(&db, category)
        .await
        .map_err(|e| format!("查询支出记录失败: {}", e))
}

/// 删除支出记录
#[tauri::command]
pub async fn delete_expense(db: State<'_, DatabaseConnection>, id: i32) -> Result<u64, String> {
    FinanceRepository::delete_expense(&db, id)
        .await
        .map(|result| result.rows_affected)
        .map_err(|e| format!("删除支出记录失败: {}", e))
}

/// 获取财务汇总，可选 ISO 日期范围
#[tauri::command]
pub async fn get_finance_summary(
    db: State<'_, DatabaseConnection>,
    from_date: Option<String>,
    to_date: Option<String>,
) -> Result<FinanceSummary, String> {
    FinanceRepository::get_summary(&db, from_date, to_date)
        .await
        .map_err(|e| format!("获取财务汇总失败: {}", e))
}

// ==================== 工单相关 ====================

/// 新建工单
#[tauri::command]
pub async fn create_ticket(
    db: State<'_, DatabaseConnection>,
    data: InsertTicketData,
) -> Result<i32, String> {
    TicketsRepository::create(&db, data)
        .await
        .map_err(|e| format!("新建工单失败: {}", e))
}

/// 更新工单
#[tauri::command]
pub async fn update_ticket(
    db: State<'_, DatabaseConnection>,
    id: i32,
    updates: UpdateTicketData,
) -> Result<support_tickets::Model, String> {
    TicketsRepository::update(&db, id, updates)
        .await
        .map_err(|e| format!("更新工单失败: {}", e))
}

/// 根据 ID 查询工单
#[tauri::command]
pub async fn find_ticket_by_id(
    db: State<'_, DatabaseConnection>,
    id: i32,
) -> Result<Option<support_tickets::Model>, String> {
    TicketsRepository::find_by_id(&db, id)
        .await
        .map_err(|e| format!("查询工单失败: {}", e))
}

/// 查询工单，支持按状态和会员筛选
#[tauri::command]
pub async fn find_tickets(
    db: State<'_, DatabaseConnection>,
    status: Option<String>,
    member_id: Option<i32>,
) -> Result<Vec<support_tickets::Model>, String> {
    TicketsRepository::find_all(&db, status, member_id)
        .await
        .map_err(|e| format!("查询工单失败: {}", e))
}

/// 删除工单
#[tauri::command]
pub async fn delete_ticket(db: State<'_, DatabaseConnection>, id: i32) -> Result<u64, String> {
    TicketsRepository::delete(&db, id)
        .await
        .map(|result| result.rows_affected)
        .map_err(|e| format!("删除工单失败: {}", e))
}

/// 获取未关闭工单数量
#[tauri::command]
pub async fn count_open_tickets(db: State<'_, DatabaseConnection>) -> Result<u64, String> {
    TicketsRepository::count_open(&db)
        .await
        .map_err(|e| format!("获取未关闭工单数量失败: {}", e))
}

/// 添加工单回复
#[tauri::command]
pub async fn add_ticket_response(
    db: State<'_, DatabaseConnection>,
    ticket_id: i32,
    responder_id: Option<i32>,
    response: String,
) -> Result<i32, String> {
    TicketsRepository::add_response(&db, ticket_id, responder_id, &response)
        .await
        .map_err(|e| format!("添加工单回复失败: {}", e))
}

/// 获取指定工单的回复
#[tauri::command]
pub async fn get_ticket_responses(
    db: State<'_, DatabaseConnection>,
    ticket_id: i32,
) -> Result<Vec<ticket_responses::Model>, String> {
    TicketsRepository::get_responses(&db, ticket_id)
        .await
        .map_err(|e| format!("获取工单回复失败: {}", e))
}

/// 删除工单回复
#[tauri::command]
pub async fn delete_ticket_response(
    db: State<'_, DatabaseConnection>,
    id: i32,
) -> Result<u64, String> {
    TicketsRepository::delete_response(&db, id)
        .await
        .map(|result| result.rows_affected)
        .map_err(|e| format!("删除工单回复失败: {}", e))
}

// ==================== 设置与档案相关 ====================

/// 获取所有设置
#[tauri::command]
pub async fn get_all_settings(
    db: State<'_, DatabaseConnection>,
) -> Result<settings::Model, String> {
    SettingsRepository::get_all_settings(&db)
        .await
        .map_err(|e| format!("获取设置失败: {}", e))
}

/// 批量更新设置
#[tauri::command]
pub async fn update_settings(
    app: AppHandle,
    db: State<'_, DatabaseConnection>,
    org_name: Option<String>,
    currency: Option<String>,
    db_backup_path: Option<String>,
) -> Result<(), String> {
    use crate::utils::fs::PathManager;

    SettingsRepository::update_settings(&db, org_name, currency, db_backup_path)
        .await
        .map_err(|e| format!("更新设置失败: {}", e))?;

    // 清除缓存，下次获取时会重新计算路径
    let path_manager = app.state::<PathManager>();
    path_manager.clear_cache();

    Ok(())
}

/// 获取数据库备份保存路径
#[tauri::command]
pub async fn get_db_backup_path(db: State<'_, DatabaseConnection>) -> Result<String, String> {
    SettingsRepository::get_db_backup_path(&db)
        .await
        .map_err(|e| format!("获取数据库备份保存路径失败: {}", e))
}

/// 设置数据库备份保存路径
#[tauri::command]
pub async fn set_db_backup_path(
    app: AppHandle,
    db: State<'_, DatabaseConnection>,
    path: String,
) -> Result<(), String> {
    use crate::utils::fs::PathManager;

    SettingsRepository::set_db_backup_path(&db, path)
        .await
        .map_err(|e| format!("设置数据库备份保存路径失败: {}", e))?;

    // 清除缓存，下次获取时会重新计算路径
    let path_manager = app.state::<PathManager>();
    path_manager.clear_cache();

    Ok(())
}

/// 获取所有管理员档案
#[tauri::command]
pub async fn get_profiles(
    db: State<'_, DatabaseConnection>,
) -> Result<Vec<profiles::Model>, String> {
    SettingsRepository::get_profiles(&db)
        .await
        .map_err(|e| format!("获取管理员档案失败: {}", e))
}

/// 确保默认管理员档案存在，返回其 ID
#[tauri::command]
pub async fn ensure_default_profile(db: State<'_, DatabaseConnection>) -> Result<i32, String> {
    SettingsRepository::ensure_default_profile(&db)
        .await
        .map_err(|e| format!("初始化管理员档案失败: {}", e))
}

/// 更新管理员档案
#[tauri::command]
pub async fn update_profile(
    db: State<'_, DatabaseConnection>,
    id: i32,
    display_name: Option<String>,
    email: Option<String>,
) -> Result<profiles::Model, String> {
    SettingsRepository::update_profile(&db, id, display_name, email)
        .await
        .map_err(|e| format!("更新管理员档案失败: {}", e))
}
