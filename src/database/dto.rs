//! 数据传输对象 (DTO)
//!
//! 用于前后端数据交互的结构定义。
//! 更新类结构使用 Option<Option<T>> 区分"未提供字段"和"显式设为 null"。

use serde::{Deserialize, Deserializer, Serialize};

/// 辅助函数：支持 Option<Option<T>> 的反序列化
/// 用于区分"未提供字段"和"显式设为 null"
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

// ==================== 收款员 ====================

/// 用于新建收款员的数据结构
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InsertCollectorData {
    pub name: String,
    pub number: String,
    pub prefix: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// 缺省为在职（1）
    pub active: Option<i32>,
}

/// 用于更新收款员的数据结构，所有字段均可选
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateCollectorData {
    pub name: Option<String>,
    pub number: Option<String>,
    pub prefix: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    pub active: Option<i32>,
}

// ==================== 会员 ====================

/// 用于新建会员的数据结构
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InsertMemberData {
    pub full_name: String,
    pub member_number: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub town: Option<String>,
    pub postcode: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub membership_type: Option<String>,
    pub status: Option<String>,
    pub verified: Option<i32>,
    pub collector_id: Option<i32>,
}

/// 用于更新会员的数据结构
///
/// 所有字段均为 Option，允许部分更新。
/// 可空列使用 Option<Option<T>> 来区分"未提供"和"设为 null"。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateMemberData {
    pub full_name: Option<String>,
    pub member_number: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub town: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub postcode: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub date_of_birth: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub gender: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub marital_status: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub membership_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub verified: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub collector_id: Option<Option<i32>>,
}

// ==================== 缴费与支出 ====================

/// 用于录入缴费记录的数据结构
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InsertPaymentData {
    pub member_id: Option<i32>,
    pub collector_id: Option<i32>,
    pub amount: f64,
    pub payment_type: String,
    /// ISO 日期（YYYY-MM-DD）
    pub payment_date: String,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// 用于更新缴费记录的数据结构
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdatePaymentData {
    #[serde(default, deserialize_with = "double_option")]
    pub member_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub collector_id: Option<Option<i32>>,
    pub amount: Option<f64>,
    pub payment_type: Option<String>,
    pub payment_date: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

/// 用于录入支出记录的数据结构
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InsertExpenseData {
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
    /// ISO 日期（YYYY-MM-DD）
    pub expense_date: String,
    pub status: Option<String>,
}

/// 用于更新支出记录的数据结构
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateExpenseData {
    pub amount: Option<f64>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub expense_date: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<String>>,
}

// ==================== 工单 ====================

/// 用于新建工单的数据结构
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InsertTicketData {
    pub member_id: Option<i32>,
    pub subject: String,
    pub description: String,
    pub status: Option<String>,
    pub priority: Option<String>,
}

/// 用于更新工单的数据结构
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateTicketData {
    pub subject: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub priority: Option<Option<String>>,
}
