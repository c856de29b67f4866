//! JSON 数据导入
//!
//! 从 JSON 文件批量导入收款员和会员。整个导入在单个事务中执行，
//! 任何一行写入失败都会整体回滚；编号已存在的行按跳过处理。

use sea_orm::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tauri::State;

use crate::entity::prelude::*;
use crate::entity::{collectors, members};

/// 导入文件中的收款员行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportCollector {
    pub name: String,
    pub number: String,
    pub prefix: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub active: Option<i32>,
}

/// 导入文件中的会员行
///
/// collector_number 指向收款员的编号（prefix + number 或 number），
/// 导入时解析为 collector_id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportMember {
    pub full_name: String,
    pub member_number: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub town: Option<String>,
    pub postcode: Option<String>,
    pub collector_number: Option<String>,
}

/// 导入文件的整体结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPayload {
    #[serde(default)]
    pub collectors: Vec<ImportCollector>,
    #[serde(default)]
    pub members: Vec<ImportMember>,
}

/// 导入结果统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub collectors_imported: u64,
    pub collectors_skipped: u64,
    pub members_imported: u64,
    pub members_skipped: u64,
}

/// 解析导入文件内容
pub fn parse_import_payload(contents: &str) -> Result<ImportPayload, String> {
    serde_json::from_str(contents).map_err(|e| format!("导入文件格式无效: {}", e))
}

/// 在单个事务中导入收款员和会员
pub async fn import_payload(
    db: &DatabaseConnection,
    payload: ImportPayload,
) -> Result<ImportSummary, DbErr> {
    let txn = db.begin().await?;
    let now = chrono::Utc::now().timestamp() as i32;

    let mut summary = ImportSummary {
        collectors_imported: 0,
        collectors_skipped: 0,
        members_imported: 0,
        members_skipped: 0,
    };

    // 收款员编号 -> id 的映射，供会员行解析 collector_number
    // 同时以 number 和 prefix + number 两种写法作为键
    let mut collector_map: HashMap<String, i32> = HashMap::new();

    for existing in Collectors::find().all(&txn).await? {
        collector_map.insert(existing.number.clone(), existing.id);
        collector_map.insert(
            format!("{}{}", existing.prefix, existing.number),
            existing.id,
        );
    }

    // 1. 导入收款员
    for row in payload.collectors {
        let exists = Collectors::find()
            .filter(
                collectors::Column::Prefix
                    .eq(row.prefix.clone())
                    .and(collectors::Column::Number.eq(row.number.clone())),
            )
            .count(&txn)
            .await?
            > 0;

        if exists {
            summary.collectors_skipped += 1;
            continue;
        }

        let record = collectors::ActiveModel {
            id: NotSet,
            name: Set(row.name),
            number: Set(row.number.clone()),
            prefix: Set(row.prefix.clone()),
            phone: Set(row.phone),
            email: Set(row.email),
            active: Set(Some(row.active.unwrap_or(1))),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };

        let inserted = record.insert(&txn).await?;
        collector_map.insert(row.number.clone(), inserted.id);
        collector_map.insert(format!("{}{}", row.prefix, row.number), inserted.id);
        summary.collectors_imported += 1;
    }

    // 2. 导入会员
    for row in payload.members {
        let exists = Members::find()
            .filter(members::Column::MemberNumber.eq(row.member_number.clone()))
            .count(&txn)
            .await?
            > 0;

        if exists {
            summary.members_skipped += 1;
            continue;
        }

        let collector_id = row
            .collector_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .and_then(|n| collector_map.get(n).copied());

        let record = members::ActiveModel {
            id: NotSet,
            full_name: Set(row.full_name),
            member_number: Set(row.member_number),
            email: Set(row.email),
            phone: Set(row.phone),
            address: Set(row.address),
            town: Set(row.town),
            postcode: Set(row.postcode),
            date_of_birth: Set(None),
            gender: Set(None),
            marital_status: Set(None),
            membership_type: Set(None),
            status: Set(Some("active".to_string())),
            verified: Set(Some(0)),
            collector_id: Set(collector_id),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };

        record.insert(&txn).await?;
        summary.members_imported += 1;
    }

    txn.commit().await?;

    log::info!(
        "数据导入完成: 收款员 {} 新增 / {} 跳过，会员 {} 新增 / {} 跳过",
        summary.collectors_imported,
        summary.collectors_skipped,
        summary.members_imported,
        summary.members_skipped
    );

    Ok(summary)
}

/// 从 JSON 文件导入收款员和会员数据
#[tauri::command]
pub async fn import_data_from_json(
    db: State<'_, DatabaseConnection>,
    path: String,
) -> Result<ImportSummary, String> {
    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| format!("读取导入文件失败: {}", e))?;

    let payload = parse_import_payload(&contents)?;

    import_payload(&db, payload)
        .await
        .map_err(|e| format!("导入数据失败: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repository::test_utils::setup_db;

    const SAMPLE: &str = r#"{
        "collectors": [
            {"name": "Ali Hassan", "number": "001", "prefix": "C"},
            {"name": "Bilal Shah", "number": "002", "prefix": "C", "active": 0}
        ],
        "members": [
            {"full_name": "Imran Qureshi", "member_number": "M001", "collector_number": "C001"},
            {"full_name": "Sana Iqbal", "member_number": "M002", "collector_number": "002"},
            {"full_name": "Unassigned Person", "member_number": "M003"}
        ]
    }"#;

    #[test]
    fn parse_accepts_missing_sections() {
        let payload = parse_import_payload(r#"{"collectors": []}"#).unwrap();
        assert!(payload.collectors.is_empty());
        assert!(payload.members.is_empty());

        assert!(parse_import_payload("not json").is_err());
    }

    #[tokio::test]
    async fn import_resolves_collector_references() {
        let db = setup_db().await;
        let payload = parse_import_payload(SAMPLE).unwrap();

        let summary = import_payload(&db, payload).await.unwrap();
        assert_eq!(summary.collectors_imported, 2);
        assert_eq!(summary.members_imported, 3);

        let collectors = Collectors::find().all(&db).await.unwrap();
        assert_eq!(collectors.len(), 2);
        let ali = collectors.iter().find(|c| c.number == "001").unwrap();

        let members = Members::find().all(&db).await.unwrap();
        assert_eq!(members.len(), 3);

        // prefix + number 和纯 number 两种写法都能解析
        let imran = members.iter().find(|m| m.member_number == "M001").unwrap();
        assert_eq!(imran.collector_id, Some(ali.id));
        let sana = members.iter().find(|m| m.member_number == "M002").unwrap();
        let bilal = collectors.iter().find(|c| c.number == "002").unwrap();
        assert_eq!(sana.collector_id, Some(bilal.id));
        let loner = members.iter().find(|m| m.member_number == "M003").unwrap();
        assert_eq!(loner.collector_id, None);
    }

    #[tokio::test]
    async fn reimport_skips_existing_rows() {
        let db = setup_db().await;

        let first = import_payload(&db, parse_import_payload(SAMPLE).unwrap())
            .await
            .unwrap();
        assert_eq!(first.collectors_skipped, 0);

        let second = import_payload(&db, parse_import_payload(SAMPLE).unwrap())
            .await
            .unwrap();
        assert_eq!(second.collectors_imported, 0);
        assert_eq!(second.collectors_skipped, 2);
        assert_eq!(second.members_imported, 0);
        assert_eq!(second.members_skipped, 3);

        assert_eq!(Members::find().count(&db).await.unwrap(), 3);
    }
}
