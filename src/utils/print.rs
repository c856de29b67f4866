//! 打印文档生成
//!
//! 收款路单和收款员总表都是纯字符串拼接出来的独立 HTML 文档，
//! 由前端 webview 调起系统打印。所有行数据先做 HTML 转义。

use sea_orm::DatabaseConnection;
use tauri::State;

use crate::database::repository::collectors_repository::{
    CollectorWithMembers, CollectorsRepository,
};
use crate::database::repository::settings_repository::SettingsRepository;
use crate::entity::{collectors, members};

/// HTML 转义
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// 文档通用样式
const DOC_STYLE: &str = r#"body { font-family: sans-serif; margin: 24px; }
h1 { font-size: 20px; margin-bottom: 0; }
h2 { font-size: 16px; color: #444; margin-top: 4px; }
table { border-collapse: collapse; width: 100%; margin-top: 16px; }
th, td { border: 1px solid #999; padding: 6px 8px; font-size: 12px; text-align: left; }
th { background: #eee; }
.empty { color: #777; font-style: italic; }"#;

fn optional(value: &Option<String>) -> String {
    value.as_deref().map(escape_html).unwrap_or_default()
}

/// 生成单个收款员的收款路单
///
/// 表头为"前缀编号 - 姓名"，正文是名下会员的联系信息表格
pub fn collector_round_sheet(
    org_name: &str,
    collector: &collectors::Model,
    members: &[members::Model],
) -> String {
    let mut rows = String::new();

    if members.is_empty() {
        rows.push_str(r#"<tr><td colspan="5" class="empty">No members assigned</td></tr>"#);
    } else {
        for member in members {
            rows.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&member.full_name),
                escape_html(&member.member_number),
                optional(&member.phone),
                optional(&member.address),
                optional(&member.postcode),
            ));
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Collector Round Sheet</title>
<style>{style}</style>
</head>
<body>
<h1>{org}</h1>
<h2>{prefix}{number} - {name} ({count} members)</h2>
<table>
<thead><tr><th>Name</th><th>Member ID</th><th>Contact Number</th><th>Address</th><th>Postcode</th></tr></thead>
<tbody>{rows}</tbody>
</table>
</body>
</html>"#,
        style = DOC_STYLE,
        org = escape_html(org_name),
        prefix = escape_html(&collector.prefix),
        number = escape_html(&collector.number),
        name = escape_html(&collector.name),
        count = members.len(),
        rows = rows,
    )
}

/// 生成所有收款员的总表
pub fn collectors_summary(org_name: &str, collectors: &[CollectorWithMembers]) -> String {
    let mut rows = String::new();

    if collectors.is_empty() {
        rows.push_str(r#"<tr><td colspan="4" class="empty">No collectors</td></tr>"#);
    } else {
        for collector in collectors {
            let status = match collector.active {
                Some(0) => "Inactive",
                _ => "Active",
            };
            rows.push_str(&format!(
                "<tr><td>{}{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&collector.prefix),
                escape_html(&collector.number),
                escape_html(&collector.name),
                status,
                collector.member_count,
            ));
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Collectors Summary</title>
<style>{style}</style>
</head>
<body>
<h1>{org}</h1>
<h2>Collectors Summary</h2>
<table>
<thead><tr><th>Number</th><th>Name</th><th>Status</th><th>Members</th></tr></thead>
<tbody>{rows}</tbody>
</table>
</body>
</html>"#,
        style = DOC_STYLE,
        org = escape_html(org_name),
        rows = rows,
    )
}

// ==================== 打印相关 commands ====================

/// 生成收款路单 HTML
#[tauri::command]
pub async fn build_collector_round_sheet(
    db: State<'_, DatabaseConnection>,
    collector_id: i32,
) -> Result<String, String> {
    let collector = CollectorsRepository::find_by_id(&db, collector_id)
        .await
        .map_err(|e| format!("生成路单失败: {}", e))?
        .ok_or("生成路单失败: 收款员不存在")?;

    let org_name = SettingsRepository::get_org_name(&db)
        .await
        .map_err(|e| format!("生成路单失败: {}", e))?;

    // 复用组合查询，仅取目标收款员名下的会员
    let with_members = CollectorsRepository::find_with_members(&db, None)
        .await
        .map_err(|e| format!("生成路单失败: {}", e))?;
    let members = with_members
        .into_iter()
        .find(|c| c.id == collector_id)
        .map(|c| c.members)
        .unwrap_or_default();

    Ok(collector_round_sheet(&org_name, &collector, &members))
}

/// 生成收款员总表 HTML
#[tauri::command]
pub async fn build_collectors_summary(
    db: State<'_, DatabaseConnection>,
) -> Result<String, String> {
    let org_name = SettingsRepository::get_org_name(&db)
        .await
        .map_err(|e| format!("生成总表失败: {}", e))?;

    let collectors = CollectorsRepository::find_with_members(&db, None)
        .await
        .map_err(|e| format!("生成总表失败: {}", e))?;

    Ok(collectors_summary(&org_name, &collectors))
}

/// 将打印文档保存到指定路径
#[tauri::command]
pub async fn save_print_document(path: String, contents: String) -> Result<(), String> {
    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| format!("保存打印文档失败: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector(name: &str) -> collectors::Model {
        collectors::Model {
            id: 1,
            name: name.to_string(),
            number: "001".to_string(),
            prefix: "C".to_string(),
            phone: None,
            email: None,
            active: Some(1),
            created_at: None,
            updated_at: None,
        }
    }

    fn member(name: &str, number: &str) -> members::Model {
        members::Model {
            id: 1,
            full_name: name.to_string(),
            member_number: number.to_string(),
            email: None,
            phone: Some("07700 900123".to_string()),
            address: Some("1 Mill Lane".to_string()),
            town: None,
            postcode: Some("BD1 1AA".to_string()),
            date_of_birth: None,
            gender: None,
            marital_status: None,
            membership_type: None,
            status: Some("active".to_string()),
            verified: Some(0),
            collector_id: Some(1),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn round_sheet_contains_member_rows() {
        let doc = collector_round_sheet(
            "Welfare Trust",
            &collector("Ali Hassan"),
            &[member("Imran Qureshi", "M010")],
        );

        assert!(doc.contains("Welfare Trust"));
        assert!(doc.contains("C001 - Ali Hassan (1 members)"));
        assert!(doc.contains("Imran Qureshi"));
        assert!(doc.contains("M010"));
        assert!(doc.contains("07700 900123"));
    }

    #[test]
    fn round_sheet_escapes_html_in_data() {
        let doc = collector_round_sheet(
            "T&T <Trust>",
            &collector("A <b>bold</b> name"),
            &[member("O'Brien & Sons", "M<1>")],
        );

        assert!(doc.contains("T&amp;T &lt;Trust&gt;"));
        assert!(doc.contains("A &lt;b&gt;bold&lt;/b&gt; name"));
        assert!(doc.contains("O&#39;Brien &amp; Sons"));
        assert!(!doc.contains("<b>bold</b>"));
    }

    #[test]
    fn round_sheet_renders_empty_state() {
        let doc = collector_round_sheet("Org", &collector("Empty"), &[]);
        assert!(doc.contains("No members assigned"));
    }

    #[test]
    fn summary_lists_collectors_with_counts() {
        let rows = vec![
            CollectorWithMembers {
                id: 1,
                name: "Ali".to_string(),
                number: "001".to_string(),
                prefix: "C".to_string(),
                phone: None,
                email: None,
                active: Some(1),
                member_count: 3,
                members: Vec::new(),
            },
            CollectorWithMembers {
                id: 2,
                name: "Bilal".to_string(),
                number: "002".to_string(),
                prefix: "C".to_string(),
                phone: None,
                email: None,
                active: Some(0),
                member_count: 0,
                members: Vec::new(),
            },
        ];

        let doc = collectors_summary("Org", &rows);
        assert!(doc.contains("C001"));
        assert!(doc.contains("Inactive"));
        assert!(doc.contains("<td>3</td>"));
    }
}
