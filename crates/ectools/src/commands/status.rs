use colored::Colorize;
use ectools_cloud::{ComputeApi, FleetManager, InstanceRecord};

pub async fn handle<C: ComputeApi>(
    fleet: &FleetManager<C>,
    group: Option<&str>,
    json: bool,
) -> anyhow::Result<Vec<InstanceRecord>> {
    if !json {
        println!("{}", "インスタンス一覧を取得中...".blue());
        if let Some(group) = group {
            println!("グループ: {}", group.cyan());
        }
    }

    let records = filter_by_group(fleet.list_status().await?, group);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(records);
    }

    println!();
    if records.is_empty() {
        println!("{}", "ectools のインスタンスはありません".dimmed());
    } else {
        print!("{}", render_table(&records));
        println!();
        let ready = records.iter().filter(|r| r.ready).count();
        println!("{} 台中 {} 台が running", records.len(), ready);
    }

    Ok(records)
}

/// グループ名で絞り込む（None なら全件）
pub fn filter_by_group(records: Vec<InstanceRecord>, group: Option<&str>) -> Vec<InstanceRecord> {
    match group {
        Some(group) => records
            .into_iter()
            .filter(|r| r.group_name.as_deref() == Some(group))
            .collect(),
        None => records,
    }
}

pub fn render_table(records: &[InstanceRecord]) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{}\n",
        format!(
            "{:<22} {:<12} {:<16} {:<6}",
            "INSTANCE ID", "GROUP", "IP", "READY"
        )
        .bold()
    ));
    out.push_str(&format!("{}\n", "─".repeat(59).dimmed()));

    for record in records {
        let group = record.group_name.as_deref().unwrap_or("-");
        let ip = record.ip.as_deref().unwrap_or("-");
        let ready = if record.ready {
            format!("{:<6}", "yes").green()
        } else {
            format!("{:<6}", "no").yellow()
        };

        out.push_str(&format!(
            "{:<22} {:<12} {:<16} {}\n",
            record.instance_id.cyan(),
            group,
            ip,
            ready
        ));
    }

    out
}
