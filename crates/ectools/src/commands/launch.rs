use crate::LaunchArgs;
use colored::Colorize;
use ectools_cloud::{ComputeApi, FleetManager, LaunchOverrides, LaunchRequest, tags};
use ectools_config::LaunchDefaults;
use std::num::NonZeroU32;

pub async fn handle<C: ComputeApi>(
    fleet: &FleetManager<C>,
    args: &LaunchArgs,
    defaults: &LaunchDefaults,
) -> anyhow::Result<Vec<String>> {
    let request = build_launch_request(args, defaults)?;

    // グループ名はここで確定させて表示に使う
    let group_name = tags::resolve_group_name(request.group_name.clone());
    let template_name = request.template_name.clone();
    let count = request.count;
    let request = request.with_group(group_name.clone());

    if !args.json {
        println!("{}", "インスタンスを起動中...".blue());
        println!("テンプレート: {}", template_name.cyan());
        println!("グループ: {}", group_name.cyan());
        println!("台数: {}", count);
    }

    let ids = fleet.launch(request).await?;

    if args.json {
        let output = serde_json::json!({
            "group_name": group_name,
            "instance_ids": ids,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!();
        println!(
            "{}",
            format!("✓ {} 台のインスタンスを起動しました", ids.len()).green()
        );
        for id in &ids {
            println!("  • {}", id.cyan());
        }
        println!();
        println!(
            "{}",
            format!("状態の確認: ectools status --group {}", group_name).dimmed()
        );
    }

    Ok(ids)
}

/// 引数と設定ファイルのデフォルトから LaunchRequest を組み立てる（引数優先）
pub fn build_launch_request(
    args: &LaunchArgs,
    defaults: &LaunchDefaults,
) -> anyhow::Result<LaunchRequest> {
    let template_name = args
        .template
        .clone()
        .or_else(|| defaults.template.clone())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "起動テンプレートが指定されていません。引数か設定ファイルの launch.template で指定してください"
            )
        })?;

    let count = match (args.count, defaults.count) {
        (Some(count), _) => count,
        (None, Some(count)) => NonZeroU32::new(count)
            .ok_or_else(|| anyhow::anyhow!("launch.count は 1 以上を指定してください"))?,
        (None, None) => NonZeroU32::MIN,
    };

    let mut overrides = LaunchOverrides {
        instance_type: args
            .instance_type
            .clone()
            .or_else(|| defaults.instance_type.clone()),
        key_name: args.key_name.clone().or_else(|| defaults.key_name.clone()),
        subnet_id: args.subnet_id.clone().or_else(|| defaults.subnet_id.clone()),
        security_group_ids: if args.security_group_ids.is_empty() {
            defaults.security_group_ids.clone()
        } else {
            args.security_group_ids.clone()
        },
        iam_instance_profile: args
            .iam_instance_profile
            .clone()
            .or_else(|| defaults.iam_instance_profile.clone()),
        ..Default::default()
    };

    if let Some(path) = &args.user_data_file {
        let user_data = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(
                "ユーザーデータファイルの読み込みに失敗しました ({}): {}",
                path.display(),
                e
            )
        })?;
        overrides.user_data = Some(user_data);
    }

    for (name, value) in &args.params {
        overrides
            .extra_raw_parameters
            .insert(name.clone(), value.clone());
    }

    let mut request = LaunchRequest::new(template_name, count).with_overrides(overrides);
    if let Some(group) = &args.group {
        request = request.with_group(group.clone());
    }

    Ok(request)
}
