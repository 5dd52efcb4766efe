use colored::Colorize;
use ectools_cloud::{ComputeApi, FleetManager};

pub async fn handle<C: ComputeApi>(
    fleet: &FleetManager<C>,
    instance_ids: &[String],
    yes: bool,
) -> anyhow::Result<()> {
    println!(
        "{}",
        format!("削除対象 ({} 台):", instance_ids.len()).bold()
    );
    for id in instance_ids {
        println!("  • {}", id.cyan());
    }

    // 確認（--yesが指定されていない場合）
    if !yes {
        println!();
        println!(
            "{}",
            "警告: インスタンスを削除します。この操作は取り消せません。".yellow()
        );
        println!("実行するには --yes オプションを指定してください");
        return Ok(());
    }

    println!();
    println!("{}", "インスタンスを削除中...".red());

    if let Err(e) = fleet.terminate(instance_ids).await {
        let not_found = e.is_not_found();
        let err = anyhow::Error::new(e);
        return Err(if not_found {
            err.context("存在しないインスタンス ID が含まれています")
        } else {
            err
        });
    }

    println!("{}", "✓ 削除を開始しました".green());
    Ok(())
}
