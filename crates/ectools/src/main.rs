mod commands;
mod utils;

use clap::{Args, Parser, Subcommand};
use std::num::NonZeroU32;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ectools")]
#[command(about = "タグ付き EC2 インスタンス群を起動・監視・削除する", long_about = None)]
struct Cli {
    /// AWS リージョン
    #[arg(long, global = true, env = "ECTOOLS_REGION")]
    region: Option<String>,

    /// AWS プロファイル
    #[arg(long, global = true, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// 詳細ログを表示
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 起動テンプレートからインスタンスを起動
    Launch(LaunchArgs),
    /// ectools 管理下のインスタンスの状態を表示
    Status {
        /// グループ名で絞り込む
        #[arg(short, long)]
        group: Option<String>,
        /// JSON で出力
        #[arg(long)]
        json: bool,
    },
    /// インスタンスを削除
    Terminate {
        /// 削除するインスタンス ID
        #[arg(required = true)]
        instance_ids: Vec<String>,
        /// 確認なしで実行
        #[arg(short, long)]
        yes: bool,
    },
    /// バージョン情報を表示
    Version,
}

#[derive(Args, Debug, Default)]
pub(crate) struct LaunchArgs {
    /// 起動テンプレート名（省略時は設定ファイルの launch.template）
    pub template: Option<String>,
    /// 起動するインスタンス数
    #[arg(short, long)]
    pub count: Option<NonZeroU32>,
    /// グループ名（省略時はランダムな 5 文字）
    #[arg(short, long)]
    pub group: Option<String>,
    /// ユーザーデータとして渡すスクリプト
    #[arg(long, value_name = "PATH")]
    pub user_data_file: Option<PathBuf>,
    /// インスタンスタイプ
    #[arg(long)]
    pub instance_type: Option<String>,
    /// キーペア名
    #[arg(long)]
    pub key_name: Option<String>,
    /// サブネット ID
    #[arg(long)]
    pub subnet_id: Option<String>,
    /// セキュリティグループ ID（複数指定可）
    #[arg(long = "security-group-id", value_name = "SG")]
    pub security_group_ids: Vec<String>,
    /// IAM インスタンスプロファイル名
    #[arg(long)]
    pub iam_instance_profile: Option<String>,
    /// RunInstances の追加パラメータ (例: EbsOptimized=true)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = utils::parse_raw_parameter)]
    pub params: Vec<(String, serde_json::Value)>,
    /// JSON で出力
    #[arg(long)]
    pub json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    utils::init_tracing(cli.verbose);

    // Versionコマンドは設定ファイル・AWS 接続不要
    if matches!(cli.command, Commands::Version) {
        println!("ectools {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let loaded = ectools_config::load()?;
    if let Some(source) = &loaded.source {
        tracing::debug!(path = %source.display(), "Loaded config file");
    }

    let fleet = utils::connect(
        cli.region.as_deref(),
        cli.profile.as_deref(),
        &loaded.config,
    )
    .await;

    // コマンドディスパッチ
    match cli.command {
        Commands::Launch(args) => {
            commands::launch::handle(&fleet, &args, &loaded.config.launch).await?;
        }
        Commands::Status { group, json } => {
            commands::status::handle(&fleet, group.as_deref(), json).await?;
        }
        Commands::Terminate { instance_ids, yes } => {
            commands::terminate::handle(&fleet, &instance_ids, yes).await?;
        }
        Commands::Version => {
            unreachable!("Version is handled before config loading");
        }
    }

    Ok(())
}
