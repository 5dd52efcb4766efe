use ectools_cloud::FleetManager;
use ectools_cloud_aws::{AwsOptions, Ec2Compute};
use ectools_config::EctoolsConfig;
use tracing_subscriber::EnvFilter;

/// stderr にログを出力（RUST_LOG を優先）
pub fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "warn,ectools=debug,ectools_cloud=debug,ectools_cloud_aws=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// リージョン・プロファイルを決定（フラグ/環境変数 > 設定ファイル > SDK デフォルト）
pub fn aws_options(
    region: Option<&str>,
    profile: Option<&str>,
    config: &EctoolsConfig,
) -> AwsOptions {
    AwsOptions {
        region: region.map(str::to_string).or_else(|| config.region.clone()),
        profile: profile.map(str::to_string).or_else(|| config.profile.clone()),
    }
}

/// EC2 に接続した FleetManager を作成
pub async fn connect(
    region: Option<&str>,
    profile: Option<&str>,
    config: &EctoolsConfig,
) -> FleetManager<Ec2Compute> {
    let options = aws_options(region, profile, config);
    let compute = ectools_cloud_aws::shared_client(&options).await.clone();
    FleetManager::new(compute)
}

/// `KEY=VALUE` を解析。VALUE は JSON として解釈し、失敗したら文字列扱い
pub fn parse_raw_parameter(s: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("KEY=VALUE 形式で指定してください: {}", s))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("パラメータ名が空です: {}", s));
    }

    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));

    Ok((key.to_string(), value))
}
