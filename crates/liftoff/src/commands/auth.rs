use crate::args::StageArgs;
use colored::Colorize;
use liftoff_cloud_aws::AwsProvider;

/// Check the aws CLI and the configured profile. Returns the process exit code.
pub async fn handle(stage: &StageArgs) -> anyhow::Result<i32> {
    let (_, config) = super::load_stage(stage)?;

    println!(
        "Checking credentials (profile: {}, region: {})...",
        config.profile.cyan(),
        config.region.cyan()
    );

    let status = AwsProvider::new(config.profile, config.region)
        .check_auth()
        .await;

    if status.authenticated {
        println!(
            "{} {}",
            "✓ Authenticated:".green().bold(),
            status.account_info.unwrap_or_default()
        );
        Ok(0)
    } else {
        eprintln!("{}", "✗ Not authenticated".red().bold());
        if let Some(error) = status.error {
            eprintln!("  {}", error);
        }
        Ok(1)
    }
}
