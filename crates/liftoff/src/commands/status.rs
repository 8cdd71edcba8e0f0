use crate::args::StageArgs;
use colored::Colorize;
use liftoff_cloud::{ProvisionContext, StageOrchestrator};
use liftoff_cloud_aws::AwsProvider;

pub async fn handle(kinds: &[String], stage: &StageArgs) -> anyhow::Result<()> {
    let (_, config) = super::load_stage(stage)?;

    let kinds = if kinds.is_empty() {
        vec![liftoff_cloud::orchestrator::ALL_TOKEN.to_string()]
    } else {
        kinds.to_vec()
    };

    println!(
        "{} (prefix: {}, region: {})",
        "Resource status".bold(),
        config.prefix.cyan(),
        config.region.cyan()
    );

    let provider = AwsProvider::new(config.profile.clone(), config.region.clone());
    let orchestrator = StageOrchestrator::new(ProvisionContext::new(config, provider.into_clients()));
    let handles = orchestrator.status(&kinds).await?;

    for handle in handles {
        let state = match &handle.id {
            Some(id) => id.green(),
            None => "not found".yellow(),
        };
        println!(
            "  {:<10} {:<40} {}",
            handle.kind.to_string().cyan(),
            handle.name,
            state
        );
    }

    Ok(())
}
