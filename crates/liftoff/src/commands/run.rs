use crate::args::{StageArgs, TimingArgs};
use colored::Colorize;
use liftoff_cloud::{ProvisionContext, RunReport, StageOrchestrator, Verb};
use liftoff_cloud_aws::AwsProvider;

/// Create or delete the named resource kinds and return the process exit code.
pub async fn handle(
    verb: Verb,
    kinds: &[String],
    stage: &StageArgs,
    timing: &TimingArgs,
) -> anyhow::Result<i32> {
    let (_, config) = super::load_stage(stage)?;

    println!(
        "{} {} [{}] (prefix: {}, region: {})",
        "▶".cyan(),
        verb.to_string().bold(),
        kinds.join(" "),
        config.prefix.cyan(),
        config.region.cyan()
    );

    let provider = AwsProvider::new(config.profile.clone(), config.region.clone());
    let ctx = ProvisionContext::new(config, provider.into_clients()).with_poll(timing.poll_config());
    let report = StageOrchestrator::new(ctx).run(verb, kinds).await;

    print_report(&report);
    Ok(report.exit_code())
}

fn print_report(report: &RunReport) {
    println!();
    for step in &report.succeeded {
        println!("  {} {}: {}", "✓".green(), step.kind.to_string().cyan(), step.message);
    }
    for step in &report.failed {
        println!(
            "  {} {}: {}",
            "✗".red(),
            step.kind.to_string().cyan(),
            step.error.as_deref().unwrap_or("failed").red()
        );
    }
    for token in &report.skipped {
        println!("  {} {}: unknown resource kind", "-".yellow(), token.yellow());
    }

    println!();
    let seconds = report.duration_ms as f64 / 1000.0;
    if report.is_success() {
        println!(
            "{} ({} succeeded, {:.1}s)",
            "✓ Done".green().bold(),
            report.succeeded.len(),
            seconds
        );
    } else {
        println!(
            "{} ({} succeeded, {} failed, {:.1}s)",
            "✗ Finished with errors".red().bold(),
            report.succeeded.len(),
            report.failed.len(),
            seconds
        );
    }
}
