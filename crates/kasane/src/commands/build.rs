//! build コマンド: バージョン発見 → プラン → 3フェーズ実行 → 集約表示

use colored::Colorize;
use kasane_build::{DockerBackend, MatrixReport, Orchestrator, TaskStatus};
use kasane_core::PlannerConfig;
use kasane_registry::{TagLister, VersionSource, missing_versions};
use std::path::PathBuf;

#[allow(clippy::too_many_arguments)]
pub async fn handle(
    config: PlannerConfig,
    package: &str,
    threads: usize,
    context: PathBuf,
    skip_existing: bool,
    dry_run: bool,
    json: bool,
) -> anyhow::Result<()> {
    println!("{}", "バージョンを取得中...".blue());
    let source = VersionSource::new();
    let mut versions = source.fetch(package).await?;
    tracing::debug!("discovered {} versions for {}", versions.len(), package);

    if skip_existing {
        let published = TagLister::new().list_tags(&config.target_repository).await;
        versions = missing_versions(&versions, &published);
        if versions.is_empty() {
            println!("{}", "✓ すべてのバージョンが公開済みです".green());
            return Ok(());
        }
    }

    let tasks = kasane_core::plan(&config, &versions)?;

    println!(
        "プラン: {} タスク（{} バージョン × {} バリアント）",
        tasks.len().to_string().cyan(),
        versions.len(),
        config.variants.len()
    );

    if dry_run {
        for task in &tasks {
            crate::commands::plan::print_task(task);
        }
        return Ok(());
    }

    let backend = DockerBackend::connect()?;
    let orchestrator = Orchestrator::new(backend, context).with_workers(threads);
    let report = orchestrator.run(&config.target_repository, &tasks).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    let failed = report.failures().count();
    if failed > 0 {
        return Err(anyhow::anyhow!("{} 件のタスクが失敗しました", failed));
    }

    Ok(())
}

/// 結果サマリーを表示
fn print_summary(report: &MatrixReport) {
    println!();
    println!("{}", "結果サマリー:".bold());

    for failure in &report.pull_failures {
        println!(
            "  {} pull {}: {}",
            "⚠".yellow(),
            failure.image.cyan(),
            failure.detail
        );
    }

    for entry in &report.tasks {
        match &entry.status {
            TaskStatus::Pushed { aliases } => {
                if aliases.is_empty() {
                    println!("  {} {}", "✓".green(), entry.task.primary_tag.cyan());
                } else {
                    println!(
                        "  {} {} (+ {})",
                        "✓".green(),
                        entry.task.primary_tag.cyan(),
                        aliases.join(", ")
                    );
                }
            }
            TaskStatus::BuildFailed { detail } => {
                println!(
                    "  {} {} ビルド失敗: {}",
                    "✗".red().bold(),
                    entry.task.primary_tag.cyan(),
                    detail
                );
            }
            TaskStatus::PushFailed {
                pushed,
                failed_tag,
                detail,
            } => {
                println!(
                    "  {} {} プッシュ失敗 ({}): {}",
                    "✗".red().bold(),
                    entry.task.primary_tag.cyan(),
                    failed_tag,
                    detail
                );
                if !pushed.is_empty() {
                    println!("      プッシュ済み: {}", pushed.join(", "));
                }
            }
        }
    }

    println!();
    if report.is_success() {
        println!(
            "{}",
            "✓ すべてのイメージがビルド＆プッシュされました！".green().bold()
        );
    } else {
        println!(
            "{}",
            format!("✗ {} 件のタスクが失敗しました", report.failures().count())
                .red()
                .bold()
        );
    }
}
