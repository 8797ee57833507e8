//! plan コマンド: プランの表示のみ。エンジンには触れない。

use colored::Colorize;
use kasane_core::{BuildTask, PlannerConfig};
use kasane_registry::VersionSource;

pub async fn handle(config: PlannerConfig, package: &str) -> anyhow::Result<()> {
    let source = VersionSource::new();
    let versions = source.fetch(package).await?;

    let tasks = kasane_core::plan(&config, &versions)?;

    println!(
        "{}",
        format!("ビルドプラン ({} タスク):", tasks.len()).bold()
    );
    for task in &tasks {
        print_task(task);
    }

    Ok(())
}

/// プランの1行表示
pub fn print_task(task: &BuildTask) {
    if task.alias_tags.is_empty() {
        println!(
            "  {} {} (base: {})",
            "•".blue(),
            task.fully_qualified_tag.cyan(),
            task.base_image_ref
        );
    } else {
        println!(
            "  {} {} (base: {}) {}",
            "•".blue(),
            task.fully_qualified_tag.cyan(),
            task.base_image_ref,
            format!("→ {}", task.alias_tags.join(", ")).green()
        );
    }
}
