//! versions コマンド: 公開バージョン一覧の表示

use colored::Colorize;
use kasane_registry::VersionSource;

pub async fn handle(package: &str) -> anyhow::Result<()> {
    let source = VersionSource::new();
    let versions = source.fetch(package).await?;

    // 最後の要素がインデックスの公開順での latest
    let latest = versions.last().cloned();

    println!("{}", format!("{} ({} バージョン):", package, versions.len()).bold());
    for version in &versions {
        if Some(version) == latest.as_ref() {
            println!("  {} {}", version.cyan(), "(latest)".green());
        } else {
            println!("  {}", version);
        }
    }

    Ok(())
}
