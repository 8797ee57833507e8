//! タグプランナー
//!
//! 発見されたバージョン列 × バリアント集合の直積からビルドプランを導出する。
//! 純粋関数のみで構成され、同じ入力からは常に同じプランが得られる。

use crate::error::{ConfigError, Result};
use crate::model::{AliasMode, BaseVariant, BuildTask};
use std::collections::BTreeSet;

/// デフォルトのベースバリアント集合
pub const DEFAULT_VARIANTS: [&str; 6] = ["", "stretch", "slim", "jessie", "slim-jessie", "alpine"];

/// デフォルトのランタイムバージョン
pub const DEFAULT_RUNTIME_VERSION: &str = "3.6";

/// プランナー設定
///
/// 元スクリプトがモジュールグローバルとして持っていた値を明示的に保持する。
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// プッシュ先リポジトリ（例: `acme/pkg`）
    pub target_repository: String,
    /// ベースイメージ名（例: `python`）
    pub runtime_image: String,
    /// ベースイメージのバージョン（例: `3.6`）
    pub runtime_version: String,
    /// ビルドするバリアント集合
    pub variants: Vec<BaseVariant>,
    /// latest エイリアスの付け方
    pub alias_mode: AliasMode,
    /// プランから除外するバージョン
    pub excluded_versions: BTreeSet<String>,
}

impl PlannerConfig {
    pub fn new(target_repository: impl Into<String>) -> Self {
        Self {
            target_repository: target_repository.into(),
            runtime_image: "python".to_string(),
            runtime_version: DEFAULT_RUNTIME_VERSION.to_string(),
            variants: DEFAULT_VARIANTS.iter().map(|v| BaseVariant::new(*v)).collect(),
            alias_mode: AliasMode::default(),
            excluded_versions: BTreeSet::new(),
        }
    }

    /// バリアントに対応するベースイメージ参照
    ///
    /// 例: `slim` -> `python:3.6-slim`
    pub fn base_image_ref(&self, variant: &BaseVariant) -> String {
        format!(
            "{}:{}{}",
            self.runtime_image,
            self.runtime_version,
            variant.postfix()
        )
    }
}

/// バージョン列とバリアント集合からビルドプランを導出する
///
/// - latest は受け取ったバージョン列の最後の要素（インデックスの公開順）。
///   semver比較は行わない。
/// - 除外リストの適用は latest の決定より前。最新バージョンを除外した場合は
///   その前のバージョンが latest になる。
/// - 反復順はバージョン外側・バリアント内側。同一バージョンのビルドが
///   時間的に近くなる。
pub fn plan(config: &PlannerConfig, versions: &[String]) -> Result<Vec<BuildTask>> {
    if config.target_repository.is_empty() {
        return Err(ConfigError::EmptyRepository);
    }
    if versions.is_empty() {
        return Err(ConfigError::NoVersions);
    }

    let versions: Vec<&String> = versions
        .iter()
        .filter(|v| !config.excluded_versions.contains(v.as_str()))
        .collect();
    let Some(latest) = versions.last().copied() else {
        return Err(ConfigError::AllVersionsExcluded);
    };

    // バリアントは集合として扱う（順序は維持しつつ重複を除去）
    let mut seen = BTreeSet::new();
    let variants: Vec<&BaseVariant> = config
        .variants
        .iter()
        .filter(|v| seen.insert(v.name().to_string()))
        .collect();

    let mut tasks = Vec::with_capacity(versions.len() * variants.len());
    for version in &versions {
        for variant in &variants {
            let primary_tag = format!("{}{}", version, variant.postfix());
            tasks.push(BuildTask {
                version: (*version).clone(),
                variant: (*variant).clone(),
                fully_qualified_tag: format!("{}:{}", config.target_repository, primary_tag),
                primary_tag,
                base_image_ref: config.base_image_ref(variant),
                alias_tags: alias_tags(config.alias_mode, version, latest, variant),
            });
        }
    }

    Ok(tasks)
}

/// タスクに付くエイリアスタグを決定する
///
/// ビルド結果には依存しない。プランの段階で確定する。
fn alias_tags(
    mode: AliasMode,
    version: &str,
    latest: &str,
    variant: &BaseVariant,
) -> Vec<String> {
    if version != latest {
        return vec![];
    }

    match mode {
        AliasMode::PerVariant => {
            if variant.is_default() {
                vec!["latest".to_string()]
            } else {
                vec![variant.name().to_string()]
            }
        }
        AliasMode::GlobalLatest => {
            if variant.is_default() {
                vec!["latest".to_string()]
            } else {
                vec![]
            }
        }
    }
}
