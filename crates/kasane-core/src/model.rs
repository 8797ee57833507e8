//! モデル定義
//!
//! (version, variant) の組を1つのビルドタスクとして表現する。
//! タスクはプランナーが生成した後は不変で、外部リソースを所有しない。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// ベースイメージのバリアント（例: `slim`, `alpine`）
///
/// 空文字列はデフォルトバリアントを表し、タグに postfix が付かない。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseVariant(String);

impl BaseVariant {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// デフォルトバリアント（postfix なし）
    pub fn default_variant() -> Self {
        Self(String::new())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0.is_empty()
    }

    /// タグやベースイメージ名に付く postfix
    ///
    /// 例: `slim` -> `-slim`、デフォルトバリアント -> ``
    pub fn postfix(&self) -> String {
        if self.0.is_empty() {
            String::new()
        } else {
            format!("-{}", self.0)
        }
    }
}

impl fmt::Display for BaseVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            write!(f, "(default)")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<&str> for BaseVariant {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// latest エイリアスの付け方
///
/// 歴代スクリプトで挙動が分かれていたため、明示的な設定として持つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AliasMode {
    /// バリアントごとに最新バージョンへエイリアスを付ける（デフォルト）。
    /// デフォルトバリアントは `latest`、それ以外はバリアント名がエイリアスになる。
    #[default]
    PerVariant,
    /// デフォルトバリアントの最新バージョンにのみ `latest` を付ける。
    /// 名前付きバリアントはエイリアスを持たない。
    GlobalLatest,
}

/// 1つの (version, variant) 組に対するビルドタスク
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTask {
    /// パッケージインデックスが公開しているバージョン識別子
    pub version: String,
    /// ベースイメージのバリアント
    pub variant: BaseVariant,
    /// `{version}{postfix}` 形式のタグ
    pub primary_tag: String,
    /// `{repository}:{primary_tag}`
    pub fully_qualified_tag: String,
    /// ビルド時に渡すベースイメージ参照（例: `python:3.6-slim`）
    pub base_image_ref: String,
    /// 同じイメージを指す追加タグ。最新バージョンのタスクのみ非空。
    pub alias_tags: Vec<String>,
}

impl BuildTask {
    /// ビルドに渡す build-arg を導出する
    pub fn build_args(&self) -> HashMap<String, String> {
        HashMap::from([
            ("VERSION".to_string(), self.version.clone()),
            ("BASE".to_string(), self.base_image_ref.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_postfix() {
        assert_eq!(BaseVariant::new("slim").postfix(), "-slim");
        assert_eq!(BaseVariant::default_variant().postfix(), "");
    }

    #[test]
    fn test_variant_default_detection() {
        assert!(BaseVariant::new("").is_default());
        assert!(!BaseVariant::new("alpine").is_default());
    }

    #[test]
    fn test_build_args_carry_version_and_base() {
        let task = BuildTask {
            version: "1.2.0".to_string(),
            variant: BaseVariant::new("slim"),
            primary_tag: "1.2.0-slim".to_string(),
            fully_qualified_tag: "acme/pkg:1.2.0-slim".to_string(),
            base_image_ref: "python:3.6-slim".to_string(),
            alias_tags: vec![],
        };

        let args = task.build_args();
        assert_eq!(args.get("VERSION").map(String::as_str), Some("1.2.0"));
        assert_eq!(args.get("BASE").map(String::as_str), Some("python:3.6-slim"));
    }

    #[test]
    fn test_task_serialization() {
        let task = BuildTask {
            version: "0.9".to_string(),
            variant: BaseVariant::default_variant(),
            primary_tag: "0.9".to_string(),
            fully_qualified_tag: "acme/pkg:0.9".to_string(),
            base_image_ref: "python:3.6".to_string(),
            alias_tags: vec!["latest".to_string()],
        };

        let json = serde_json::to_string(&task).unwrap();
        let back: BuildTask = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
        // BaseVariant は transparent にシリアライズされる
        assert!(json.contains("\"variant\":\"\""));
    }
}
