//! イメージレジストリのタグ一覧
//!
//! 公開済みタグとバージョン一覧の差分計算に使う。タグ一覧は補助情報の
//! ため、取得や解析の失敗は空リストに degrade し、実行は止めない。

use crate::error::{RegistryError, Result};
use serde::Deserialize;
use std::collections::HashSet;

/// デフォルトのレジストリURL
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.hub.docker.com/v2/repositories";

/// タグ一覧の1エントリ
#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// 公開済みタグを問い合わせるクライアント
pub struct TagLister {
    client: reqwest::Client,
    registry_url: String,
}

impl TagLister {
    pub fn new() -> Self {
        Self::with_registry_url(DEFAULT_REGISTRY_URL)
    }

    /// レジストリURLを差し替えて作成（テスト・private registry用）
    pub fn with_registry_url(registry_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            registry_url: registry_url.into(),
        }
    }

    /// イメージの公開済みタグ一覧を取得する
    ///
    /// ネットワーク・解析の失敗は warn ログを出して空リストとして扱う。
    pub async fn list_tags(&self, image: &str) -> Vec<String> {
        match self.try_list_tags(image).await {
            Ok(tags) => tags,
            Err(e) => {
                tracing::warn!("タグ一覧を取得できないため空として扱います: {}", e);
                vec![]
            }
        }
    }

    async fn try_list_tags(&self, image: &str) -> Result<Vec<String>> {
        let url = format!("{}/{}/tags", self.registry_url, image);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(RegistryError::Status {
                subject: image.to_string(),
                status: response.status(),
            });
        }

        let entries: Vec<TagEntry> = response
            .json()
            .await
            .map_err(|e| RegistryError::MalformedPayload(e.to_string()))?;

        Ok(entries.into_iter().map(|entry| entry.name).collect())
    }
}

impl Default for TagLister {
    fn default() -> Self {
        Self::new()
    }
}

/// 公開済みタグに存在しないバージョンを返す
///
/// 既にレジストリに存在するバージョンのビルドをスキップするための差分。
/// 入力の順序は維持される。
pub fn missing_versions(versions: &[String], published_tags: &[String]) -> Vec<String> {
    let published: HashSet<&str> = published_tags.iter().map(String::as_str).collect();
    versions
        .iter()
        .filter(|version| !published.contains(version.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_versions_diff() {
        let versions = strings(&["1.0", "1.1", "2.0"]);
        let tags = strings(&["1.0", "1.0-slim", "latest"]);

        let missing = missing_versions(&versions, &tags);
        assert_eq!(missing, strings(&["1.1", "2.0"]));
    }

    #[test]
    fn test_missing_versions_empty_tag_list() {
        // タグ取得の degrade（空リスト）では何もスキップされない
        let versions = strings(&["1.0", "1.1"]);
        let missing = missing_versions(&versions, &[]);
        assert_eq!(missing, versions);
    }

    #[test]
    fn test_missing_versions_all_published() {
        let versions = strings(&["1.0"]);
        let tags = strings(&["1.0"]);
        assert!(missing_versions(&versions, &tags).is_empty());
    }

    #[test]
    fn test_tag_entry_parsing() {
        let body = r#"[{"name": "1.0", "last_updated": "2018-01-01"}, {"name": "latest"}]"#;
        let entries: Vec<TagEntry> = serde_json::from_str(body).unwrap();
        let names: Vec<String> = entries.into_iter().map(|e| e.name).collect();
        assert_eq!(names, strings(&["1.0", "latest"]));
    }
}
