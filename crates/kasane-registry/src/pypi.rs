//! パッケージインデックス（PyPI）クライアント
//!
//! `GET {index}/{package}/json` の `releases` オブジェクトのキーを
//! 公開バージョン一覧として返す。返却順はインデックスの応答順のまま。
//! 呼び出し側は semver 順を仮定してはならない。

use crate::error::{RegistryError, Result};

/// デフォルトのインデックスURL
pub const DEFAULT_INDEX_URL: &str = "https://pypi.python.org/pypi";

/// パッケージの公開バージョンを問い合わせるクライアント
pub struct VersionSource {
    client: reqwest::Client,
    index_url: String,
}

impl VersionSource {
    pub fn new() -> Self {
        Self::with_index_url(DEFAULT_INDEX_URL)
    }

    /// インデックスURLを差し替えて作成（テスト・ミラー用）
    pub fn with_index_url(index_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            index_url: index_url.into(),
        }
    }

    /// 公開バージョン一覧を取得する
    ///
    /// 非2xx応答と不正なペイロードはどちらも `RegistryError`。
    /// プランの入力になるため、このエラーは実行全体を止める。
    pub async fn fetch(&self, package: &str) -> Result<Vec<String>> {
        let url = format!("{}/{}/json", self.index_url, package);
        tracing::info!("Fetching versions for {}", package);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(RegistryError::Status {
                subject: package.to_string(),
                status: response.status(),
            });
        }

        let payload: serde_json::Value = response.json().await?;
        parse_versions(&payload)
    }
}

impl Default for VersionSource {
    fn default() -> Self {
        Self::new()
    }
}

/// インデックス応答から `releases` のキーをドキュメント順で取り出す
pub fn parse_versions(payload: &serde_json::Value) -> Result<Vec<String>> {
    let releases = payload
        .get("releases")
        .and_then(|r| r.as_object())
        .ok_or_else(|| {
            RegistryError::MalformedPayload("missing 'releases' object".to_string())
        })?;

    Ok(releases.keys().cloned().collect())
}
