//! bollard による Docker エンジンバックエンド
//!
//! ビルドはコンテキストの tar.gz をストリームで送り、進捗ストリームから
//! エラーとイメージIDを拾う。pull / push も同じくストリーム消費。

use crate::backend::ImageBackend;
use crate::context;
use crate::error::{BackendError, Result};
use bollard::Docker;
use bollard::image::BuildImageOptions;
use futures_util::stream::StreamExt;
use std::collections::HashMap;
use std::path::Path;

/// ローカルのDockerデーモンを使うバックエンド
#[derive(Clone)]
pub struct DockerBackend {
    docker: Docker,
}

impl DockerBackend {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// ローカルデフォルト（socket / named pipe）で接続して作成
    pub fn connect() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }

    /// ビルド進捗の1メッセージを処理する
    ///
    /// エラーはここで拾って呼び出し側に返す。握りつぶさない。
    fn handle_build_output(
        output: bollard::models::BuildInfo,
        image_id: &mut Option<String>,
    ) -> Result<()> {
        if let Some(stream) = output.stream {
            // 並列ビルドの出力が混ざるため、raw 出力は debug ログに流す
            let line = stream.trim_end();
            if !line.is_empty() {
                tracing::debug!("{}", line);
            }
        }

        if let Some(error) = output.error {
            return Err(BackendError::BuildFailed(error));
        }

        if let Some(error_detail) = output.error_detail {
            let message = error_detail
                .message
                .unwrap_or_else(|| "Unknown build error".to_string());
            return Err(BackendError::BuildFailed(message));
        }

        if let Some(aux) = output.aux
            && let Some(id) = aux.id
        {
            *image_id = Some(id);
        }

        Ok(())
    }
}

impl ImageBackend for DockerBackend {
    /// ビルドストリームの `aux` から得たイメージID
    type Handle = String;

    async fn pull(&self, image: &str) -> Result<()> {
        let (image_name, tag) = parse_image_tag(image);

        let credentials = extract_registry(image).and_then(get_docker_credentials);

        #[allow(deprecated)]
        let options = bollard::image::CreateImageOptions {
            from_image: image_name,
            tag,
            ..Default::default()
        };

        #[allow(deprecated)]
        let mut stream = self.docker.create_image(Some(options), None, credentials);

        while let Some(info) = stream.next().await {
            let info = info.map_err(|e| BackendError::PullFailed {
                image: image.to_string(),
                message: e.to_string(),
            })?;
            if let Some(err) = info.error {
                return Err(BackendError::PullFailed {
                    image: image.to_string(),
                    message: err,
                });
            }
            if let Some(status) = info.status {
                tracing::debug!("{}: {}", image, status);
            }
        }

        Ok(())
    }

    async fn build(
        &self,
        context_path: &Path,
        tag: &str,
        build_args: &HashMap<String, String>,
    ) -> Result<String> {
        let context_data = context::create_context(context_path)?;

        let build_args_refs: HashMap<&str, &str> = build_args
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        // ベースイメージは事前の pull フェーズで取得済み
        let options = BuildImageOptions {
            dockerfile: "Dockerfile",
            t: tag,
            buildargs: build_args_refs,
            rm: true,
            forcerm: true,
            ..Default::default()
        };

        use bytes::Bytes;
        use http_body_util::{Either, Full};
        let body = Full::new(Bytes::from(context_data));
        let mut stream = self
            .docker
            .build_image(options, None, Some(Either::Left(body)));

        let mut image_id: Option<String> = None;
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(output) => Self::handle_build_output(output, &mut image_id)?,
                Err(e) => return Err(BackendError::DockerConnection(e)),
            }
        }

        image_id.ok_or_else(|| {
            BackendError::BuildFailed("build stream ended without an image id".to_string())
        })
    }

    async fn push(&self, repository: &str, tag: &str) -> Result<()> {
        validate_tag(tag)?;

        let credentials = extract_registry(repository).and_then(get_docker_credentials);

        #[allow(deprecated)]
        let options = bollard::image::PushImageOptions::<String> {
            tag: tag.to_string(),
        };

        #[allow(deprecated)]
        let mut stream = self.docker.push_image(repository, Some(options), credentials);

        let mut error_message: Option<String> = None;
        while let Some(result) = stream.next().await {
            match result {
                Ok(info) => {
                    if let Some(err) = info.error {
                        error_message = Some(err);
                    } else if let Some(status) = info.status {
                        tracing::debug!("{}:{}: {}", repository, tag, status);
                    }
                }
                Err(e) => {
                    return Err(BackendError::PushFailed {
                        message: e.to_string(),
                    });
                }
            }
        }

        if let Some(err) = error_message {
            return Err(BackendError::PushFailed { message: err });
        }

        Ok(())
    }

    async fn tag_and_push(&self, handle: &String, repository: &str, alias: &str) -> Result<()> {
        validate_tag(alias)?;

        #[allow(deprecated)]
        let options = bollard::image::TagImageOptions::<String> {
            repo: repository.to_string(),
            tag: alias.to_string(),
        };

        #[allow(deprecated)]
        self.docker
            .tag_image(handle, Some(options))
            .await
            .map_err(|e| BackendError::PushFailed {
                message: e.to_string(),
            })?;

        self.push(repository, alias).await
    }
}

/// イメージ名とタグを分離
/// 例: "python:3.6-slim" -> ("python", "3.6-slim")
///     "postgres" -> ("postgres", "latest")
pub fn parse_image_tag(image: &str) -> (&str, &str) {
    if let Some((name, tag)) = image.rsplit_once(':')
        && !tag.contains('/')
    {
        (name, tag)
    } else {
        (image, "latest")
    }
}

/// イメージ名からレジストリを抽出
///
/// 最初の `/` の前が `.` か `:` を含むときだけレジストリとみなす
/// （例: ghcr.io, localhost:5000）。Docker Hub の `owner/repo` は None。
pub fn extract_registry(image: &str) -> Option<&str> {
    let (first, _) = image.split_once('/')?;
    if first.contains('.') || first.contains(':') {
        Some(first)
    } else {
        None
    }
}

/// Docker config.json からレジストリの認証情報を取得
pub fn get_docker_credentials(registry: &str) -> Option<bollard::auth::DockerCredentials> {
    let home = std::env::var("HOME").ok()?;
    let config_path = format!("{}/.docker/config.json", home);
    let config_content = std::fs::read_to_string(&config_path).ok()?;
    let config: serde_json::Value = serde_json::from_str(&config_content).ok()?;

    let auths = config.get("auths")?.as_object()?;
    let auth_entry = auths.get(registry)?;
    let auth_b64 = auth_entry.get("auth")?.as_str()?;

    // Base64 デコード (username:password 形式)
    use base64::Engine;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(auth_b64)
        .ok()?;
    let auth_str = String::from_utf8(decoded).ok()?;
    let (username, password) = auth_str.split_once(':')?;

    Some(bollard::auth::DockerCredentials {
        username: Some(username.to_string()),
        password: Some(password.to_string()),
        serveraddress: Some(registry.to_string()),
        ..Default::default()
    })
}

/// タグのバリデーション
///
/// Docker タグの制約: 128文字以下、英数字・ピリオド・ハイフン・
/// アンダースコアのみ、先頭はピリオド・ハイフン不可。
pub fn validate_tag(tag: &str) -> Result<()> {
    if tag.is_empty() {
        return Err(BackendError::InvalidTag {
            tag: "(empty)".to_string(),
        });
    }

    if tag.len() > 128 {
        return Err(BackendError::InvalidTag {
            tag: format!("Tag too long ({} characters, max 128)", tag.len()),
        });
    }

    if tag.starts_with('.') || tag.starts_with('-') {
        return Err(BackendError::InvalidTag {
            tag: tag.to_string(),
        });
    }

    for c in tag.chars() {
        if !c.is_ascii_alphanumeric() && c != '.' && c != '-' && c != '_' {
            return Err(BackendError::InvalidTag {
                tag: format!("Invalid character '{}' in tag: {}", c, tag),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image_tag_with_tag() {
        assert_eq!(parse_image_tag("python:3.6-slim"), ("python", "3.6-slim"));
    }

    #[test]
    fn test_parse_image_tag_without_tag() {
        assert_eq!(parse_image_tag("postgres"), ("postgres", "latest"));
    }

    #[test]
    fn test_extract_registry() {
        assert_eq!(extract_registry("ghcr.io/org/app"), Some("ghcr.io"));
        assert_eq!(extract_registry("localhost:5000/app"), Some("localhost:5000"));
        assert_eq!(extract_registry("acme/pkg"), None);
        assert_eq!(extract_registry("python"), None);
    }

    #[test]
    fn test_validate_tag_accepts_matrix_tags() {
        assert!(validate_tag("1.2.0").is_ok());
        assert!(validate_tag("1.2.0-slim-jessie").is_ok());
        assert!(validate_tag("latest").is_ok());
    }

    #[test]
    fn test_validate_tag_rejects_empty() {
        assert!(matches!(
            validate_tag(""),
            Err(BackendError::InvalidTag { .. })
        ));
    }

    #[test]
    fn test_validate_tag_rejects_leading_separator() {
        assert!(validate_tag("-slim").is_err());
        assert!(validate_tag(".hidden").is_err());
    }

    #[test]
    fn test_validate_tag_rejects_bad_charset() {
        assert!(validate_tag("1.0+build").is_err());
        assert!(validate_tag("a b").is_err());
    }

    #[test]
    fn test_validate_tag_rejects_oversized() {
        let tag = "a".repeat(129);
        assert!(validate_tag(&tag).is_err());
    }
}
