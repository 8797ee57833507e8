//! ビルドコンテキストの作成
//!
//! コンテキストディレクトリを tar.gz アーカイブにまとめてエンジンに渡す。
//! Dockerfile はコンテキスト直下にある前提。

use crate::error::{BackendError, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::path::Path;
use tar::Builder;

const MAX_CONTEXT_SIZE: usize = 500 * 1024 * 1024; // 500MB

/// コンテキストディレクトリを tar.gz アーカイブとして作成
pub fn create_context(context_path: &Path) -> Result<Vec<u8>> {
    if !context_path.is_dir() {
        return Err(BackendError::ContextNotFound(context_path.to_path_buf()));
    }

    tracing::debug!("Creating build context from: {}", context_path.display());

    let mut archive_data = Vec::new();
    {
        let encoder = GzEncoder::new(&mut archive_data, Compression::default());
        let mut tar = Builder::new(encoder);
        tar.append_dir_all(".", context_path)?;
        tar.finish()?;
    }

    tracing::debug!("Build context created: {} bytes", archive_data.len());

    if archive_data.len() > MAX_CONTEXT_SIZE {
        tracing::warn!(
            "ビルドコンテキストが大きすぎます（{}MB）。.dockerignore での除外を推奨します。",
            archive_data.len() / 1024 / 1024
        );
    }

    Ok(archive_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_create_context_contains_dockerfile() {
        let temp_dir = tempdir().unwrap();
        fs::write(
            temp_dir.path().join("Dockerfile"),
            "ARG BASE\nFROM ${BASE}\nARG VERSION\n",
        )
        .unwrap();
        fs::write(temp_dir.path().join("entrypoint.sh"), "#!/bin/sh\n").unwrap();

        let archive = create_context(temp_dir.path()).unwrap();
        assert!(!archive.is_empty());

        // tar.gz として展開できること
        let extract_dir = tempdir().unwrap();
        let decoder = flate2::read::GzDecoder::new(std::io::Cursor::new(archive));
        let mut tar = tar::Archive::new(decoder);
        tar.unpack(extract_dir.path()).unwrap();

        assert!(extract_dir.path().join("Dockerfile").exists());
        assert!(extract_dir.path().join("entrypoint.sh").exists());
    }

    #[test]
    fn test_create_context_missing_dir() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("nope");

        let result = create_context(&missing);
        assert!(matches!(result, Err(BackendError::ContextNotFound(_))));
    }
}
