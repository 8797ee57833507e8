//! レジストリクライアントのエラー型

/// バージョン・タグ発見のエラー
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("インデックスへのリクエストに失敗しました: {0}")]
    Request(#[from] reqwest::Error),

    #[error("'{subject}' の取得がステータス {status} で失敗しました")]
    Status {
        subject: String,
        status: reqwest::StatusCode,
    },

    #[error("応答の形式が不正です: {0}")]
    MalformedPayload(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
