//! イメージバックエンドの抽象
//!
//! オーケストレータはこのトレイト越しにのみコンテナエンジンへ触れる。
//! テストでは呼び出しを記録するフェイク実装に差し替える。

use crate::error::Result;
use std::collections::HashMap;
use std::path::Path;

/// コンテナエンジンに対する操作
///
/// どの操作も低速・ネットワーク依存でありうる。リトライはバックエンド側
/// では行わない。
#[allow(async_fn_in_trait)]
pub trait ImageBackend {
    /// ビルド済みイメージへの不透明なハンドル
    type Handle;

    /// ベースイメージを取得する。冪等。
    async fn pull(&self, image: &str) -> Result<()>;

    /// コンテキストとタグからイメージをビルドし、ハンドルを返す。
    /// 失敗の詳細は必ずエラーに載せて返す。
    async fn build(
        &self,
        context: &Path,
        tag: &str,
        build_args: &HashMap<String, String>,
    ) -> Result<Self::Handle>;

    /// タグをリポジトリにプッシュする
    async fn push(&self, repository: &str, tag: &str) -> Result<()>;

    /// ビルド済みハンドルにエイリアスタグを付けてプッシュする（再ビルドなし）
    async fn tag_and_push(&self, handle: &Self::Handle, repository: &str, alias: &str)
    -> Result<()>;
}
