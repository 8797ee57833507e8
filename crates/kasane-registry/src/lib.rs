//! kasane-registry — パッケージインデックスとイメージレジストリのクライアント
//!
//! - **pypi**: パッケージの公開バージョン一覧の取得（プランの入力）
//! - **tags**: イメージレジストリの公開済みタグ一覧と差分計算

pub mod error;
pub mod pypi;
pub mod tags;

pub use error::*;
pub use pypi::*;
pub use tags::*;
