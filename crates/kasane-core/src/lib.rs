//! kasane-core — ビルドマトリクスのモデルとタグプランナー
//!
//! パッケージの公開バージョン × ベースイメージバリアントの直積から
//! ビルドプラン（タグ・ベースイメージ・エイリアスを持つタスク列）を導出する。
//! このcrateは純粋なロジックのみを持ち、I/Oは行わない。

pub mod error;
pub mod model;
pub mod planner;

pub use error::*;
pub use model::*;
pub use planner::*;
