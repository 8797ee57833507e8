//! kasane-build — イメージバックエンドとマトリクスオーケストレータ
//!
//! コンテナエンジンへの操作（pull / build / push / tag）を `ImageBackend`
//! トレイトに閉じ込め、その上でビルドプラン全体を3フェーズ
//! （pull-all → build-all → push-all）で実行する。

pub mod backend;
pub mod context;
pub mod docker;
pub mod error;
pub mod orchestrator;
pub mod report;

pub use backend::ImageBackend;
pub use docker::DockerBackend;
pub use error::{BackendError, Result};
pub use orchestrator::{DEFAULT_WORKERS, Orchestrator};
pub use report::{MatrixReport, PullFailure, TaskReport, TaskStatus};
