//! 実行結果の集約
//!
//! 実行は常にマトリクス全体を試行する。成否はタスク単位で記録し、
//! 終了コードの重さの判断は呼び出し側に委ねる。

use kasane_core::BuildTask;
use serde::Serialize;

/// タスクの終端状態
///
/// 状態遷移: Planned → Building → {Built | BuildFailed}、
/// Built → Pushing → {Pushed | PushFailed}。同一実行内でのリトライはない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum TaskStatus {
    /// primary と全エイリアスのプッシュに成功
    Pushed { aliases: Vec<String> },
    /// ビルドに失敗。プッシュは試行されない。
    BuildFailed { detail: String },
    /// プッシュのいずれかに失敗。primary が成功していれば `pushed` に残る
    /// （部分的な成功はそのまま表現する）。
    PushFailed {
        pushed: Vec<String>,
        failed_tag: String,
        detail: String,
    },
}

impl TaskStatus {
    pub fn is_failure(&self) -> bool {
        !matches!(self, TaskStatus::Pushed { .. })
    }
}

/// 1タスク分の結果
#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub task: BuildTask,
    pub status: TaskStatus,
}

/// ベースイメージの pull 失敗（実行は止めない）
#[derive(Debug, Clone, Serialize)]
pub struct PullFailure {
    pub image: String,
    pub detail: String,
}

/// マトリクス全体の実行結果
#[derive(Debug, Default, Serialize)]
pub struct MatrixReport {
    /// プラン順のタスク結果
    pub tasks: Vec<TaskReport>,
    pub pull_failures: Vec<PullFailure>,
}

impl MatrixReport {
    /// 失敗で終端したタスク
    pub fn failures(&self) -> impl Iterator<Item = &TaskReport> {
        self.tasks.iter().filter(|report| report.status.is_failure())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}
