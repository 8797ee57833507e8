//! ビルドマトリクスのオーケストレータ
//!
//! pull-all → build-all → push-all の3フェーズを厳密に順序付けて実行する。
//! フェーズ内はワーカー数を上限に並行し、失敗はタスク単位で隔離される。
//! 1タスクの失敗が残りのマトリクスを止めることはない。

use crate::backend::ImageBackend;
use crate::report::{MatrixReport, PullFailure, TaskReport, TaskStatus};
use futures_util::stream::{self, StreamExt};
use kasane_core::BuildTask;
use std::path::PathBuf;

/// ワーカープールのデフォルトサイズ
pub const DEFAULT_WORKERS: usize = 20;

/// プラン全体を実行するオーケストレータ
pub struct Orchestrator<B: ImageBackend> {
    backend: B,
    context: PathBuf,
    workers: usize,
}

impl<B: ImageBackend> Orchestrator<B> {
    pub fn new(backend: B, context: PathBuf) -> Self {
        Self {
            backend,
            context,
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// プラン全体を実行し、タスクごとの結果を集約して返す
    ///
    /// フェーズ間には明示的なバリアがある: 全 pull の完了後に最初の build が
    /// 始まり、全 build の完了後に最初の push が始まる。
    pub async fn run(&self, repository: &str, plan: &[BuildTask]) -> MatrixReport {
        let pull_failures = self.pull_bases(plan).await;

        // 各タスクは自分のスロットにちょうど1回書き込む
        let mut statuses: Vec<Option<TaskStatus>> = vec![None; plan.len()];
        let mut built: Vec<(usize, B::Handle)> = Vec::new();

        for (index, outcome) in self.build_all(plan).await {
            match outcome {
                Ok(handle) => built.push((index, handle)),
                Err(detail) => statuses[index] = Some(TaskStatus::BuildFailed { detail }),
            }
        }

        for (index, status) in self.push_all(repository, plan, built).await {
            statuses[index] = Some(status);
        }

        let tasks = plan
            .iter()
            .cloned()
            .zip(statuses)
            .map(|(task, status)| TaskReport {
                task,
                status: status.expect("every task reaches a terminal state"),
            })
            .collect();

        MatrixReport {
            tasks,
            pull_failures,
        }
    }

    /// フェーズ1: ベースイメージの pull（バリアントごとに1回）
    ///
    /// pull の失敗は実行を止めない。ベースが本当に使えなければ後続の
    /// ビルドが自分の BuildFailed を出す。
    async fn pull_bases(&self, plan: &[BuildTask]) -> Vec<PullFailure> {
        let mut bases: Vec<&str> = Vec::new();
        for task in plan {
            if !bases.contains(&task.base_image_ref.as_str()) {
                bases.push(&task.base_image_ref);
            }
        }

        stream::iter(bases)
            .map(|base| async move {
                tracing::info!("Pulling {}", base);
                match self.backend.pull(base).await {
                    Ok(()) => None,
                    Err(e) => {
                        tracing::warn!("PullError: {}", e);
                        Some(PullFailure {
                            image: base.to_string(),
                            detail: e.to_string(),
                        })
                    }
                }
            })
            .buffer_unordered(self.workers)
            .filter_map(|failure| async move { failure })
            .collect()
            .await
    }

    /// フェーズ2: 全タスクのビルド
    ///
    /// 完了順は不定のため、結果はプラン内の位置を添えて返す。
    async fn build_all(
        &self,
        plan: &[BuildTask],
    ) -> Vec<(usize, std::result::Result<B::Handle, String>)> {
        stream::iter(plan.iter().enumerate())
            .map(|(index, task)| async move {
                tracing::info!("Building {}...", task.primary_tag);
                match self
                    .backend
                    .build(&self.context, &task.fully_qualified_tag, &task.build_args())
                    .await
                {
                    Ok(handle) => (index, Ok(handle)),
                    Err(e) => {
                        tracing::error!("BuildError: {}", e);
                        (index, Err(e.to_string()))
                    }
                }
            })
            .buffer_unordered(self.workers)
            .collect()
            .await
    }

    /// フェーズ3: ビルド成功分のプッシュ
    async fn push_all(
        &self,
        repository: &str,
        plan: &[BuildTask],
        built: Vec<(usize, B::Handle)>,
    ) -> Vec<(usize, TaskStatus)> {
        stream::iter(built)
            .map(|(index, handle)| {
                let task = &plan[index];
                async move { (index, self.push_task(repository, task, &handle).await) }
            })
            .buffer_unordered(self.workers)
            .collect()
            .await
    }

    /// 1タスク分のプッシュ: primary → エイリアスの順
    ///
    /// エイリアスは primary の成功後にのみ、宣言順で試行する。
    async fn push_task(&self, repository: &str, task: &BuildTask, handle: &B::Handle) -> TaskStatus {
        tracing::info!("Pushing {}...", task.primary_tag);
        if let Err(e) = self.backend.push(repository, &task.primary_tag).await {
            tracing::error!("PushError: {}", e);
            return TaskStatus::PushFailed {
                pushed: vec![],
                failed_tag: task.primary_tag.clone(),
                detail: e.to_string(),
            };
        }

        let mut pushed = vec![task.primary_tag.clone()];
        for alias in &task.alias_tags {
            tracing::info!("Pushing {}...", alias);
            if let Err(e) = self.backend.tag_and_push(handle, repository, alias).await {
                tracing::error!("PushError: {}", e);
                return TaskStatus::PushFailed {
                    pushed,
                    failed_tag: alias.clone(),
                    detail: e.to_string(),
                };
            }
            pushed.push(alias.clone());
        }

        TaskStatus::Pushed {
            aliases: task.alias_tags.clone(),
        }
    }
}
