mod commands;

use clap::{Args, Parser, Subcommand};
use kasane_core::{AliasMode, BaseVariant, PlannerConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kasane")]
#[command(about = "重ねて、配る。バージョン × ベースのビルドマトリクス。", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// マトリクスを定義する共通引数
#[derive(Args)]
struct MatrixArgs {
    /// プッシュ先リポジトリ（例: acme/pkg）
    #[arg(long, env = "IMAGE")]
    image: String,
    /// パッケージ名
    #[arg(long, env = "PACKAGE")]
    package: String,
    /// ベースイメージ名
    #[arg(long, default_value = "python")]
    runtime_image: String,
    /// ベースイメージのバージョン
    #[arg(long, default_value = "3.6")]
    runtime_version: String,
    /// ビルドするバリアント（複数指定可。指定するとデフォルト集合を置き換える）
    #[arg(long = "variant")]
    variants: Vec<String>,
    /// デフォルトバリアントの latest にのみエイリアスを付ける
    #[arg(long)]
    global_latest: bool,
    /// プランから除外するバージョン（複数指定可）
    #[arg(long = "exclude")]
    excluded: Vec<String>,
}

impl MatrixArgs {
    fn planner_config(&self) -> PlannerConfig {
        let mut config = PlannerConfig::new(self.image.clone());
        config.runtime_image = self.runtime_image.clone();
        config.runtime_version = self.runtime_version.clone();
        if !self.variants.is_empty() {
            config.variants = self.variants.iter().map(BaseVariant::new).collect();
        }
        if self.global_latest {
            config.alias_mode = AliasMode::GlobalLatest;
        }
        config.excluded_versions = self.excluded.iter().cloned().collect();
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// マトリクス全体をビルドしてプッシュ
    Build {
        #[command(flatten)]
        matrix: MatrixArgs,
        /// ワーカープールのサイズ
        #[arg(long, env = "THREADS", default_value_t = kasane_build::DEFAULT_WORKERS)]
        threads: usize,
        /// ビルドコンテキストのディレクトリ
        #[arg(long, default_value = ".")]
        context: PathBuf,
        /// レジストリに公開済みのバージョンをスキップする
        #[arg(long)]
        skip_existing: bool,
        /// プランの表示のみでエンジンには触れない
        #[arg(long)]
        dry_run: bool,
        /// 実行結果をJSONで出力する
        #[arg(long)]
        json: bool,
    },
    /// ビルドプランを表示（エンジンには触れない）
    Plan {
        #[command(flatten)]
        matrix: MatrixArgs,
    },
    /// パッケージの公開バージョン一覧を表示
    Versions {
        /// パッケージ名
        #[arg(long, env = "PACKAGE")]
        package: String,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            matrix,
            threads,
            context,
            skip_existing,
            dry_run,
            json,
        } => {
            commands::build::handle(
                matrix.planner_config(),
                &matrix.package,
                threads,
                context,
                skip_existing,
                dry_run,
                json,
            )
            .await?;
        }
        Commands::Plan { matrix } => {
            commands::plan::handle(matrix.planner_config(), &matrix.package).await?;
        }
        Commands::Versions { package } => {
            commands::versions::handle(&package).await?;
        }
        Commands::Version => {
            println!("kasane {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
