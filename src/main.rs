// ==========================================
// 商品目录后台 - 命令行主入口
// ==========================================
// 子命令: import / export / request / delete / products / requests / config
// 输出: 结果以 JSON 写到 stdout，错误以 JSON 写到 stderr
// ==========================================

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use storefront_interchange::api::{ApiError, ApiResult};
use storefront_interchange::app::{get_default_db_path, AppState};
use storefront_interchange::domain::{ImportMode, RequestPriority, Requester};
use storefront_interchange::engine::RequestOptions;
use storefront_interchange::importer::CancelFlag;
use storefront_interchange::logging;

#[derive(Debug, Parser)]
#[command(name = "storefront-interchange", about = "商品 CSV 导入导出与请购合并", long_about = None)]
struct Cli {
    /// SQLite 数据库路径（默认读取 STOREFRONT_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// 从 .csv 文件导入商品
    Import(ImportArgs),
    /// 导出启用商品为 CSV
    Export(ExportArgs),
    /// 提交请购（合并到已有未关闭请购单或新建）
    Request(RequestArgs),
    /// 停用商品（软删除）
    Delete(DeleteArgs),
    /// 列出商品
    Products(ListArgs),
    /// 列出请购单（最新优先）
    Requests(ListArgs),
    /// 写入配置项
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ImportArgs {
    /// CSV 文件路径
    file: PathBuf,

    /// 按固定列序导入（首行丢弃）
    #[arg(long, conflicts_with = "header")]
    positional: bool,

    /// 按表头导入
    #[arg(long)]
    header: bool,
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// 输出文件路径（默认当前目录下的导出文件名）
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RequestArgs {
    #[arg(long)]
    sku: String,

    #[arg(long)]
    quantity: i64,

    /// 提交人姓名
    #[arg(long)]
    name: String,

    /// 提交人邮箱
    #[arg(long)]
    email: String,

    /// 提交人用户 ID
    #[arg(long)]
    user_id: Option<String>,

    /// 附加说明
    #[arg(long)]
    notes: Option<String>,

    /// 优先级: low / medium / high / urgent
    #[arg(long)]
    priority: Option<String>,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    #[arg(long)]
    id: String,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// 包含已停用商品 / 已关闭请购单
    #[arg(long)]
    all: bool,
}

#[derive(Debug, Args)]
struct ConfigArgs {
    key: String,
    value: String,
}

#[tokio::main]
async fn main() {
    logging::init();

    let cli = Cli::parse();
    let db_path = cli
        .db
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(get_default_db_path);

    let state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(2);
        }
    };

    if let Err(e) = run(cli.command, &state).await {
        eprintln!("错误: {:#}", e);
        process::exit(1);
    }
}

async fn run(command: Commands, state: &AppState) -> anyhow::Result<()> {
    let today = Local::now().date_naive();

    match command {
        Commands::Import(args) => {
            let mode = if args.positional {
                Some(ImportMode::Positional)
            } else if args.header {
                Some(ImportMode::Header)
            } else {
                None
            };

            let cancel = CancelFlag::new();
            let signal_flag = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("收到中断信号，当前批次完成后停止导入");
                    signal_flag.cancel();
                }
            });

            let result = state
                .import_api
                .import_file(&args.file, mode, &cancel)
                .await;
            print_result(result)
        }
        Commands::Export(args) => {
            let result = state.export_api.export_products(today).await;
            let file = match result {
                Ok(file) => file,
                Err(e) => return print_result::<()>(Err(e)),
            };

            let out = args.out.unwrap_or_else(|| PathBuf::from(&file.file_name));
            std::fs::write(&out, &file.bytes)
                .with_context(|| format!("写入导出文件失败: {}", out.display()))?;
            print_json(&serde_json::json!({
                "path": out.display().to_string(),
                "file": file,
            }))
        }
        Commands::Request(args) => {
            let priority = match args.priority.as_deref() {
                Some(raw) => match RequestPriority::from_db_str(raw) {
                    Some(p) => Some(p),
                    None => {
                        return print_result::<()>(Err(ApiError::InvalidInput(format!(
                            "无效优先级: {}",
                            raw
                        ))))
                    }
                },
                None => None,
            };

            let requester = Requester {
                name: args.name,
                email: args.email,
                id: args.user_id,
            };
            let options = RequestOptions {
                priority,
                notes: args.notes,
            };
            let result = state
                .request_api
                .request_by_sku(&args.sku, args.quantity, &requester, &options, today)
                .await;
            print_result(result)
        }
        Commands::Delete(args) => {
            let result = state.product_api.delete_product(&args.id).await;
            print_result(result.map(|_| serde_json::json!({ "deleted": args.id })))
        }
        Commands::Products(args) => {
            let result = state.product_api.list_products(!args.all).await;
            print_result(result)
        }
        Commands::Requests(args) => {
            let result = state.request_api.list_requests(!args.all).await;
            print_result(result)
        }
        Commands::Config(args) => {
            let result = state
                .config_manager
                .set_config_value(&args.key, &args.value)
                .map_err(ApiError::from)
                .and_then(|_| {
                    state
                        .config_manager
                        .get_config_snapshot()
                        .map_err(ApiError::from)
                });
            match result {
                Ok(snapshot) => {
                    println!("{}", snapshot);
                    Ok(())
                }
                Err(e) => print_result::<()>(Err(e)),
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 成功时输出结果 JSON；失败时输出错误 JSON 并以非零码退出
fn print_result<T: Serialize>(result: ApiResult<T>) -> anyhow::Result<()> {
    match result {
        Ok(value) => print_json(&value),
        Err(e) => {
            eprintln!("{}", serde_json::to_string_pretty(&e.to_response())?);
            process::exit(1);
        }
    }
}
