use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use react_agent::agent::{AgentConfig, ReActAgent, DEFAULT_MODEL};
use react_agent::cli::Console;
use react_agent::config::Settings;
use react_agent::core::AgentError;
use react_agent::helpers::{resolve_log_path, Transcript};
use react_agent::llm::OpenAiProvider;
use react_agent::logging;
use react_agent::tools::{default_tools, ToolRegistry};

const EXIT_FAILURE: i32 = 1;
/// Operator declined or interrupted the run
const EXIT_CANCELLED: i32 = 130;

/// ReAct agent for local projects and DM databases
#[derive(Parser, Debug)]
#[command(name = "react-agent", version)]
struct Cli {
    /// 项目根目录
    #[arg(long, default_value = ".")]
    project: PathBuf,

    /// 模型名称
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// 直接传入问题，留空则交互式输入
    #[arg(long, default_value = "")]
    question: String,

    /// 日志输出文件路径（默认写入项目目录 agent_run_时间.log）
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// 诊断日志文件路径
    #[arg(long)]
    trace_file: Option<PathBuf>,

    /// 输出调试级诊断日志
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let console = Console::new();

    if let Err(e) = run(cli, console).await {
        // AgentError already renders its cause
        let (message, code) = match e.downcast_ref::<AgentError>() {
            Some(err) if err.is_cancellation() => (err.to_string(), EXIT_CANCELLED),
            Some(err) => (err.to_string(), EXIT_FAILURE),
            None => (format!("{:#}", e), EXIT_FAILURE),
        };
        Console::print_error(&message);
        std::process::exit(code);
    }
}

async fn run(cli: Cli, mut console: Console) -> Result<()> {
    let _guard = logging::init_logging(cli.verbose, cli.trace_file.as_deref())?;
    tracing::info!("=== ReAct Agent Starting ===");

    let project_dir = std::path::absolute(&cli.project)
        .with_context(|| format!("解析项目路径失败: {}", cli.project.display()))?;

    let log_path = resolve_log_path(&project_dir, cli.log_file.as_deref());
    let transcript = Arc::new(Transcript::open(&log_path).context("初始化日志失败")?);
    transcript.record("日志", &format!("输出将同步保存到 {}", log_path.display()));

    let settings = Settings::load(&project_dir)?;

    let question = console.read_question(&cli.question).await?;
    transcript.record("问题", &question);

    let llm = Arc::new(OpenAiProvider::from_settings(&settings));
    let tools = ToolRegistry::from_tools(default_tools(&project_dir, &settings.disql_path));
    tracing::info!("Registered {} tools", tools.len());
    let config = AgentConfig::new(cli.model).with_project_dir(&project_dir);

    let mut agent = ReActAgent::new(config, llm, tools, Box::new(console), transcript);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling run");
            ctrl_c.cancel();
        }
    });

    let answer = agent.run(&question, &cancel).await?;
    Console::print_answer(&answer);

    tracing::info!("=== ReAct Agent Shutting Down ===");
    Ok(())
}
