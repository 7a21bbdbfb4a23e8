use clap::Parser;
use notegraph::cli::{self, Cli};
use tracing::error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();

    // 初始化日志
    notegraph::init(cli.verbose);

    // 执行命令
    if let Err(e) = cli::commands::run(cli).await {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}
