pub mod cli;
pub mod core;
pub mod publish;
pub mod storage;
pub mod vcs;

use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时 `verbose` 决定默认级别。已安装订阅者时保持原样
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        tracing::debug!("Tracing subscriber already installed");
    }
}
