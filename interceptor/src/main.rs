mod console;

use interceptor_cache::CacheCoordinator;
use interceptor_config::InterceptorConfig;
use tokio::io::BufReader;
use tracing::info;
use utils::init_tracing;

const DEFAULT_CONFIG: &str = "interceptor.conf";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());

    let cfg = InterceptorConfig::from_file_or_default(&config_path);
    init_tracing(cfg.global().log_level());
    cfg.print();

    let running = CacheCoordinator::new(cfg.cache()).start();
    println!("{}", console::USAGE);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    console::run(&running.handle(), stdin, &mut stdout).await?;

    let entries = running.shutdown().await?;
    info!(target: "interceptor::console", entries, "Cache shut down");

    Ok(())
}
