use clap::Parser;
use kiwify::config::Config;
use kiwify::mcp::catalog::list_tools;
use kiwify::services::logger::{LogLevel, Logger};

#[derive(Debug, Parser)]
#[command(name = "mcp-kiwify", version, about = "MCP server for the Kiwify public API")]
struct Cli {
    /// error, warn, info or debug; overrides KIWIFY_LOG_LEVEL / LOG_LEVEL.
    #[arg(long, value_parser = parse_level)]
    log_level: Option<LogLevel>,

    /// Print the tool catalog as JSON and exit.
    #[arg(long)]
    list_tools: bool,
}

fn parse_level(raw: &str) -> Result<LogLevel, String> {
    LogLevel::parse(raw).ok_or_else(|| format!("unknown log level: {}", raw))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.list_tools {
        match serde_json::to_string_pretty(&list_tools()) {
            Ok(text) => println!("{}", text),
            Err(err) => {
                eprintln!("mcp-kiwify: {}", err);
                std::process::exit(1);
            }
        }
        return;
    }

    let mut logger = Logger::new("kiwify");
    if let Some(level) = cli.log_level {
        logger = logger.with_level(level);
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = kiwify::mcp::server::run_stdio(&config, logger.clone()).await {
        logger.error(&format!("Fatal error: {}", err), err.details.as_ref());
        std::process::exit(1);
    }
}
