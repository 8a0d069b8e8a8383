use clap::Parser;
use repo_stats::commands::execute_collect;
use repo_stats::core::{
    config::Config, exec::CommandRunner, print_error, print_failures, RepoStatsError,
};

#[derive(Parser)]
#[command(name = "repo-stats")]
#[command(about = "Report cached lines-of-code metrics for a remote git repository")]
#[command(version)]
struct Cli {
    /// Repository URL, with or without a trailing .git
    url: String,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Mirror as <org>/<repo> instead of <org>-<repo>
    #[arg(long)]
    hierarchy: bool,

    /// Keep the mirror after counting (same as SKIP_CLEANUP)
    #[arg(long, conflicts_with = "force_cleanup")]
    skip_cleanup: bool,

    /// Delete the mirror after counting whatever its size
    #[arg(long)]
    force_cleanup: bool,
}

fn main() {
    let cli = Cli::parse();

    // Configure logging based on --debug flag; RUST_LOG still wins
    let level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            print_error(&e.to_string());
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32, RepoStatsError> {
    let mut config = Config::from_env()?;
    config.follow_hierarchy |= cli.hierarchy;
    config.skip_cleanup |= cli.skip_cleanup;
    config.force_cleanup = cli.force_cleanup;

    let runner = CommandRunner::from_env();
    let report = execute_collect(&cli.url, &config, &runner)?;

    println!("{}", serde_json::to_string(&report.metrics)?);

    if report.is_errored() {
        print_failures(&cli.url, &report.failures);
    }
    Ok(report.exit_code())
}
