use clap::{Parser, Subcommand};
use pagekit::cache::FileStore;
use pagekit::fetch::HttpSource;
use pagekit::loader::FeedLoader;
use pagekit::{config, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pagekit")]
#[command(about = "Prerender the site's feed panel")]
#[command(long_about = "\
Prerender the site's feed panel

Runs the same load the page does: a cached post list younger than
feed.cache_minutes is reused, otherwise the feed is fetched through the
proxy, parsed, cached, and rendered. The HTML fragment is written to
stdout; a summary goes to stderr.

Settings come from config.toml in the --config directory (optional).
Run 'pagekit gen-config' to print a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// Directory holding cached feed entries
    #[arg(long, default_value = ".pagekit-state", global = true)]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the feed and print the rendered fragment
    Feed,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pagekit=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Feed => {
            let site_config = config::load_config(&cli.config)?;
            let cache_key = site_config.feed.cache_key.clone();
            let store = FileStore::new(&cli.state_dir);
            let mut loader = FeedLoader::new(site_config.feed, store, HttpSource::new());
            let mut fragment = String::new();
            let outcome = loader.load(&mut fragment).await;
            println!("{}", fragment);
            output::print_load_outcome(outcome, &cache_key, &cli.state_dir);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
