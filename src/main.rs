//! remod CLI

use clap::{Parser, Subcommand};
use remod::{Config, ModuleClient, NpmInstaller, Scope, SourceHost, UrlFetcher};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "remod")]
#[command(about = "Fetch remote modules through an expiring on-disk cache", long_about = None)]
#[command(version)]
struct Cli {
    /// Cache root directory
    #[arg(long, default_value = remod::config::DEFAULT_CACHE_DIR, global = true)]
    cache_dir: PathBuf,

    /// Cache TTL in seconds
    #[arg(long, default_value_t = remod::config::DEFAULT_CACHE_EXPIRATION_SECS, global = true)]
    ttl: u64,

    /// Suppress all progress output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a remote module, caching it locally
    Fetch {
        /// Module URL
        url: String,
    },
    /// Reconcile a remote package descriptor's dependencies into the
    /// local project
    Sync {
        /// Descriptor URL
        url: String,

        /// Local package descriptor
        #[arg(long, default_value = "package.json")]
        package_json: PathBuf,

        /// Reconcile devDependencies instead of dependencies
        #[arg(long, conflicts_with = "both")]
        dev: bool,

        /// Reconcile both buckets
        #[arg(long)]
        both: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config {
        cache_path: cli.cache_dir,
        cache_expiration_secs: cli.ttl,
        suppress_messages: cli.quiet,
        ..Config::default()
    };

    match cli.command {
        Commands::Fetch { url } => {
            let mut client = ModuleClient::new(
                config,
                Box::new(UrlFetcher::new()),
                Box::new(NpmInstaller::new()),
                SourceHost,
            )?;

            let path = client.local_path_for(&url);
            let source = client.fetch_module(&url)?;
            println!("Loaded {} ({} bytes) from {}", path.display(), source.len(), url);
        }
        Commands::Sync {
            url,
            package_json,
            dev,
            both,
        } => {
            config.package_json = package_json;

            let client = ModuleClient::new(
                config,
                Box::new(UrlFetcher::new()),
                Box::new(NpmInstaller::new()),
                SourceHost,
            )?;

            let scope = if both {
                Scope::Both
            } else if dev {
                Scope::DevDependencies
            } else {
                Scope::Dependencies
            };

            client.reconcile_dependencies(&url, scope)?;
        }
    }

    Ok(())
}
