use anyhow::Result;
use clap::Parser;
use repobuild::{build::BuildOutcome, config::Config};
use std::path::PathBuf;

/// repobuild - build AUR packages for a local repository
///
/// Fetches the requested packages and their AUR build dependencies, and
/// builds every one that is missing from or outdated in the repository.
/// Live-source packages (-git, -svn, ...) are checked against upstream first.
///
/// Examples:
///   repobuild --repo-db /srv/repo/custom.db.tar.gz build imgur wlc-git
#[derive(Parser, Debug)]
#[command(author, version = env!("REPOBUILD_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Working directory for package sources (also via REPOBUILD_WORKDIR)
    #[arg(
        long,
        short = 'w',
        env = "REPOBUILD_WORKDIR",
        value_name = "PATH",
        global = true
    )]
    workdir: Option<PathBuf>,

    /// Reference repository database (also via REPOBUILD_REPO_DB)
    #[arg(long, env = "REPOBUILD_REPO_DB", value_name = "PATH", global = true)]
    repo_db: Option<PathBuf>,

    /// Packager identity recorded in built packages
    #[arg(long, env = "PACKAGER", value_name = "NAME <EMAIL>", global = true)]
    packager: Option<String>,

    /// AUR URL (defaults to https://aur.archlinux.org)
    #[arg(long, env = "REPOBUILD_AUR_URL", value_name = "URL", global = true)]
    aur_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Build packages that are outdated in the repository
    Build(BuildArgs),
}

#[derive(clap::Args, Debug)]
struct BuildArgs {
    /// Package names to build
    #[arg(value_name = "NAME", required = true)]
    names: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let runtime = repobuild::runtime::RealRuntime;

    match cli.command {
        Commands::Build(args) => {
            let repo_db = cli
                .repo_db
                .ok_or_else(|| anyhow::anyhow!("--repo-db or REPOBUILD_REPO_DB is required"))?;
            let config = Config::new(runtime, cli.workdir, repo_db, cli.packager, cli.aur_url)?;

            if let BuildOutcome::Built(report) = config.build(&args.names).await? {
                for artifact in report.artifacts() {
                    println!("{}", artifact.package.display());
                    if let Some(signature) = &artifact.signature {
                        println!("{}", signature.display());
                    }
                }
            }
        }
    }
    Ok(())
}
