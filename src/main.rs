use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use plugin_release::cli::{prepare_package, run_release_workflow, ReleaseWorkflowArgs};
use plugin_release::config;
use plugin_release::domain::ReleaseType;
use plugin_release::git::Git2Repository;
use plugin_release::registry::NpmRegistry;
use plugin_release::ui;

#[derive(clap::Parser)]
#[command(
    name = "plugin-release",
    about = "Bump the version of a plugin and update its changelog from conventional commits"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        short,
        long,
        visible_alias = "dry-run",
        help = "Don't modify any files, print the changelog entry instead"
    )]
    preview: bool,

    #[arg(long, help = "Force bump version number to next major")]
    major: bool,

    #[arg(long, help = "Force bump version number to next minor")]
    minor: bool,

    #[arg(long, help = "Force bump version number to next patch")]
    patch: bool,

    #[arg(long, help = "Force bump version number to next premajor")]
    premajor: bool,

    #[arg(long, help = "Force bump version number to next preminor")]
    preminor: bool,

    #[arg(long, help = "Force bump version number to next prepatch")]
    prepatch: bool,

    #[arg(long, help = "Force bump the prerelease number")]
    prerelease: bool,

    #[arg(
        long,
        visible_alias = "preid",
        value_name = "SUFFIX",
        help = "Bump version number with a prerelease suffix (alpha, beta or rc)"
    )]
    pre: Option<String>,

    #[arg(long, value_name = "URL", help = "Registry to query for published versions")]
    registry: Option<String>,

    #[arg(short = 'C', long, help = "Do not generate or update the changelog")]
    no_changelog: bool,

    #[arg(short = 'T', long, help = "Do not tag the release commit")]
    no_tag: bool,

    #[arg(long, help = "Update and stage files but do not commit them")]
    no_commit: bool,

    #[arg(long, help = "Disable all git write operations")]
    no_git: bool,

    #[arg(long, help = "Allow releasing from any branch")]
    debug: bool,

    #[arg(short, long, help = "Print version information")]
    version: bool,
}

fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    if args.version {
        println!("plugin-release {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref()).context("Error loading config")?;

    let release_type = ReleaseType::from_flags(&[
        (ReleaseType::Major, args.major),
        (ReleaseType::Minor, args.minor),
        (ReleaseType::Patch, args.patch),
        (ReleaseType::PreMajor, args.premajor),
        (ReleaseType::PreMinor, args.preminor),
        (ReleaseType::PrePatch, args.prepatch),
        (ReleaseType::PreRelease, args.prerelease),
    ])?;

    let cwd = std::env::current_dir()?;
    let package = prepare_package(&cwd, &config)?;

    let repo = Git2Repository::open(&package.workspace_root)
        .context("Error while querying/parsing git info")?;
    let registry = NpmRegistry::new(args.registry);

    let workflow_args = ReleaseWorkflowArgs {
        release_type,
        prerelease: args.pre,
        preview: args.preview,
        changelog: !args.no_changelog,
        commit: !args.no_commit,
        tag: !args.no_tag,
        git: !args.no_git,
        debug: args.debug,
    };

    run_release_workflow(&workflow_args, &config, &package, &repo, &registry)?;
    Ok(())
}

/// Console diagnostics, controlled by RUST_LOG (default: warn).
fn init_tracing() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .init();
}
