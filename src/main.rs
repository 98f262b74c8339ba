use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use forumtext::config::ProjectConfig;
use forumtext::pipeline::{print_err, OutputKind, Pipeline};

const DEFAULT_CONFIG: &str = "forumtext.yml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Filter for log events written to stderr, overridden by RUST_LOG.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a post to HTML.
    Html(RenderArgs),
    /// Render the plain text summary of a post.
    Meta {
        #[command(flatten)]
        args: RenderArgs,
        /// Maximum number of characters.
        #[arg(short, long)]
        length: Option<usize>,
    },
    /// Print the parsed markup tree as JSON.
    Tree(RenderArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    input: PathBuf,
    /// Project configuration. Defaults to `forumtext.yml` in the working directory, if present.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Title catalog, replacing the configured one.
    #[arg(short, long)]
    titles: Option<PathBuf>,
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long)]
    allow_html: bool,
    #[arg(long)]
    single_line: bool,
}

fn setup_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(args: &RenderArgs) -> anyhow::Result<ProjectConfig> {
    let mut config = match &args.config {
        Some(path) => ProjectConfig::load(path)?,
        None => {
            let path = env::current_dir()?.join(DEFAULT_CONFIG);
            if path.is_file() {
                ProjectConfig::load(&path)?
            } else {
                ProjectConfig::default()
            }
        }
    };

    if args.titles.is_some() {
        config.titles = args.titles.clone();
    }
    config.parser.allow_html |= args.allow_html;
    config.parser.single_line |= args.single_line;
    Ok(config)
}

async fn run(kind: OutputKind, args: &RenderArgs, length: Option<usize>) -> anyhow::Result<()> {
    let mut config = load_config(args)?;
    if let Some(length) = length {
        config.render.meta_description_length = length;
    }

    let pipeline = Pipeline::new(config)?;
    pipeline
        .run(kind, args.input.as_path(), args.output.as_deref())
        .await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(&cli.log_level, cli.json_logs);

    let (kind, args, length) = match &cli.command {
        Commands::Html(args) => (OutputKind::Html, args, None),
        Commands::Meta { args, length } => (OutputKind::Meta, args, *length),
        Commands::Tree(args) => (OutputKind::Tree, args, None),
    };

    match print_err(run(kind, args, length).await) {
        Some(()) => ExitCode::SUCCESS,
        None => ExitCode::FAILURE,
    }
}
