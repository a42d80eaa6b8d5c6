use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waypoint_core::{Params, Router, RouterConfig, Segments};

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "Match request paths and build URLs with a waypoint router", long_about = None)]
struct Cli {
    /// Router configuration (TOML); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "http")]
    scheme: String,

    #[arg(long, default_value = "localhost")]
    host: String,

    /// Request target the build commands run under
    #[arg(short, long, default_value = "/")]
    request: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a request target to its route and descriptor
    Match { target: String },
    /// Build a URL from key=value params
    Build { pairs: Vec<String> },
    /// Build a URL from a named route's template
    Route { key: String, pairs: Vec<String> },
    /// Resolve a slug or path, with optional key=value overrides
    Detect { target: String, pairs: Vec<String> },
    /// List routes in match order
    Routes,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waypoint=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => RouterConfig::load(path)?,
        None => RouterConfig::default(),
    };
    let router = Router::from_config(&config)?;
    tracing::debug!(routes = router.table().len(), slugs = router.slugs().len(), "Router ready");

    match &cli.command {
        Commands::Match { target } => {
            let ctx = router.request(Segments::new(&cli.scheme, &cli.host, router.base_path(), target));
            let current = ctx.current();
            let output = json!({
                "key": current.key(),
                "fallback": current.is_fallback(),
                "locale": current.locale(),
                "explicit_locale": current.is_locale_explicit(),
                "params": current.params(),
                "descriptor": ctx.destination(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Build { pairs } => {
            let mut ctx = router.request(request(&cli, &router));
            println!("{}", ctx.build(&parse_pairs(pairs)?));
        }
        Commands::Route { key, pairs } => {
            let ctx = router.request(request(&cli, &router));
            match ctx.build_route(key, &parse_pairs(pairs)?)? {
                Some(url) => println!("{url}"),
                None => return Err(format!("route '{key}' needs a value for every token").into()),
            }
        }
        Commands::Detect { target, pairs } => {
            let mut ctx = router.request(request(&cli, &router));
            let url = if pairs.is_empty() {
                ctx.detect(target.as_str())
            } else {
                ctx.detect(parse_pairs(pairs)?.slug(target.as_str()))
            };
            println!("{url}");
        }
        Commands::Routes => {
            for route in router.table().iter() {
                println!("{:<16} {}", route.key(), route.template());
            }
            println!("{:<16} {}", router.table().root().key(), router.table().root().template());
        }
    }

    Ok(())
}

fn request(cli: &Cli, router: &Router) -> Segments {
    Segments::new(&cli.scheme, &cli.host, router.base_path(), &cli.request)
}

/// `key=value` pairs into params; numeric keys are positional
fn parse_pairs(pairs: &[String]) -> Result<Params, Box<dyn std::error::Error>> {
    let mut params = Params::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got '{pair}'"))?;
        if let Some(name) = key.strip_prefix("query.") {
            params = params.query(name, value);
        } else {
            params.insert(key, value);
        }
    }
    Ok(params)
}
