use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use indexmap::IndexMap;
use log::debug;

use aep_core::api::{Api, Resource};
use aep_core::client::{Client, LogObserver, ReqwestTransport};
use aep_core::config::{self, AepConfig, CONFIG_FILE_NAME};
use aep_core::openapi::fetch_openapi;
use aep_core::{JsonObject, OpenApi};

#[derive(Parser)]
#[command(name = "aep", about = "Client for AEP resource-oriented APIs", version)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Server URL, overrides config and the OpenAPI document
    #[arg(long, global = true)]
    server: Option<String>,

    /// Extra request header as KEY=VALUE (repeatable)
    #[arg(long = "header", global = true, value_parser = parse_key_value)]
    headers: Vec<(String, String)>,

    /// Path or URL of the OpenAPI document, overrides the config
    #[arg(long, global = true)]
    openapi: Option<String>,

    /// Log every request and response
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a fully resolved schema from an OpenAPI document
    Schema {
        /// Definition name, e.g. `book`
        name: String,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: OutputFormat,
    },

    /// Create a resource
    Create {
        /// Resource name from the OpenAPI document, e.g. `book`
        #[arg(required_unless_present = "pattern")]
        resource: Option<String>,

        /// Resource pattern, e.g. `publishers/{publisher}/books/{book}`
        #[arg(long, conflicts_with = "resource")]
        pattern: Option<String>,

        /// Parent parameter as NAME=VALUE (repeatable)
        #[arg(long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,

        /// Send the body's `id` as the `?id=` query parameter
        #[arg(long)]
        user_settable_id: bool,

        /// Request body as a JSON object
        #[arg(long)]
        body: String,
    },

    /// List the resources of a collection
    List {
        /// Resource name from the OpenAPI document, e.g. `book`
        #[arg(required_unless_present = "pattern")]
        resource: Option<String>,

        /// Resource pattern, e.g. `publishers/{publisher}/books/{book}`
        #[arg(long, conflicts_with = "resource")]
        pattern: Option<String>,

        /// Plural used to find items in the response
        #[arg(long)]
        plural: Option<String>,

        /// Parent parameter as NAME=VALUE (repeatable)
        #[arg(long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },

    /// Fetch a resource by its path
    Get { path: String },

    /// Patch a resource by its path
    Update {
        path: String,

        /// Request body as a JSON object
        #[arg(long)]
        body: String,
    },

    /// Delete a resource by its path
    Delete { path: String },

    /// Initialize a new aep configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Schema { name, format } => cmd_schema(&cli, name, format),

        Commands::Create {
            resource,
            pattern,
            params,
            user_settable_id,
            body,
        } => {
            let target = Target::new(resource.as_deref(), pattern.as_deref());
            cmd_create(&cli, target, params, *user_settable_id, body)
        }

        Commands::List {
            resource,
            pattern,
            plural,
            params,
        } => {
            let target = Target::new(resource.as_deref(), pattern.as_deref());
            cmd_list(&cli, target, plural.as_deref(), params)
        }

        Commands::Get { path } => {
            let session = Session::load(&cli)?;
            print_json(&session.client.get(&session.server_url, path)?)
        }

        Commands::Update { path, body } => {
            let session = Session::load(&cli)?;
            session
                .client
                .update(&session.server_url, path, &parse_body(body)?)?;
            eprintln!("Updated {path}");
            Ok(())
        }

        Commands::Delete { path } => {
            let session = Session::load(&cli)?;
            session.client.delete(&session.server_url, path)?;
            eprintln!("Deleted {path}");
            Ok(())
        }

        Commands::Init { force } => cmd_init(&cli.config, *force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(*shell, &mut cmd, "aep", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Everything a request-sending command needs.
struct Session {
    client: Client<ReqwestTransport>,
    server_url: String,
}

impl Session {
    /// Merge config file and flags. Flags win; headers from both are sent.
    fn load(cli: &Cli) -> Result<Self> {
        let cfg = try_load_config(cli)?;

        let server_url = match cli.server.clone().or(cfg.server_url.clone()) {
            Some(url) => url,
            None => server_from_document(cli, &cfg)?,
        };
        debug!("using server {server_url}");

        let mut client = Client::new(ReqwestTransport::default());
        client.headers_mut().extend(cfg.headers);
        client
            .headers_mut()
            .extend(cli.headers.iter().cloned());
        if cli.verbose || cfg.log_http {
            client = client.with_observer(LogObserver);
        }

        Ok(Self { client, server_url })
    }
}

/// Try to load the config file named by `--config`.
fn try_load_config(cli: &Cli) -> Result<AepConfig> {
    let cfg = config::load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    Ok(cfg.unwrap_or_default())
}

/// `--openapi` wins over the config's `openapi`.
fn document_location(cli: &Cli, cfg: &AepConfig) -> Option<String> {
    cli.openapi.clone().or_else(|| cfg.openapi.clone())
}

fn load_document(location: &str) -> Result<OpenApi> {
    fetch_openapi(location).with_context(|| format!("failed to load {location}"))
}

fn server_from_document(cli: &Cli, cfg: &AepConfig) -> Result<String> {
    let location = document_location(cli, cfg).ok_or_else(|| {
        anyhow!("no server URL: pass --server or --openapi, or set server_url or openapi in the config")
    })?;
    load_document(&location)?
        .server_url()
        .ok_or_else(|| anyhow!("{location} does not declare a server; pass --server"))
}

/// What a collection command addresses: a resource declared by the OpenAPI
/// document, or an explicit pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Target<'a> {
    Named(&'a str),
    Pattern(&'a str),
}

impl<'a> Target<'a> {
    /// clap guarantees exactly one of the two is set.
    fn new(resource: Option<&'a str>, pattern: Option<&'a str>) -> Self {
        match (resource, pattern) {
            (_, Some(pattern)) => Target::Pattern(pattern),
            (Some(name), None) => Target::Named(name),
            (None, None) => Target::Pattern(""),
        }
    }

    fn resolve(self, cli: &Cli) -> Result<Resource> {
        match self {
            Target::Pattern(pattern) => Ok(Resource::from_pattern(pattern)?),
            Target::Named(name) => {
                let cfg = try_load_config(cli)?;
                let location = document_location(cli, &cfg).ok_or_else(|| {
                    anyhow!("resource {name:?} needs an OpenAPI document: pass --openapi or --pattern")
                })?;
                let api = Api::from_openapi(&load_document(&location)?)
                    .with_context(|| format!("failed to read resources from {location}"))?;
                Ok(api.resource(name)?.clone())
            }
        }
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    if key.is_empty() {
        return Err(format!("empty key in {s:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_body(body: &str) -> Result<JsonObject> {
    serde_json::from_str(body).context("body must be a JSON object")
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_schema(cli: &Cli, name: &str, format: &OutputFormat) -> Result<()> {
    let cfg = try_load_config(cli)?;
    let location = document_location(cli, &cfg)
        .ok_or_else(|| anyhow!("no OpenAPI document: pass --openapi or set it in the config"))?;
    let doc = load_document(&location)?;
    let schema = doc.resolve_deep(doc.schema(name)?)?;

    match format {
        OutputFormat::Yaml => print!("{}", serde_yaml_ng::to_string(&schema)?),
        OutputFormat::Json => print_json(&schema)?,
    }
    Ok(())
}

fn cmd_create(
    cli: &Cli,
    target: Target<'_>,
    params: &[(String, String)],
    user_settable_id: bool,
    body: &str,
) -> Result<()> {
    let mut resource = target.resolve(cli)?;
    if resource.create_method.is_none() {
        bail!("{} does not support create", resource.singular);
    }
    if user_settable_id || matches!(target, Target::Pattern(_)) {
        resource = resource.with_user_settable_create(user_settable_id);
    }
    let session = Session::load(cli)?;
    let params: IndexMap<String, String> = params.iter().cloned().collect();

    let created = session
        .client
        .create(&resource, &session.server_url, &parse_body(body)?, &params)?;
    print_json(&created)
}

fn cmd_list(
    cli: &Cli,
    target: Target<'_>,
    plural: Option<&str>,
    params: &[(String, String)],
) -> Result<()> {
    let mut resource = target.resolve(cli)?;
    if resource.list_method.is_none() {
        bail!("{} does not support list", resource.singular);
    }
    let session = Session::load(cli)?;
    if let Some(plural) = plural {
        resource.plural = plural.to_string();
    }
    let params: IndexMap<String, String> = params.iter().cloned().collect();

    let items = session.client.list(&resource, &session.server_url, &params)?;
    print_json(&items)
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
