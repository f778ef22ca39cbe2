#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use editor::dashboard::{self, DashboardData, SourceError};
use editor::editor::{EditorCore, EditorOptions};
use editor::pack::{ElementPack, PackError};
use editor::pool::ElementPool;
use editor::scene;
use editor::vars::{self, Variables};
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing element pack; pass --pack or set IDC_PACK")]
    MissingPack,
    #[error("unsupported file type: {0} (expected .json or .txt)")]
    UnsupportedFile(String),
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid dashboard {path}: {source}")]
    InvalidDashboard {
        path: PathBuf,
        #[source]
        source: SourceError,
    },
    #[error("invalid element pack: {0}")]
    InvalidPack(#[from] PackError),
    #[error("unknown element kinds: {}", .0.join(", "))]
    UnknownKinds(Vec<String>),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned HTTP {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "idc-cli", about = "Dashboard file tools and viewer service client")]
struct Cli {
    #[arg(long, env = "IDC_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[arg(long, env = "IDC_PACK", global = true, help = "Element pack JSON")]
    pack: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: String,
    pack: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that a dashboard file is well formed.
    Validate { file: PathBuf },
    /// Summarize a dashboard file.
    Info { file: PathBuf },
    /// List the OIDs a dashboard subscribes to.
    Oids {
        file: PathBuf,
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
        vars: Vec<(String, String)>,
    },
    /// Clip every element to the viewport and snap it to the grid.
    Align {
        file: PathBuf,
        #[arg(long, short, help = "Write here instead of stdout")]
        output: Option<PathBuf>,
    },
    /// List the palette of an element pack file.
    Pack { file: PathBuf },
    Remote(RemoteCommand),
}

#[derive(Args, Debug)]
struct RemoteCommand {
    #[command(subcommand)]
    command: RemoteSubcommand,
}

#[derive(Subcommand, Debug)]
enum RemoteSubcommand {
    Ping,
    List,
    Get {
        #[arg(value_parser = parse_dashboard_name)]
        name: String,
    },
    View {
        #[arg(value_parser = parse_dashboard_name)]
        name: String,
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
        vars: Vec<(String, String)>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let ctx = CliContext { base_url: cli.base_url, pack: cli.pack };

    match cli.command {
        Command::Validate { file } => run_validate(&ctx, &file),
        Command::Info { file } => run_info(&file),
        Command::Oids { file, vars } => run_oids(&ctx, &file, vars.into_iter().collect()),
        Command::Align { file, output } => run_align(&ctx, &file, output.as_deref()),
        Command::Pack { file } => run_pack(&file),
        Command::Remote(remote) => run_remote(&ctx, remote).await,
    }
}

/// Dashboard names the server accepts: `[A-Za-z0-9_-]`, never empty. They
/// go into URL paths as-is.
fn parse_dashboard_name(raw: &str) -> Result<String, String> {
    let valid = !raw.is_empty() && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid { Ok(raw.to_owned()) } else { Err(format!("invalid dashboard name {raw:?}; use letters, digits, '_' or '-'")) }
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    vars::parse_assignment(raw).map_err(|input| format!("expected NAME=VALUE, got {input:?}"))
}

// =============================================================================
// OFFLINE COMMANDS
// =============================================================================

fn run_validate(cli: &CliContext, file: &Path) -> Result<(), CliError> {
    let data = read_dashboard(file)?;
    if cli.pack.is_some() {
        let pack = load_pack(cli)?;
        let unknown = unknown_kinds(&data, &pack);
        if !unknown.is_empty() {
            return Err(CliError::UnknownKinds(unknown));
        }
    }
    println!("ok: {} ({} elements)", data.name, data.elements.len());
    Ok(())
}

fn run_info(file: &Path) -> Result<(), CliError> {
    let data = read_dashboard(file)?;
    print_json(&summarize(&data))
}

fn run_oids(cli: &CliContext, file: &Path, variables: Variables) -> Result<(), CliError> {
    let data = read_dashboard(file)?;
    let pack = load_pack(cli)?;
    for oid in subscribed_oids(&data, &pack, variables) {
        println!("{oid}");
    }
    Ok(())
}

fn run_align(cli: &CliContext, file: &Path, output: Option<&Path>) -> Result<(), CliError> {
    let data = read_dashboard(file)?;
    let pack = load_pack(cli)?;
    let source = align_dashboard(data, pack).to_source()?;
    match output {
        Some(path) => {
            std::fs::write(path, format!("{source}\n")).map_err(|source| CliError::Io { path: path.to_owned(), source })?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{source}"),
    }
    Ok(())
}

fn run_pack(file: &Path) -> Result<(), CliError> {
    let pack = ElementPack::from_json(&read_text(file)?)?;
    for line in palette_lines(&pack) {
        println!("{line}");
    }
    Ok(())
}

fn read_text(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io { path: path.to_owned(), source })
}

fn read_dashboard(path: &Path) -> Result<DashboardData, CliError> {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    if !dashboard::accepts_source_file(file_name) {
        return Err(CliError::UnsupportedFile(path.display().to_string()));
    }
    let source = read_text(path)?;
    DashboardData::from_source(&source).map_err(|source| CliError::InvalidDashboard { path: path.to_owned(), source })
}

fn load_pack(cli: &CliContext) -> Result<ElementPack, CliError> {
    let path = cli.pack.as_deref().ok_or(CliError::MissingPack)?;
    Ok(ElementPack::from_json(&read_text(path)?)?)
}

fn unknown_kinds(data: &DashboardData, pack: &ElementPack) -> Vec<String> {
    let mut kinds: Vec<String> =
        data.elements.iter().filter(|el| !pack.contains(&el.kind)).map(|el| el.kind.clone()).collect();
    kinds.sort();
    kinds.dedup();
    kinds
}

fn summarize(data: &DashboardData) -> Value {
    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    for el in &data.elements {
        *kinds.entry(el.kind.as_str()).or_default() += 1;
    }

    let mut variables: Vec<&str> = Vec::new();
    for el in &data.elements {
        collect_references(&el.params, &mut variables);
    }
    variables.sort_unstable();
    variables.dedup();

    json!({
        "name": data.name,
        "viewport": data.viewport,
        "scale": data.scale,
        "grid": data.grid,
        "elements": data.elements.len(),
        "kinds": kinds,
        "variables": variables,
    })
}

fn collect_references<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.extend(vars::references(s)),
        Value::Array(items) => items.iter().for_each(|v| collect_references(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_references(v, out)),
        _ => {}
    }
}

fn subscribed_oids(data: &DashboardData, pack: &ElementPack, variables: Variables) -> Vec<String> {
    let mut pool = ElementPool::new();
    pool.import(data.elements.clone());
    pool.set_variables(variables);
    pool.oids_to_subscribe(pack)
}

fn align_dashboard(data: DashboardData, pack: ElementPack) -> DashboardData {
    let mut core = EditorCore::new(pack, EditorOptions::default());
    core.load(Some(data));
    core.align_elements();
    core.export_data()
}

fn palette_lines(pack: &ElementPack) -> Vec<String> {
    let mut lines = Vec::new();
    for group in scene::palette(pack) {
        let title = if group.group.is_empty() { "(ungrouped)" } else { group.group.as_str() };
        lines.push(title.to_owned());
        for item in group.items {
            lines.push(format!("  {:<24} {}", item.kind, item.description));
        }
    }
    lines
}

// =============================================================================
// REMOTE COMMANDS
// =============================================================================

async fn run_remote(cli: &CliContext, remote: RemoteCommand) -> Result<(), CliError> {
    match remote.command {
        RemoteSubcommand::Ping => {
            let client = reqwest::Client::new();
            let response = client.get(api_url(cli, "/healthz")).timeout(REQUEST_TIMEOUT).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(CliError::ServerError {
                    status: status.as_u16(),
                    message: "health check failed".to_owned(),
                });
            }
            println!("ok");
            Ok(())
        }
        RemoteSubcommand::List => {
            let json = api_get(cli, "/api/dashboards", &Variables::new()).await?;
            print_json(&json)
        }
        RemoteSubcommand::Get { name } => {
            let json = api_get(cli, &format!("/api/dashboards/{name}"), &Variables::new()).await?;
            print_json(&json)
        }
        RemoteSubcommand::View { name, vars } => {
            let query: Variables = vars.into_iter().collect();
            let json = api_get(cli, &format!("/api/dashboards/{name}/view"), &query).await?;
            print_json(&json)
        }
    }
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

fn api_url(cli: &CliContext, path: &str) -> String {
    format!("{}{}", cli.base_url.trim_end_matches('/'), path)
}

async fn api_get(cli: &CliContext, path: &str, query: &Variables) -> Result<Value, CliError> {
    let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    let response = client.get(api_url(cli, path)).query(query).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = if body.is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_owned()
        } else {
            body
        };
        return Err(CliError::ServerError { status: status.as_u16(), message });
    }
    Ok(serde_json::from_str(&body)?)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
