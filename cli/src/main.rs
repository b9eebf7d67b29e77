//! Safety Graph CLI: build, persist and browse the LA public-safety graph

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use safety_graph::render::Link;
use safety_graph::{GraphSession, NavRequest, RenderedPage, SessionConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "safety-graph", version, about = "LA public-safety RDF graph builder and query navigator")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "SAFETY_GRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// RDF/XML file the graph is loaded from and saved to
    #[arg(long, global = true, env = "SAFETY_GRAPH_DESTINATION")]
    destination: Option<PathBuf>,

    /// Result rows per page
    #[arg(long, global = true)]
    page_size: Option<usize>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Html,
}

#[derive(Subcommand)]
enum Commands {
    /// Download both datasets and build the graph, unless the destination already exists
    Generate {
        /// Rebuild even if the destination exists
        #[arg(long)]
        reinitialize: bool,

        /// Maximum rows per dataset
        #[arg(long)]
        dataset_size: Option<usize>,
    },
    /// Add an RDF/XML file to the saved graph
    Import {
        path: PathBuf,
    },
    /// Write the graph, or one context of it, as RDF/XML
    Export {
        path: PathBuf,

        #[arg(long)]
        context: Option<String>,
    },
    /// Run a SPARQL query; `:` expands to the namespace prefix
    Query {
        sparql: String,

        /// Restrict the query to one context
        #[arg(long)]
        context: Option<String>,

        /// Page to show
        #[arg(long, default_value_t = 0)]
        page: usize,
    },
    /// List contexts with their triple counts
    Contexts,
    /// Start an interactive shell
    Shell,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::from_yaml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(destination) = cli.destination {
        config.destination = destination;
    }
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }

    match cli.command {
        Commands::Generate {
            reinitialize,
            dataset_size,
        } => {
            if let Some(size) = dataset_size {
                config.dataset_size = size;
            }
            let session = GraphSession::open(config, reinitialize).await?;
            print_contexts(&session)
        }
        Commands::Import { path } => {
            let mut session = load(config)?;
            import(&mut session, &path)?;
            let destination = session.config().destination.clone();
            session.export(&destination, None)?;
            Ok(())
        }
        Commands::Export { path, context } => {
            let session = load(config)?;
            let count = session.export(&path, context.as_deref())?;
            println!("{} triples written to {}", count, path.display());
            Ok(())
        }
        Commands::Query {
            sparql,
            context,
            page,
        } => {
            let mut session = load(config)?;
            session.run_query(&sparql, context.as_deref())?;
            let rendered = session.rendered_page(page)?;
            print_page(&rendered, cli.format);
            Ok(())
        }
        Commands::Contexts => {
            let session = load(config)?;
            print_contexts(&session)
        }
        Commands::Shell => {
            let mut session = load(config)?;
            run_shell(&mut session, cli.format)
        }
    }
}

/// Session over the saved graph, without touching the network
fn load(config: SessionConfig) -> anyhow::Result<GraphSession> {
    let mut session = GraphSession::new(config)?;
    let destination = session.config().destination.clone();
    if destination.exists() {
        import(&mut session, &destination)?;
    }
    Ok(session)
}

fn import(session: &mut GraphSession, path: &Path) -> anyhow::Result<()> {
    let outcome = session.import_file(path)?;
    match (outcome.success, outcome.error) {
        (true, _) => {
            println!(
                "Imported {} new triples into '{}'",
                outcome.inserted,
                outcome.context.unwrap_or_default()
            );
            Ok(())
        }
        (false, Some(error)) => bail!(error),
        (false, None) => bail!("import of {} failed", path.display()),
    }
}

fn print_contexts(session: &GraphSession) -> anyhow::Result<()> {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Context", "Triples"]);

    for context in session.contexts()? {
        let count = session.store().context_len(&context)?;
        table.add_row(vec![context, count.to_string()]);
    }

    println!("{}", table);
    Ok(())
}

fn print_page(page: &RenderedPage, format: OutputFormat) {
    match format {
        OutputFormat::Html => print!("{}", page.to_html()),
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = page
                .text_rows()
                .into_iter()
                .map(|row| {
                    page.header
                        .iter()
                        .cloned()
                        .zip(row.into_iter().map(serde_json::Value::String))
                        .collect::<serde_json::Map<_, _>>()
                        .into()
                })
                .collect();
            let json = serde_json::json!({
                "page": page.number,
                "pages": page.page_count,
                "header": page.header,
                "rows": rows,
                "links": page.links.iter().map(link_json).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
        OutputFormat::Table => {
            if page.header.is_empty() && page.rows.is_empty() {
                println!("(no results)");
                return;
            }

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(&page.header);
            for row in page.text_rows() {
                table.add_row(row);
            }

            println!("{}", table);
            println!(
                "page {}/{}, {} row(s)",
                page.number + 1,
                page.page_count.max(1),
                page.rows.len()
            );
        }
    }
}

fn link_json(link: &Link) -> serde_json::Value {
    serde_json::json!({ "value": link.value, "target": link.target })
}

fn run_shell(session: &mut GraphSession, mut format: OutputFormat) -> anyhow::Result<()> {
    println!("Safety Graph Interactive Shell");
    println!("Type SPARQL queries, or :help for commands. :quit to exit.\n");

    let stdin = std::io::stdin();
    let mut line = String::new();
    let mut context: Option<String> = None;
    let mut current: Option<RenderedPage> = None;

    loop {
        eprint!("{}> ", context.as_deref().unwrap_or("graph"));

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (command, argument) = match trimmed.split_once(char::is_whitespace) {
            Some((command, argument)) => (command, argument.trim()),
            None => (trimmed, ""),
        };

        match command {
            ":quit" | ":exit" | ":q" => break,
            ":help" | ":h" => {
                println!("Commands:");
                println!("  :page <n>        Show page n of the current result");
                println!("  :follow <n>      Follow link [n] of the current page");
                println!("  :context [id]    Restrict queries to a context, or clear it");
                println!("  :contexts        List contexts");
                println!("  :import <path>   Import an RDF/XML file");
                println!("  :export <path>   Export the current context, or everything");
                println!("  :html            Toggle HTML output");
                println!("  :quit            Exit shell");
                println!("  <sparql>         Run a query");
            }
            ":page" | ":follow" => {
                let url = match nav_target(command, argument, current.as_ref()) {
                    Ok(url) => url,
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        continue;
                    }
                };
                let response = session.navigate(&url);
                if !response.is_html() {
                    eprintln!("Error: {}", response.payload);
                    continue;
                }
                let number = match NavRequest::parse(&url) {
                    Ok(NavRequest::Page(number)) => number,
                    _ => 0,
                };
                match session.rendered_page(number) {
                    Ok(page) => {
                        print_page(&page, format);
                        current = Some(page);
                    }
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            ":context" => {
                context = (!argument.is_empty()).then(|| argument.to_string());
            }
            ":contexts" => {
                if let Err(e) = print_contexts(session) {
                    eprintln!("Error: {}", e);
                }
            }
            ":import" => {
                if let Err(e) = import(session, Path::new(argument)) {
                    eprintln!("Error: {}", e);
                }
            }
            ":export" => match session.export(Path::new(argument), context.as_deref()) {
                Ok(count) => println!("{} triples written to {}", count, argument),
                Err(e) => eprintln!("Error: {}", e),
            },
            ":html" => {
                format = match format {
                    OutputFormat::Html => OutputFormat::Table,
                    _ => OutputFormat::Html,
                };
            }
            _ => match session.run_query(trimmed, context.as_deref()) {
                Ok(page) => {
                    print_page(&page, format);
                    current = Some(page);
                }
                Err(e) => eprintln!("Error: {}", e),
            },
        }
    }

    println!("Bye!");
    Ok(())
}

/// `nav://` URL for a `:page` or `:follow` shell command
fn nav_target(command: &str, argument: &str, current: Option<&RenderedPage>) -> anyhow::Result<String> {
    let n: usize = argument
        .parse()
        .with_context(|| format!("expected a number, got '{}'", argument))?;

    if command == ":page" {
        return Ok(NavRequest::Page(n).to_url());
    }

    let page = current.context("no current result")?;
    match page.links.get(n) {
        Some(link) => Ok(link.target.clone()),
        None => bail!("no link [{}] on this page", n),
    }
}
