//! Builds the state network of a system and prints it.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example relnet -- "pump & (valve1 | valve2)" \
//!     -e pump=hw:1 -e valve1=hw:0,sw:inf -e valve2=hw:0,sw:inf
//! ```
//!
//! Write the network as DOT and render it (requires Graphviz):
//!
//! ```bash
//! cargo run --example relnet -- "A | B" -e A=hw:1 -e B=sw:2 --format dot -o net.dot
//! dot -Tsvg net.dot -o net.svg
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use relnet::element::ElementConfig;
use relnet::generate::{generate, BranchOrder, GeneratorConfig};
use relnet::network::StateNetwork;
use relnet::system::System;

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Format {
    /// Counts per classification
    Summary,
    /// Every node and edge
    List,
    /// Graphviz DOT
    Dot,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Order {
    Hardware,
    Software,
}

#[derive(Parser)]
#[command(author, version, about = "Reliability state network generator")]
struct Cli {
    /// System expression, e.g. "A & (B | C)"
    expression: String,

    /// Element configuration as NAME=BUDGETS, e.g. `A=hw:1` or `B=hw:0,sw:inf`
    #[arg(short, long = "element", value_name = "NAME=BUDGETS")]
    elements: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Summary)]
    format: Format,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Dimension that fails first on elements with both dimensions
    #[arg(long, value_enum, default_value_t = Order::Hardware)]
    branch_order: Order,

    /// Maximum number of states (0 for no limit)
    #[arg(long, value_name = "INT", default_value_t = 1 << 16)]
    max_nodes: usize,

    /// Omit reciprocal recovery edges for unbounded budgets
    #[arg(long)]
    no_reciprocal: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_elements(specs: &[String]) -> Result<HashMap<String, ElementConfig>> {
    let mut configs = HashMap::new();
    for spec in specs {
        let (name, budgets) = spec
            .split_once('=')
            .ok_or_else(|| eyre!("expected NAME=BUDGETS, got `{}`", spec))?;
        let config: ElementConfig = budgets
            .parse()
            .map_err(|e| eyre!("element `{}`: {}", name, e))?;
        if configs.insert(name.trim().to_string(), config).is_some() {
            return Err(eyre!("element `{}` is configured twice", name));
        }
    }
    Ok(configs)
}

fn render(network: &StateNetwork, format: Format) -> Result<String> {
    use std::fmt::Write as _;

    let mut out = String::new();
    match format {
        Format::Summary => {
            let counts = network.count_by_state();
            writeln!(out, "elements: {}", network.element_names().join(", "))?;
            writeln!(out, "nodes:    {}", network.num_nodes())?;
            writeln!(out, "  active:   {}", counts.active)?;
            writeln!(out, "  recovery: {}", counts.recovery)?;
            writeln!(out, "  terminal: {}", counts.terminal)?;
            writeln!(out, "edges:    {}", network.num_edges())?;
        }
        Format::List => {
            for node in network.nodes() {
                let change = node.change.map(|c| c.to_string()).unwrap_or_else(|| "initial".to_string());
                writeln!(
                    out,
                    "{} [{}] {} ({})",
                    node.id,
                    node.state,
                    network.describe(node.id),
                    change
                )?;
            }
            for edge in network.edges() {
                writeln!(
                    out,
                    "{} -> {} {} {}.{}",
                    edge.source,
                    edge.target,
                    edge.kind,
                    network.element_names()[edge.element],
                    edge.dimension
                )?;
            }
        }
        Format::Dot => out = network.to_dot()?,
    }
    Ok(out)
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    simplelog::TermLogger::init(
        if cli.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let configs = parse_elements(&cli.elements)?;
    let system = System::from_expression(&cli.expression, &configs)?;
    println!("system = {}", system);
    println!("state space size = {}", system.state_space_size());

    let config = GeneratorConfig::default()
        .with_branch_order(match cli.branch_order {
            Order::Hardware => BranchOrder::HardwareFirst,
            Order::Software => BranchOrder::SoftwareFirst,
        })
        .with_max_nodes(if cli.max_nodes == 0 { None } else { Some(cli.max_nodes) })
        .with_reciprocal_unbounded(!cli.no_reciprocal);

    let time_total = std::time::Instant::now();
    let network = generate(&system, &config)?;
    println!("generated in {:.3} s", time_total.elapsed().as_secs_f64());

    let out = render(&network, cli.format)?;
    match cli.output {
        Some(path) => {
            std::fs::write(&path, out)?;
            println!("written to {}", path.display());
        }
        None => print!("{}", out),
    }

    Ok(())
}
