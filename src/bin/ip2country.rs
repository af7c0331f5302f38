//! ip2country: CLI for resolving addresses and checking gate decisions.

use clap::{Parser, Subcommand};
use ip2country::{dataset, AccessGate, CountryResolver, Decision, GateConfig, UNKNOWN};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ip2country")]
#[command(author = "Kaitu.io")]
#[command(version = "0.1.0")]
#[command(about = "Resolve IPv4 addresses to countries and check whitelist decisions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve addresses to country codes
    Lookup {
        /// Range dataset (text or binary, optionally .gz)
        #[arg(short, long)]
        dataset: PathBuf,

        /// Addresses to resolve
        #[arg(required = true)]
        ips: Vec<String>,
    },

    /// Run peer addresses (host:port) through the gate
    Check {
        /// Gate config file (YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Range dataset, overrides the one named in the config
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Peer addresses to check
        #[arg(required = true)]
        peers: Vec<String>,
    },

    /// Check a dataset is sorted and disjoint
    Verify {
        /// Range dataset
        #[arg(short, long)]
        dataset: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Convert a dataset to the binary format (or back to text)
    Convert {
        /// Input dataset
        #[arg(short, long)]
        input: PathBuf,

        /// Output file; a .gz suffix compresses binary output
        #[arg(short, long)]
        output: PathBuf,

        /// Write the text format instead of binary
        #[arg(long)]
        text: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Lookup { dataset, ips } => lookup(&dataset, &ips),
        Commands::Check {
            config,
            dataset,
            peers,
        } => check(&config, dataset.as_deref(), &peers),
        Commands::Verify { dataset, verbose } => verify(&dataset, verbose),
        Commands::Convert {
            input,
            output,
            text,
            verbose,
        } => convert(&input, &output, text, verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn lookup(dataset_path: &Path, ips: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let resolver = CountryResolver::new(Arc::new(dataset::load(dataset_path)?));

    for ip in ips {
        match ip2country::parse_ipv4(ip) {
            Some(address) => match resolver.lookup(address) {
                Some(range) => println!("{}\t{}\t{}", ip, range.country, range),
                None => println!("{}\t{}", ip, UNKNOWN),
            },
            None => println!("{}\t{}\t(not an IPv4 address)", ip, UNKNOWN),
        }
    }
    Ok(())
}

fn check(
    config_path: &Path,
    dataset_override: Option<&Path>,
    peers: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let config = GateConfig::load(config_path)?;
    let dataset_path = config.dataset_path(dataset_override)?;

    let gate = AccessGate::from_config(&config, Arc::new(dataset::load(&dataset_path)?));

    for peer in peers {
        let decision = gate.decide(Some(peer.as_str()));
        match &decision {
            Decision::Allow => println!("{}\tALLOW\t{}", peer, decision.status_code()),
            Decision::Deny(reason) => {
                println!("{}\tDENY\t{}\t{}", peer, decision.status_code(), reason)
            }
        }
    }
    Ok(())
}

fn verify(dataset_path: &Path, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Loading validates ordering and overlap.
    let table = dataset::load(dataset_path)?;

    if verbose {
        if let (Some(first), Some(last)) = (table.as_slice().first(), table.as_slice().last()) {
            println!(
                "Address span: {} - {}",
                Ipv4Addr::from(first.low),
                Ipv4Addr::from(last.high)
            );
        }
        let mut countries: Vec<&str> = table.iter().map(|r| r.country.as_str()).collect();
        countries.sort_unstable();
        countries.dedup();
        println!("Countries: {}", countries.len());
    }

    println!(
        "{:?}: {} ranges, {} addresses covered ({:.2}% of IPv4)",
        dataset_path,
        table.len(),
        table.coverage(),
        table.coverage() as f64 / (1u64 << 32) as f64 * 100.0
    );
    Ok(())
}

fn convert(
    input: &Path,
    output: &Path,
    text: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if verbose {
        println!("Reading input file: {:?}", input);
    }

    let table = dataset::load(input)?;

    if verbose {
        println!("Parsed {} ranges", table.len());
    }

    if text {
        dataset::save_text(&table, output)?;
    } else {
        dataset::save(&table, output)?;
    }

    println!("Successfully converted {:?} -> {:?}", input, output);
    Ok(())
}
