use std::path::PathBuf;
use clap::{ Parser, ArgAction };
use colored::Colorize;

mod artifact;
mod dependency_list;
mod descriptor;
mod embedded;
mod error;
mod generator;
mod policy;
mod reader;
mod resolver;
mod store;
mod writer;

use error::LicenseError;
use generator::{ OutputPaths, Summary };
use resolver::MavenRepositoryResolver;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON list of resolved dependencies ({"group", "name", "version"} records)
    #[arg(index = 1, required = true, value_name = "DEPENDENCIES")]
    dependencies: PathBuf,

    /// Maven-layout repository directory to look up descriptors and archives in (repeatable)
    #[arg(long = "repository", short = 'r', value_name = "DIR")]
    repositories: Vec<PathBuf>,

    /// Output file for the concatenated license texts
    #[arg(long, value_name = "FILE")]
    licenses: Option<PathBuf>,

    /// Output file for the offset:length index into the license pack
    #[arg(long, value_name = "FILE", default_value = "third_party_license_metadata")]
    metadata: PathBuf,

    /// Output file for the dependency manifest enriched with license names
    #[arg(long, value_name = "FILE", default_value = "dependencies.json")]
    manifest: PathBuf,

    /// Re-read the outputs after generation and check every entry resolves
    #[arg(long, action = ArgAction::SetTrue)]
    verify: bool,

    /// Show per-dependency progress
    #[arg(long, short, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match run(&args) {
        Ok(summary) => print_summary(&summary, &args),
        Err(e) => {
            eprintln!("{} {}", "License generation failed:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<Summary, LicenseError> {
    let dependencies = dependency_list::read_dependency_list(&args.dependencies)?;
    log::info!("Found {} dependencies in {}", dependencies.len(), args.dependencies.display());

    if args.repositories.is_empty() {
        log::warn!("No repositories given, descriptors and archives cannot be found");
    }
    let resolver = MavenRepositoryResolver::new(args.repositories.clone());

    let outputs = OutputPaths {
        licenses: args.licenses.clone(),
        metadata: args.metadata.clone(),
        manifest: args.manifest.clone(),
    };
    let summary = generator::generate(&dependencies, &resolver, &outputs)?;

    if args.verify {
        match &outputs.licenses {
            Some(pack) => {
                let checked = reader::verify_outputs(pack, &outputs.metadata)?;
                log::info!("Verified {} metadata entries against {}", checked, pack.display());
            }
            None => log::warn!("Nothing to verify without a license output file"),
        }
    }

    Ok(summary)
}

fn print_summary(summary: &Summary, args: &Args) {
    println!("\n=== LICENSE PACK SUMMARY ===\n");
    println!("Dependencies processed: {}", summary.dependencies);
    if summary.skipped > 0 {
        println!(
            "Dependencies without a recorded license: {}",
            summary.skipped.to_string().yellow()
        );
    }
    println!("Attributions recorded: {}", summary.attributions);
    println!("Distinct license texts: {}", summary.distinct_texts);
    println!("License pack size: {} bytes", summary.pack_bytes);

    match &args.licenses {
        Some(path) => println!("License pack: {}", path.display()),
        None => println!("License pack: {}", "not written".red().bold()),
    }
    println!("Metadata index: {}", args.metadata.display());
    println!("Dependency manifest: {}", args.manifest.display());
    println!("\n{}", "License generation complete.".green());
}
