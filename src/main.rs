use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rusty_chips::component::Component;
use rusty_chips::system_config::{Bench, ComponentFactory};

#[derive(Parser, Debug)]
#[command(
    name = "rusty_chips",
    version,
    about = "Run JSON test-vector benches against the chip models",
    long_about = "Each bench file names one component and a list of test vectors.\n\nSet RUST_LOG=debug to trace every evaluation.\n\nExample:\n  rusty_chips configs/am2901_add.json configs/ttl_7476_toggle.json"
)]
struct Cli {
    /// Bench files to run
    #[arg(required_unless_present = "list_components")]
    benches: Vec<PathBuf>,

    /// List the registered component types and exit
    #[arg(long)]
    list_components: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let factory = ComponentFactory::new();

    if cli.list_components {
        for component_type in factory.component_types() {
            println!("{}", component_type);
        }
        return ExitCode::SUCCESS;
    }

    let mut failed = 0;

    for path in &cli.benches {
        let bench = match Bench::load(&factory, path) {
            Ok(bench) => bench,
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                failed += 1;
                continue;
            }
        };

        println!(
            "{}: {} {}",
            bench.name(),
            bench.chip().component_type(),
            bench.chip().name()
        );
        let report = bench.run();
        for vector in 0..report.vectors {
            let mismatches: Vec<_> = report
                .mismatches
                .iter()
                .filter(|m| m.vector == vector)
                .collect();

            if mismatches.is_empty() {
                println!("  vector {}: ok", vector);
            }
            for mismatch in mismatches {
                println!("  {}", mismatch);
            }
        }

        if report.passed() {
            println!("PASS {} ({} vectors)", report.name, report.vectors);
        } else {
            println!(
                "FAIL {} ({} of {} vectors)",
                report.name,
                report.failed_vectors(),
                report.vectors
            );
            failed += 1;
        }
    }

    println!();
    println!("{} of {} benches passed", cli.benches.len() - failed, cli.benches.len());

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
