use std::path::PathBuf;

use clap::Parser;
use log::error;

use mutex_bank_sim::driver;

/// Simulates a bank of account-nodes coordinating transfers through distributed
/// mutual exclusion (Ricart-Agrawala, or Roucairol-Carvalho with a static quorum).
#[derive(Parser, Debug)]
#[command(name = "mutex-bank-sim", version, about)]
struct Cli {
    /// Directory containing `transactions.txt` (or `transacciones.txt`) and,
    /// optionally, `quorum.txt`.
    test_folder: PathBuf,

    /// Free-form label tagging the metrics file; a label containing "optim"
    /// (case-insensitive) selects the R2/quorum variant, anything else selects R1.
    algorithm_label: String,
}

fn main() {
    env_logger::Builder::from_default_env().init();
    let cli = Cli::parse();

    let working_dir = std::env::current_dir().expect("could not determine working directory");
    match driver::run(&cli.test_folder, &cli.algorithm_label, &working_dir) {
        Ok(()) => {}
        Err(e) => {
            error!("run failed: {e}");
            std::process::exit(1);
        }
    }
}
