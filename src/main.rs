// Entry point for the ledger CLI. Settings come from the environment or --config,
// and the log level is taken from those settings.
use architect_ledger::{run_simulation, Command, Config, Opt, GLOBAL_CONFIG};
use clap::Parser;
use log::error;
use std::process;

fn main() {
    let opt = Opt::parse();

    let config = match opt.config.as_ref().map(Config::from_file).transpose() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    let settings = config
        .as_ref()
        .map(Config::get_settings)
        .unwrap_or_else(|| GLOBAL_CONFIG.get_settings());

    env_logger::builder()
        .filter_level(settings.log_level_filter())
        .init();

    if let Err(e) = run_command(opt.command, settings) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(
    command: Command,
    mut settings: architect_ledger::LedgerSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Simulate {
            blocks,
            fork_every,
            cut_off_age,
            json,
        } => {
            if let Some(cut_off_age) = cut_off_age {
                settings.cut_off_age = cut_off_age;
            }
            let report = run_simulation(blocks, fork_every, &settings)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Cutoff age:         {}", report.cut_off_age);
                println!("Blocks created:     {}", report.blocks_created);
                println!("Forks created:      {}", report.forks_created);
                println!("Transactions:       {}", report.transactions_confirmed);
                println!("Max height:         {}", report.max_height);
                println!("Retained blocks:    {}", report.retained_blocks);
                match report.min_retained_height {
                    Some(height) => println!("Lowest height kept: {height}"),
                    None => println!("Lowest height kept: none"),
                }
                println!("Tip:                {}", report.tip_hash);
                match report.tip_value {
                    Some(value) => println!(
                        "Value at tip:       {value} (expected {})",
                        report.expected_value
                    ),
                    None => println!("Value at tip:       overflow"),
                }
                println!(
                    "Genesis extendable: {}",
                    report.genesis_extension_accepted
                );
            }
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }
    Ok(())
}
