use clap::Parser;

use romset::archive::select_backend;
use romset::assemble::assemble_sets;
use romset::cli::Cli;
use romset::config::Config;
use romset::dat::Catalog;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::try_from(cli)?;

    let catalog = Catalog::load(&config.dat, config.checksum)?;
    let backend = select_backend(&config)?;
    let summary = assemble_sets(&catalog, backend.as_ref(), &config)?;

    if config.print_summary {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
