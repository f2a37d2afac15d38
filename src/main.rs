use clap::Parser;
use log::info;

use sph_core::cli::{Cli, Commands};
use sph_core::config::DomainConfig;
use sph_core::domain::Domain;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            t_final,
            dt,
            dt_out,
            file_key,
        } => {
            let config = DomainConfig::from_toml_file(&config)?;
            let mut domain = Domain::new(config.clone());
            for spec in &config.boxes {
                domain.add_box_length(spec);
            }
            info!("starting run with {} particles", domain.particles.len());
            domain.solve(t_final, dt, dt_out, &file_key)?;
        }
        Commands::Restart {
            config,
            key,
            t_final,
            dt,
            dt_out,
            file_key,
        } => {
            let config = DomainConfig::from_toml_file(&config)?;
            let mut domain = Domain::load(config, &key)?;
            info!("resumed run with {} particles", domain.particles.len());
            domain.solve(t_final, dt, dt_out, &file_key)?;
        }
    }

    Ok(())
}
