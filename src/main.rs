//! `catalog-admin`: create, drop or inspect the catalog schema.
//!
//! Usage: `catalog-admin <create|drop|tables>`. The database comes from
//! `APP_DATABASE_URL` or the YAML files under `config/`.

use std::process::ExitCode;

use catalog_crawl_store::config::AppConfig;
use catalog_crawl_store::db::establish_connection_pool_with_timeout;
use catalog_crawl_store::repository::{DieselRepository, RepositoryResult, SchemaManager};

#[derive(Debug, Clone, Copy)]
enum Command {
    Create,
    Drop,
    Tables,
}

impl Command {
    fn parse(arg: Option<&str>) -> Option<Self> {
        match arg? {
            "create" => Some(Self::Create),
            "drop" => Some(Self::Drop),
            "tables" => Some(Self::Tables),
            _ => None,
        }
    }
}

fn run(command: Command, repo: &DieselRepository) -> RepositoryResult<()> {
    match command {
        Command::Create => {
            repo.create_schema()?;
            log::info!("Catalog schema is up to date");
        }
        Command::Drop => {
            repo.drop_schema()?;
            log::info!("Catalog schema dropped");
        }
        Command::Tables => {
            for table in repo.list_tables()? {
                println!("{table}");
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let arg = std::env::args().nth(1);
    let Some(command) = Command::parse(arg.as_deref()) else {
        eprintln!("usage: catalog-admin <create|drop|tables>");
        return ExitCode::from(2);
    };

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let lease = match config.lease() {
        Ok(lease) => lease,
        Err(e) => {
            log::error!("Invalid crawl lease settings: {e}");
            return ExitCode::FAILURE;
        }
    };

    let pool = match establish_connection_pool_with_timeout(
        &config.database_url,
        config.busy_timeout(),
    ) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to {}: {e}", config.database_url);
            return ExitCode::FAILURE;
        }
    };

    let repo = DieselRepository::new(pool).with_lease(lease);

    match run(command, &repo) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{command:?} failed: {e}");
            ExitCode::FAILURE
        }
    }
}
