use clap::Parser;
use log::error;
use std::net::IpAddr;
use std::process::ExitCode;
use whoip::ClientBuilder;

mod cli;

/*-------------------------------------------------------------------------------------------------
  Main CLI Function
-------------------------------------------------------------------------------------------------*/

fn main() -> ExitCode {
    let args = cli::Args::parse();

    stderrlog::new()
        .module("whoip")
        .verbosity(args.verbose.log_level_filter())
        .init()
        .ok();

    /*----------------------------------------------------------------------------
      Category Catalog
    ----------------------------------------------------------------------------*/

    if args.categories {
        let categories = whoip::categories();
        match args.output {
            cli::OutputFormat::Json => {
                if let Err(error) = cli::output::json(categories) {
                    error!("Unable to render the categories: {error}");
                    return ExitCode::FAILURE;
                }
            }
            cli::OutputFormat::Table => cli::output::category_table(categories),
        }
        return ExitCode::SUCCESS;
    }

    /*----------------------------------------------------------------------------
      Client
    ----------------------------------------------------------------------------*/

    let data_dir = match cli::utils::data_directory() {
        Ok(data_dir) => data_dir,
        Err(error) => {
            error!("{error}");
            return ExitCode::FAILURE;
        }
    };

    let mut builder = ClientBuilder::new(&data_dir);
    if args.offline {
        builder.refresh_on_lookup(false);
    }
    let client = match builder.build() {
        Ok(client) => client,
        Err(error) => {
            error!("{error}");
            return ExitCode::FAILURE;
        }
    };

    /*----------------------------------------------------------------------------
      Source Status
    ----------------------------------------------------------------------------*/

    if args.sources {
        if args.offline {
            client.load_cached();
        } else {
            cli::log::refresh_report(&client.refresh());
        }

        let sources = client.sources();
        match args.output {
            cli::OutputFormat::Json => {
                if let Err(error) = cli::output::json(&sources) {
                    error!("Unable to render the sources: {error}");
                    return ExitCode::FAILURE;
                }
            }
            cli::OutputFormat::Table => cli::output::source_table(&sources),
        }
        return ExitCode::SUCCESS;
    }

    /*----------------------------------------------------------------------------
      Lookup
    ----------------------------------------------------------------------------*/

    let Some(ip_address) = args.ip_address.as_deref() else {
        error!("Missing IP address");
        return ExitCode::FAILURE;
    };
    let ip: IpAddr = match ip_address.trim().parse() {
        Ok(ip) => ip,
        Err(_) => {
            error!("Invalid IP address: {ip_address:?}");
            return ExitCode::FAILURE;
        }
    };

    let matches = client.find_ip(ip);
    cli::log::lookup_results(&ip, &matches);

    match args.output {
        cli::OutputFormat::Json => {
            if let Err(error) = cli::output::json(&matches) {
                error!("Unable to render the matches: {error}");
                return ExitCode::FAILURE;
            }
        }
        cli::OutputFormat::Table => cli::output::match_table(&matches),
    }

    if let Some(csv_file) = &args.csv_file {
        if let Err(error) = cli::csv::save(&matches, csv_file) {
            error!("Unable to save the matches to {csv_file:?}: {error}");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
