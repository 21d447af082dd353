use clap::{Parser, Subcommand};

use crate::{
    cli::tigo::TigoArgs,
    prelude::*,
    tables::{build_devices_table, build_readings_table, build_summary_table},
    view::Reading,
};

#[derive(Parser)]
pub struct BurrowArgs {
    #[clap(flatten)]
    tigo: TigoArgs,

    #[command(subcommand)]
    command: BurrowCommand,
}

impl BurrowArgs {
    #[instrument(skip_all)]
    pub async fn run(self) -> Result {
        let mut fetcher = self.tigo.new_fetcher()?;

        match self.command {
            BurrowCommand::Devices => {
                let site = fetcher.site_descriptor_async().await?;
                info!(n_objects = site.system.objects.len(), "gotcha");
                println!("{}", build_devices_table(&fetcher.view()));
            }
            BurrowCommand::Cycle(args) => {
                let report = fetcher.fetch_cycle().await?;
                info!(report.n_succeeded, report.n_failed, "gotcha");
                let view = fetcher.view();
                println!("{}", build_summary_table(&view));
                println!("{}", build_readings_table(&view, &args.readings));
            }
        }

        Ok(())
    }
}

#[derive(Subcommand)]
enum BurrowCommand {
    /// Log in and list the panels.
    Devices,

    /// Run a single polling cycle and print the results.
    Cycle(BurrowCycleArgs),
}

#[derive(Parser)]
struct BurrowCycleArgs {
    /// Per-panel readings to print.
    #[clap(
        long,
        value_delimiter = ',',
        num_args = 1..,
        default_value = "energy,pin,rssi,pwm,temp,vin,vout,iin,reclaimedPower"
    )]
    readings: Vec<Reading>,
}
