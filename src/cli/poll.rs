use std::time::Duration;

use clap::Parser;
use tokio::time::{MissedTickBehavior, interval};

use crate::{
    api::tigo::Transport,
    cli::{heartbeat::HeartbeatArgs, tigo::TigoArgs},
    fetcher::DataFetcher,
    prelude::*,
    tables::build_summary_table,
};

#[derive(Parser)]
pub struct PollArgs {
    #[clap(long = "polling-interval", env = "POLLING_INTERVAL", default_value = "1min")]
    polling_interval: humantime::Duration,

    #[clap(flatten)]
    tigo: TigoArgs,

    #[clap(flatten)]
    heartbeat: HeartbeatArgs,
}

impl PollArgs {
    pub async fn run(self) -> Result {
        let polling_interval: Duration = self.polling_interval.into();
        let mut fetcher = self.tigo.new_fetcher()?;
        if let Err(error) = fetcher.site_descriptor_async().await {
            // Not fatal: the cycles will keep logging in.
            warn!("failed to fetch the site descriptor: {error:#}");
        }
        poll(&mut fetcher, polling_interval, &self.heartbeat).await
    }
}

async fn poll<T: Transport>(
    fetcher: &mut DataFetcher<T>,
    polling_interval: Duration,
    heartbeat: &HeartbeatArgs,
) -> Result {
    let mut interval = interval(polling_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        match fetcher.fetch_cycle().await {
            Ok(report) => {
                info!(
                    report.is_last_values_refreshed,
                    session_expires_at = %fetcher.session_expires_at(),
                    "polled",
                );
                println!("{}", build_summary_table(&fetcher.view()));
                heartbeat.send().await;
            }
            Err(error) => {
                error!("cycle failed: {error:#}");
            }
        }
    }
}
