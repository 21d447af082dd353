use std::time::Duration;

use clap::Parser;
use reqwest::Url;

use crate::{api::client, prelude::*};

#[derive(Parser)]
pub struct HeartbeatArgs {
    #[clap(long = "heartbeat-url", env = "HEARTBEAT_URL")]
    pub url: Option<Url>,
}

impl HeartbeatArgs {
    pub async fn send(&self) {
        if let Some(url) = &self.url
            && let Err(error) = Self::send_fallible(url.clone()).await
        {
            warn!("failed to send the heartbeat: {error:#}");
        }
    }

    #[instrument(skip_all)]
    async fn send_fallible(url: Url) -> Result {
        debug!("sending a heartbeat…");
        client::builder(Duration::from_secs(3)).build()?.post(url).send().await?.error_for_status()?;
        Ok(())
    }
}
