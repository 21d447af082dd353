use std::time::Duration;

use clap::Parser;
use reqwest::Url;

use crate::{
    api::tigo::Portal,
    fetcher::DataFetcher,
    prelude::*,
    session::Credentials,
};

#[derive(Parser)]
pub struct TigoArgs {
    #[clap(long, env = "TIGO_USERNAME")]
    username: String,

    #[clap(long, env = "TIGO_PASSWORD", hide_env_values = true)]
    password: String,

    #[clap(long = "system-id", env = "TIGO_SYSTEM_ID")]
    system_id: String,

    #[clap(long = "base-url", env = "TIGO_BASE_URL", default_value = "https://ei.tigoenergy.com")]
    base_url: Url,

    /// Timeout of every single request.
    #[clap(long = "request-timeout", env = "TIGO_REQUEST_TIMEOUT", default_value = "10s")]
    request_timeout: humantime::Duration,
}

impl TigoArgs {
    pub fn new_fetcher(self) -> Result<DataFetcher<Portal>> {
        let timeout: Duration = self.request_timeout.into();
        let portal = Portal::new(self.base_url, timeout)?;
        Ok(DataFetcher::new(portal, Credentials::new(self.username, self.password, self.system_id)))
    }
}
