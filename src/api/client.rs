use std::time::Duration;

use reqwest::ClientBuilder;

/// Default client builder shared by all the outgoing HTTP clients.
pub fn builder(timeout: Duration) -> ClientBuilder {
    ClientBuilder::new().user_agent(concat!("tigo-cloud/", env!("CARGO_PKG_VERSION"))).timeout(timeout)
}
