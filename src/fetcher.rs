//! One polling cycle: authenticate, fetch everything, integrate the power, merge the snapshot.

use chrono::{DateTime, Local, NaiveDate, Utc};
use futures::future::join_all;
use serde::de::DeserializeOwned;

use crate::{
    api::tigo::{
        AggregateEnergy,
        AuthHeader,
        BarChart,
        BarView,
        Endpoint,
        FetchError,
        InstantMetrics,
        LastValue,
        LastValueField,
        Lifetime,
        ObjectTypeId,
        SiteDescriptor,
        Transport,
    },
    prelude::*,
    session::{Credentials, SessionCache},
    snapshot::{InstantReadings, Snapshot, Stamped},
    statistics::EnergyIntegrator,
    view::ResultView,
};

/// Outcome of a completed cycle.
#[must_use]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CycleReport {
    /// Whether the last values were re-fetched for a new observation time.
    pub is_last_values_refreshed: bool,

    pub n_succeeded: usize,
    pub n_failed: usize,
}

impl CycleReport {
    fn record<T>(&mut self, what: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.n_succeeded += 1;
                Some(value)
            }
            Err(error) => {
                warn!("failed to fetch {what}: {error:#}");
                self.n_failed += 1;
                None
            }
        }
    }
}

pub struct DataFetcher<T> {
    transport: T,
    session: SessionCache,
    integrator: EnergyIntegrator,
    snapshot: Snapshot,

    /// Observation time (`HH:MM`) the last values were fetched for.
    last_observation_time: Option<String>,
}

impl<T: Transport> DataFetcher<T> {
    pub fn new(transport: T, credentials: Credentials) -> Self {
        Self {
            transport,
            session: SessionCache::new(credentials),
            integrator: EnergyIntegrator::default(),
            snapshot: Snapshot::default(),
            last_observation_time: None,
        }
    }

    pub fn view(&self) -> ResultView<'_> {
        ResultView::new(&self.snapshot, self.session.site_descriptor())
    }

    /// Get the site descriptor, logging in if needed. Meant for the set-up, before polling.
    pub async fn site_descriptor_async(&mut self) -> Result<&SiteDescriptor> {
        self.session.site_descriptor_async(&self.transport, Utc::now()).await
    }

    /// Expiry of the current session, or the distant past when logged out.
    pub fn session_expires_at(&self) -> DateTime<Utc> {
        self.session.expires_at()
    }

    pub async fn fetch_cycle(&mut self) -> Result<CycleReport> {
        self.fetch_cycle_with(Utc::now).await
    }

    /// Run the cycle.
    ///
    /// Only authentication and the daily aggregate abort it, all the other sub-fetches fail
    /// independently, leaving their previous values in the snapshot.
    ///
    /// The clock is read at the start, and once more when the instantaneous metrics arrive:
    /// that is the instant their power is integrated at.
    #[instrument(skip_all)]
    pub async fn fetch_cycle_with(
        &mut self,
        clock: impl Fn() -> DateTime<Utc>,
    ) -> Result<CycleReport> {
        let now = clock();
        debug!(%now, "starting the cycle…");
        let auth_header = self
            .session
            .auth_header(&self.transport, now)
            .await
            .context("failed to authenticate")?;
        let date = now.with_timezone(&Local).date_naive();
        let system_id = self.session.credentials().system_id.clone();

        let endpoint = Endpoint::aggregate_energy(&system_id, date);
        let reply = self
            .transport
            .get(&endpoint, &auth_header)
            .await
            .context("failed to fetch the daily aggregate energy")?;
        if !reply.status.is_success() {
            self.session.reset();
            return Err(FetchError::SessionExpired { path: endpoint.path, status: reply.status }.into());
        }
        let aggregate: AggregateEnergy = reply.json(endpoint.path)?;
        info!(n_devices = aggregate.dataset.len(), "fetched the daily aggregate energy");

        let observation_time = aggregate
            .latest_observation_time()
            .filter(|time| self.last_observation_time.as_deref() != Some(*time))
            .map(ToOwned::to_owned);
        self.snapshot.energy = Some(Stamped::new(aggregate, now));

        let requests = Requests {
            transport: &self.transport,
            auth_header: &auth_header,
            system_id: &system_id,
            date,
        };
        let instant_metrics = async {
            let endpoint = Endpoint::instant_metrics(&system_id, &ObjectTypeId::INSTANT);
            let result = requests.get::<InstantMetrics>(endpoint).await;
            (result, clock())
        };
        let (last_values, (instant_metrics, received_at), bars, lifetime) = tokio::join!(
            requests.last_values(observation_time.as_deref()),
            instant_metrics,
            requests.bars(),
            requests.get::<Lifetime>(Endpoint::lifetime(&system_id)),
        );

        let mut report =
            CycleReport { is_last_values_refreshed: observation_time.is_some(), ..Default::default() };
        if let Some(observation_time) = observation_time {
            info!(%observation_time, "observation time has changed");
            self.last_observation_time = Some(observation_time);
        }
        for (field, result) in last_values {
            if let Some(last_value) = report.record(&format!("`{field}` last values"), result) {
                self.snapshot.last_values.insert(field, Stamped::new(last_value.dataset, now));
            }
        }
        if let Some(metrics) = report.record("the instantaneous metrics", instant_metrics) {
            self.apply_instant_metrics(&metrics, received_at);
        }
        for (view, result) in bars {
            if let Some(chart) = report.record(&format!("the `{view}` bar chart"), result) {
                self.snapshot.bars.insert(view, Stamped::new(chart.solar_total(), now));
            }
        }
        if let Some(lifetime) = report.record("the lifetime summary", lifetime) {
            self.snapshot.lifetime_energy = Some(Stamped::new(lifetime.energy, now));
        }

        info!(report.n_succeeded, report.n_failed, "cycle completed");
        Ok(report)
    }

    fn apply_instant_metrics(&mut self, metrics: &InstantMetrics, received_at: DateTime<Utc>) {
        let readings = InstantReadings::from(metrics);
        debug!(
            time = ?readings.time,
            n_metrics = readings.object_types.len(),
            readings.is_data_available,
            since_last_sample = ?self.integrator.last_instant().map(|last| received_at - last),
            "instantaneous metrics",
        );
        self.integrator.feed(readings.power_sample(), received_at);
        let totals = self.integrator.accumulators();
        debug!(
            solar = %totals.solar,
            home = %totals.home,
            grid_import = %totals.grid.import,
            grid_export = %totals.grid.export,
            battery_charge = %totals.battery.import,
            battery_discharge = %totals.battery.export,
            "integrated",
        );
        self.snapshot.instant = Some(Stamped::new(readings, received_at));
        self.snapshot.energy_totals = Some(Stamped::new(totals, received_at));
    }
}

/// Sub-fetches of a single cycle, sharing the session.
struct Requests<'a, T> {
    transport: &'a T,
    auth_header: &'a AuthHeader,
    system_id: &'a str,
    date: NaiveDate,
}

impl<T> Clone for Requests<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Requests<'_, T> {}

impl<T: Transport> Requests<'_, T> {
    #[instrument(skip_all, level = Level::DEBUG, fields(path = endpoint.path))]
    async fn get<R: DeserializeOwned>(self, endpoint: Endpoint) -> Result<R> {
        self.transport.get(&endpoint, self.auth_header).await?.json(endpoint.path)
    }

    /// Fetch all the last values for the observation time, if there is one.
    async fn last_values(
        self,
        observation_time: Option<&str>,
    ) -> Vec<(LastValueField, Result<LastValue>)> {
        let Some(observation_time) = observation_time else {
            return Vec::new();
        };
        join_all(LastValueField::ALL.map(|field| async move {
            let endpoint =
                Endpoint::last_value(self.system_id, self.date, field, observation_time);
            (field, self.get(endpoint).await)
        }))
        .await
    }

    async fn bars(self) -> Vec<(BarView, Result<BarChart>)> {
        join_all(BarView::ALL.map(|view| async move {
            (view, self.get(Endpoint::bar_chart(self.system_id, view, self.date)).await)
        }))
        .await
    }
}
