use bon::Builder;
use chrono::{DateTime, TimeDelta, Utc};

use crate::{
    quantity::power::Watts,
    statistics::{Channel, EnergyAccumulators, Flow},
};

/// Instantaneous power readings from one successful fetch.
///
/// Grid power is positive when exporting, battery power is positive when charging.
#[must_use]
#[derive(Copy, Clone, Debug, Default, Builder)]
pub struct PowerSample {
    pub solar: Option<Watts>,
    pub home: Option<Watts>,
    pub grid: Option<Watts>,
    pub battery: Option<Watts>,
}

impl PowerSample {
    /// Split the sample into non-negative per-channel powers.
    ///
    /// Missing readings produce no channel at all.
    pub fn channels(self) -> impl Iterator<Item = (Channel, Watts)> {
        let grid = self.grid.map(Flow::exporting_positive);
        let battery = self.battery.map(Flow::importing_positive);
        [
            (Channel::SolarEnergy, self.solar.map(|power| power.max(Watts::ZERO))),
            (Channel::HomeEnergy, self.home.map(|power| power.max(Watts::ZERO))),
            (Channel::GridImport, grid.map(|flow| flow.import)),
            (Channel::GridExport, grid.map(|flow| flow.export)),
            (Channel::BatteryCharge, battery.map(|flow| flow.import)),
            (Channel::BatteryDischarge, battery.map(|flow| flow.export)),
        ]
        .into_iter()
        .filter_map(|(channel, power)| Some((channel, power?)))
    }
}

/// Integrates instantaneous power into cumulative energy.
///
/// Left-rectangle rule: the previous sample's power is held constant until the next sample.
#[must_use]
#[derive(Default)]
pub struct EnergyIntegrator {
    accumulators: EnergyAccumulators,
    last_instant: Option<DateTime<Utc>>,
    last_sample: PowerSample,
}

impl EnergyIntegrator {
    /// Add `power` held since the last sample instant to the channel.
    ///
    /// Without a previous instant there is no interval to integrate over, so this is a no-op.
    pub fn integrate(&mut self, channel: Channel, power: Watts, now: DateTime<Utc>) {
        if let Some(last_instant) = self.last_instant {
            let elapsed = (now - last_instant).max(TimeDelta::zero());
            self.accumulators.add(channel, power * elapsed);
        }
    }

    /// Integrate the previously held sample up to `now` and make `sample` the new baseline.
    ///
    /// The baseline always advances, even if the new sample is missing some readings.
    pub fn feed(&mut self, sample: PowerSample, now: DateTime<Utc>) {
        for (channel, power) in self.last_sample.channels() {
            self.integrate(channel, power, now);
        }
        self.last_instant = Some(now);
        self.last_sample = sample;
    }

    pub const fn accumulators(&self) -> EnergyAccumulators {
        self.accumulators
    }

    pub const fn last_instant(&self) -> Option<DateTime<Utc>> {
        self.last_instant
    }
}
