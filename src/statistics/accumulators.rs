use crate::{
    quantity::energy::WattHours,
    statistics::{Channel, Flow},
};

/// Cumulative energy per channel since the process start.
#[must_use]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EnergyAccumulators {
    pub solar: WattHours,
    pub home: WattHours,
    pub grid: Flow<WattHours>,
    pub battery: Flow<WattHours>,
}

impl EnergyAccumulators {
    pub const fn get(&self, channel: Channel) -> WattHours {
        match channel {
            Channel::SolarEnergy => self.solar,
            Channel::HomeEnergy => self.home,
            Channel::GridImport => self.grid.import,
            Channel::GridExport => self.grid.export,
            Channel::BatteryCharge => self.battery.import,
            Channel::BatteryDischarge => self.battery.export,
        }
    }

    /// Add the energy to the channel.
    ///
    /// Negative energy is ignored: accumulators never decrease.
    pub fn add(&mut self, channel: Channel, energy: WattHours) {
        *self.get_mut(channel) += energy.max(WattHours::ZERO);
    }

    const fn get_mut(&mut self, channel: Channel) -> &mut WattHours {
        match channel {
            Channel::SolarEnergy => &mut self.solar,
            Channel::HomeEnergy => &mut self.home,
            Channel::GridImport => &mut self.grid.import,
            Channel::GridExport => &mut self.grid.export,
            Channel::BatteryCharge => &mut self.battery.import,
            Channel::BatteryDischarge => &mut self.battery.export,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_routes_to_channel() {
        let mut accumulators = EnergyAccumulators::default();
        accumulators.add(Channel::GridExport, WattHours(5.0));
        accumulators.add(Channel::BatteryDischarge, WattHours(2.0));
        assert_eq!(accumulators.grid.export, WattHours(5.0));
        assert_eq!(accumulators.battery.export, WattHours(2.0));
        assert_eq!(accumulators.get(Channel::GridImport), WattHours::ZERO);
    }

    #[test]
    fn test_negative_energy_is_ignored() {
        let mut accumulators = EnergyAccumulators::default();
        accumulators.add(Channel::SolarEnergy, WattHours(3.0));
        accumulators.add(Channel::SolarEnergy, WattHours(-1.0));
        assert_eq!(accumulators.get(Channel::SolarEnergy), WattHours(3.0));
    }
}
