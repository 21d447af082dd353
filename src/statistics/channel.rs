use derive_more::Display;

/// Energy accumulator channel.
///
/// Bidirectional meters (grid and battery) are split into two channels by the sign of the reading,
/// so that every channel only ever grows.
#[derive(Copy, Clone, Debug, Display, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Channel {
    #[display("solar_energy")]
    SolarEnergy,

    #[display("home_energy")]
    HomeEnergy,

    #[display("grid_import")]
    GridImport,

    #[display("grid_export")]
    GridExport,

    #[display("battery_charge")]
    BatteryCharge,

    #[display("battery_discharge")]
    BatteryDischarge,
}
