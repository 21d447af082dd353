mod accumulators;
mod channel;
mod flow;
mod integrator;

pub use self::{
    accumulators::EnergyAccumulators,
    channel::Channel,
    flow::Flow,
    integrator::{EnergyIntegrator, PowerSample},
};
