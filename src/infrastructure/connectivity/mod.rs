pub mod monitor;
pub mod probe;

pub use monitor::{ConnectivityMonitor, NetworkState, SubscriptionId};
pub use probe::HealthProbe;
