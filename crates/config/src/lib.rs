pub mod settings;

pub use settings::{GatewaySettings, Settings, SyncSettings};
