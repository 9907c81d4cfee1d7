mod settings;

pub use settings::{HttpConfig, IpConfig, LogConfig, Settings};
