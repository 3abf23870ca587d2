pub mod csv_recorder;
pub mod gekko_client;
pub mod strategy_settings;

pub use csv_recorder::CsvResultRecorder;
pub use gekko_client::GekkoClient;
pub use strategy_settings::TomlStrategyLoader;
