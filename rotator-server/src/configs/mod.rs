mod settings;

pub use settings::{Device, Discovery, Logger, Server, Settings};
