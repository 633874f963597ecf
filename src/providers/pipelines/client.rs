mod core;
mod queries;

pub use self::core::PipelinesClient;
