mod api;
mod client;
#[cfg(test)]
pub mod fake;
pub mod links;
pub mod projects;
pub mod types;

pub use api::PipelinesApi;
pub use client::PipelinesClient;
