pub mod cidr;
pub mod dashboard;
pub mod database;
pub mod deployment;
pub mod entries;
pub mod format;
pub mod metric;
pub mod network;
pub mod secret;
pub mod service;
pub mod validation;

pub use cidr::*;
pub use dashboard::*;
pub use database::*;
pub use deployment::*;
pub use format::*;
pub use metric::*;
pub use network::*;
pub use secret::*;
pub use service::*;
pub use validation::*;
