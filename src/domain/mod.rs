mod allocation;
mod audit;
mod client;
mod money;

pub use allocation::*;
pub use audit::*;
pub use client::*;
pub use money::*;
