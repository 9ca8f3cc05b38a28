//! Application layer: topology resolution, remote management and the sync
//! engine built on top of them

pub mod services;
pub mod use_cases;
