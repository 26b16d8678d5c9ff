//! Concrete adapter implementations of the port traits.

pub mod cache;
pub mod eastmoney;
pub mod file_config_adapter;
pub mod web;
