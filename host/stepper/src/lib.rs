#![cfg_attr(not(test), no_std)]

pub mod axis;
pub mod config;
pub mod controller;
pub mod ramp;
pub mod robot;

#[cfg(test)]
mod mock;
