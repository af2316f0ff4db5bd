#![cfg_attr(not(test), no_std)]

pub mod blink;
pub mod config;
pub mod gpio;
pub mod load;
pub mod mode;
pub mod press;
pub mod startup;
pub mod tasks;

#[cfg(test)]
mod sim;
