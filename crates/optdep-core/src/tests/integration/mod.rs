#![cfg(test)]

pub mod common;
pub mod broker_tests;
pub mod startup_tests;
