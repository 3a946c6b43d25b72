#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod camera;
pub mod config;
pub mod form;
pub mod model;
pub mod submission;
pub mod tui;
