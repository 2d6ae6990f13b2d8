//! CLI Commands

pub mod check;
pub mod pages;
pub mod run;
