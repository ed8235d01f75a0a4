// src/models/mod.rs

pub mod answer;
pub mod attempt;
pub mod question;
pub mod quiz;
pub mod timer;
