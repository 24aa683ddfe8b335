//! API handlers module

pub mod answer;
pub mod corpus;
pub mod health;
