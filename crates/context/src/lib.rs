//! SolveWithMe Answer Engine
//!
//! Turns a student's question into a localized, step-by-step answer grounded
//! in solved WAEC/JAMB exam questions.

pub mod engine;

pub use engine::{extract_steps, AnswerEngine, EngineConfig};
