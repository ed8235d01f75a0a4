// src/attempt/mod.rs

//! The quiz attempt engine: timer, answer store, cursor, grading and the
//! controller tying them together.

pub mod answers;
pub mod controller;
pub mod cursor;
pub mod grading;
pub mod registry;
pub mod review;
pub mod timer;

pub use answers::AnswerStore;
pub use controller::AttemptController;
pub use cursor::{Cursor, Step};
pub use grading::{Grade, check_questions, grade};
pub use registry::AttemptRegistry;
pub use timer::CountdownTimer;
