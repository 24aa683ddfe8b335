//! Domain models shared by the corpus, retrieval and answer layers

mod answer;
mod question;

pub use answer::{AnswerResult, APOLOGY_TEXT};
pub use question::{CorpusRecord, ExamSource, GradeLevel, ReferenceId, ReferenceQuestion};
