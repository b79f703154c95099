pub mod highlight;
pub mod output;

pub use highlight::AnswerRenderer;
pub use output::*;
