mod answer_question;
mod generate_sql;
mod prompt_template;
mod prompts;

pub use answer_question::*;
pub use generate_sql::*;
pub use prompt_template::*;
pub use prompts::*;
