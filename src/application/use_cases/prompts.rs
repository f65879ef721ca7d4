use crate::domain::PipelineProfile;

use super::PromptTemplate;

const DECISIONS_SQL_TEMPLATE: &str = "
    You are a legal analyst specializing in the Moroccan Constitutional Court's decisions. You are interacting with a user who is asking you questions about the court's database.
    Based on the table schema below, write a SQL query that would retrieve the relevant information from the court's decisions database. Take the conversation history into account.

    <SCHEMA>{schema}</SCHEMA>

    Conversation History: {chat_history}

    Write only the SQL query and nothing else. Do not wrap the SQL query in any other text, not even backticks.

    For example:
    Question: Retrieve all decisions made in the year 2022.
    SQL Query: SELECT * FROM decisions WHERE year = 2022;

    Question: What were the decisions related to electoral disputes?
    SQL Query: SELECT * FROM decisions WHERE specialty = 'Electoral Disputes';

    Question: List the summary and content of decision number 121/1963.
    SQL Query: SELECT summary, content FROM decisions WHERE decision_number = '121/1963';

    Your turn:

    Question: {question}
    SQL Query:
    ";

const DECISIONS_ANSWER_TEMPLATE: &str = "
    You are a legal analyst specializing in the Moroccan Constitutional Court's decisions. You are interacting with a user who is asking you questions about the court's database.
    Based on the table schema below, question, sql query, and sql response, write a natural language response.
    <SCHEMA>{schema}</SCHEMA>

    Conversation History: {chat_history}
    SQL Query: <SQL>{query}</SQL>
    User question: {question}
    SQL Response: {response}";

const DUSTURIA_SQL_TEMPLATE: &str = "
    You are an assistant for the Dusturia archive of Moroccan Constitutional Court decisions. You are interacting with a user who is asking you questions about the archive.
    Based on the table schema below, write a MySQL query against the dusturia_records table that answers the user's question. Take the conversation history into account.
    Keep result sets small: select only the columns needed, shorten long text columns with LEFT(..., 200) and add LIMIT 10 unless the user asks for a count.

    <SCHEMA>{schema}</SCHEMA>

    Conversation History: {chat_history}

    Write only the SQL query and nothing else. Do not wrap the SQL query in any other text, not even backticks.

    For example:
    Question: Retrieve all decisions made in the year 2022.
    SQL Query: SELECT year, specialty, LEFT(summary, 200) as summary_excerpt FROM dusturia_records WHERE year = 2022 LIMIT 10;

    Question: How many decisions concern electoral disputes?
    SQL Query: SELECT COUNT(*) FROM dusturia_records WHERE specialty = 'Electoral Disputes';

    Question: Show the summary of decision number 121/1963.
    SQL Query: SELECT decision_number, year, LEFT(summary, 200) as summary_excerpt FROM dusturia_records WHERE decision_number = '121/1963' LIMIT 10;

    Your turn:

    Question: {question}
    SQL Query:
    ";

const DUSTURIA_ANSWER_TEMPLATE: &str = "
    You are an assistant for the Dusturia archive of Moroccan Constitutional Court decisions. You are interacting with a user who is asking you questions about the archive.
    Based on the table schema below, question, sql query, and sql response, write a concise natural language answer. If the SQL response is empty, say that no matching decisions were found.
    <SCHEMA>{schema}</SCHEMA>

    Conversation History: {chat_history}
    SQL Query: <SQL>{query}</SQL>
    User question: {question}
    SQL Response: {response}";

/// Post-processing applied to an executed query before the answer prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcess {
    /// Always ask the LLM to phrase the answer.
    None,
    /// Queries containing `COUNT` are answered with a canned sentence built
    /// from the first scalar of the result.
    CountShortcut,
}

/// The SQL-generation and answer templates of one deployment.
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub sql: PromptTemplate,
    pub answer: PromptTemplate,
    pub post_process: PostProcess,
}

impl PromptSet {
    pub fn for_profile(profile: PipelineProfile) -> Self {
        match profile {
            PipelineProfile::Decisions => Self {
                sql: PromptTemplate::new(DECISIONS_SQL_TEMPLATE),
                answer: PromptTemplate::new(DECISIONS_ANSWER_TEMPLATE),
                post_process: PostProcess::None,
            },
            PipelineProfile::Dusturia => Self {
                sql: PromptTemplate::new(DUSTURIA_SQL_TEMPLATE),
                answer: PromptTemplate::new(DUSTURIA_ANSWER_TEMPLATE),
                post_process: if profile.counts_shortcut() {
                    PostProcess::CountShortcut
                } else {
                    PostProcess::None
                },
            },
        }
    }
}
