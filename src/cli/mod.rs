use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the chat interface over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, env = "CHAT_BIND", default_value = "127.0.0.1:8501")]
        bind: String,

        /// Drop chat sessions idle for this many seconds
        #[arg(long, env = "CHAT_SESSION_IDLE_SECS", default_value = "3600")]
        session_idle_secs: u64,

        /// Most chat sessions kept at once; the least recently used goes first
        #[arg(long, default_value = "1024")]
        max_sessions: usize,
    },

    /// Answer a single question using the DB_* connection settings
    Ask {
        question: String,

        /// Print the generated SQL before the answer
        #[arg(long)]
        show_sql: bool,
    },

    /// Print the schema description the model receives
    Schema,
}
