// agent/sql_agent.rs
use crate::agent::{AgentError, ChatModel, SqlAgent};
use crate::config::{MAX_RESULT_ROWS, MAX_SQL_ATTEMPTS, RESTAURANTS_TABLE, SAMPLE_ROWS};
use crate::db::connection::Database;
use crate::db::restaurants::{run_read_only, table_definition, QueryRows};
use tracing::{debug, info, warn};

const SQL_SYSTEM_PROMPT: &str = "You are an expert SQLite analyst. \
Given a table definition and a question, reply with exactly one SQLite SELECT statement \
that answers the question. Only query the tables shown. Never modify data. \
Do not explain the query and do not wrap it in Markdown.";

const ANSWER_SYSTEM_PROMPT: &str = "You answer questions about restaurants. \
Use only the SQL result you are given. If the result is empty, say that no matching \
restaurants were found. Never mention SQL, tables or queries in the answer.";

/// Agent that asks a chat model for SQL, runs it against the restaurants
/// table, and asks the model again to phrase the result.
pub struct LlmSqlAgent<M> {
    db: Database,
    model: M,
    table: String,
}

impl<M: ChatModel> LlmSqlAgent<M> {
    pub fn new(db: Database, model: M) -> Self {
        Self {
            db,
            model,
            table: RESTAURANTS_TABLE.to_string(),
        }
    }

    /// `CREATE TABLE` statement plus a few sample rows, the context the model
    /// needs to write a query.
    fn describe_table(&self) -> Result<String, AgentError> {
        self.db
            .with_existing_conn(|conn| {
                let ddl = table_definition(conn, &self.table)?;
                let sample = match &ddl {
                    Some(_) => Some(run_read_only(
                        conn,
                        &format!("SELECT * FROM {} LIMIT {}", self.table, SAMPLE_ROWS),
                        SAMPLE_ROWS,
                    )?),
                    None => None,
                };
                Ok((ddl, sample))
            })
            .map_err(|e| AgentError::Db(e.to_string()))
            .and_then(|(ddl, sample)| match (ddl, sample) {
                (Some(ddl), Some(sample)) => Ok(format!(
                    "{ddl}\n\n/* {} sample rows from {}:\n{} */",
                    sample.rows.len(),
                    self.table,
                    format_rows(&sample)
                )),
                _ => Err(AgentError::Db(format!(
                    "table '{}' does not exist; run the ETL first",
                    self.table
                ))),
            })
    }

    fn run_query(&self, sql: &str) -> Result<QueryRows, String> {
        ensure_read_only(sql)?;
        self.db
            .with_existing_conn(|conn| run_read_only(conn, sql, MAX_RESULT_ROWS))
            .map_err(|e| e.to_string())
    }

    fn compose_answer(&self, question: &str, sql: &str, rows: &QueryRows) -> Result<String, AgentError> {
        let mut prompt = format!(
            "Question: {question}\n\nSQL query:\n{sql}\n\nSQL result ({} rows):\n{}",
            rows.rows.len(),
            format_rows(rows)
        );
        if rows.truncated {
            prompt.push_str(&format!("\n(only the first {MAX_RESULT_ROWS} rows are shown)"));
        }

        let answer = self.model.generate(ANSWER_SYSTEM_PROMPT, &prompt)?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(AgentError::EmptyAnswer);
        }
        Ok(answer.to_string())
    }
}

impl<M: ChatModel> SqlAgent for LlmSqlAgent<M> {
    fn ask(&self, question: &str) -> Result<String, AgentError> {
        if !self.model.has_credential() {
            return Err(AgentError::MissingCredential);
        }

        let schema = self.describe_table()?;
        let mut feedback: Option<String> = None;
        let mut last_error = String::new();

        for attempt in 1..=MAX_SQL_ATTEMPTS {
            let prompt = sql_prompt(&schema, question, feedback.as_deref());
            let reply = self.model.generate(SQL_SYSTEM_PROMPT, &prompt)?;
            let sql = extract_sql(&reply);
            debug!(attempt, %sql, "generated query");

            match self.run_query(&sql) {
                Ok(rows) => {
                    info!(attempt, rows = rows.rows.len(), "query succeeded");
                    return self.compose_answer(question, &sql, &rows);
                }
                Err(msg) => {
                    warn!(attempt, %sql, "query failed: {msg}");
                    feedback = Some(format!("Previous query:\n{sql}\nIt failed with: {msg}"));
                    last_error = msg;
                }
            }
        }

        Err(AgentError::Query(format!(
            "no usable query after {MAX_SQL_ATTEMPTS} attempts, last error: {last_error}"
        )))
    }
}

fn sql_prompt(schema: &str, question: &str, feedback: Option<&str>) -> String {
    let mut prompt = format!("{schema}\n\nQuestion: {question}\n");
    if let Some(fb) = feedback {
        prompt.push_str(&format!("\n{fb}\nWrite a corrected query.\n"));
    }
    prompt.push_str("\nSQLite query:");
    prompt
}

/// Pull the statement out of a model reply, dropping Markdown fences and a
/// trailing semicolon.
pub fn extract_sql(reply: &str) -> String {
    let mut text = reply.trim();

    if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        let body = match after.find("```") {
            Some(end) => &after[..end],
            None => after,
        };
        // Skip a language tag such as "sql" on the fence line.
        text = match body.split_once('\n') {
            Some((tag, rest)) if is_fence_tag(tag.trim()) => rest,
            _ => body,
        };
    }

    text.trim().trim_end_matches(';').trim().to_string()
}

fn is_fence_tag(tag: &str) -> bool {
    tag.chars().all(|c| c.is_ascii_alphanumeric())
        && !tag.eq_ignore_ascii_case("select")
        && !tag.eq_ignore_ascii_case("with")
}

/// Only plain reads are allowed through; `PRAGMA query_only` backs this up.
pub fn ensure_read_only(sql: &str) -> Result<(), String> {
    let first = sql
        .split_whitespace()
        .next()
        .map(|w| w.to_ascii_uppercase())
        .unwrap_or_default();

    match first.as_str() {
        "SELECT" | "WITH" => Ok(()),
        "" => Err("the model returned no query".to_string()),
        other => Err(format!("only SELECT queries are allowed, got {other}")),
    }
}

/// Pipe-separated table, header first.
pub fn format_rows(rows: &QueryRows) -> String {
    let mut out = rows.columns.join(" | ");
    for row in &rows.rows {
        out.push('\n');
        out.push_str(&row.join(" | "));
    }
    out
}
