//! Prompt construction for SQL generation and repair.

use crate::intent::Intent;
use crate::schema::DatabaseSchema;
use crate::sql::NO_QUERY_MARKER;

/// System prompt: rules, the schema, and intent-specific hints.
pub fn system_prompt(schema: &DatabaseSchema, intent: Intent) -> String {
    let mut out = String::new();
    out.push_str("You write SQLite queries for a retail analytics database.\n\n");

    out.push_str("## Rules\n\n");
    out.push_str("- Use only SELECT (or WITH ... SELECT). Never modify data.\n");
    out.push_str("- Return exactly one statement in a ```sql fenced block and nothing else.\n");
    out.push_str("- Dates are stored as 'YYYY-MM-DD HH:MM:SS' text. If grouping by day, use DATE(Date) AS Date.\n");
    out.push_str("- Relative periods are measured from the latest Date in the data, e.g. DATE((SELECT MAX(Date) FROM sales_data), '-30 days').\n");
    out.push_str("- Give every computed column a short alias.\n");
    out.push_str("- Put the label column (date, name, store) first and the measure second.\n");
    out.push_str(&format!(
        "- If the schema cannot answer the question, reply with {} followed by a one-line reason.\n\n",
        NO_QUERY_MARKER
    ));

    let hints = intent.hints();
    if !hints.is_empty() {
        out.push_str("## Hints\n\n");
        for hint in hints {
            out.push_str(&format!("- {}\n", hint));
        }
        out.push('\n');
    }

    out.push_str("## Schema\n\n");
    out.push_str(&schema.to_prompt());
    out
}

pub fn user_prompt(question: &str) -> String {
    format!("Question: {}", question.trim())
}

/// Follow-up sent after a query failed, asking for a corrected statement.
pub fn repair_prompt(sql: &str, error: &str) -> String {
    format!(
        "The query\n```sql\n{}\n```\nfailed with: {}\n\nReturn a corrected query in a ```sql fenced block.",
        sql, error
    )
}
