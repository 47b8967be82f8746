//! SQL extraction and read-only validation.
//!
//! Model output is free text. The query is taken from a fenced block when
//! present, otherwise from the first `SELECT` keyword or `WITH name AS (`
//! clause up to a blank line or the end of the statement. The result is
//! then reduced to exactly one read-only statement.

use storefront_error::{Error, Result};

/// Reply the model is told to give when the schema cannot answer the question
pub const NO_QUERY_MARKER: &str = "NO_QUERY";

/// Pull a single SQL statement out of a model reply.
pub fn extract_sql(content: &str) -> Result<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(Error::no_query_produced("model returned an empty reply").with_operation("sql::extract"));
    }
    if trimmed.starts_with(NO_QUERY_MARKER) {
        return Err(Error::no_query_produced(format!(
            "model could not answer from the schema: {}",
            trimmed.trim_start_matches(NO_QUERY_MARKER).trim_start_matches([':', ' '])
        ))
        .with_operation("sql::extract"));
    }

    let fenced = fenced_block(trimmed);
    let candidate = fenced.unwrap_or(trimmed);
    let start = find_keyword_start(candidate).ok_or_else(|| {
        Error::no_query_produced("no SELECT or WITH statement in model reply")
            .with_operation("sql::extract")
            .with_context("reply", truncate(trimmed, 200))
    })?;

    let query = &candidate[start..];
    match fenced {
        Some(_) => sanitize(query),
        None => sanitize(statement_span(query)),
    }
}

/// Strip comments and a trailing semicolon; reject anything but one SELECT/WITH.
pub fn sanitize(sql: &str) -> Result<String> {
    let stripped = strip_comments(sql);
    let mut cleaned = stripped.trim();
    while let Some(rest) = cleaned.strip_suffix(';') {
        cleaned = rest.trim_end();
    }
    if cleaned.is_empty() {
        return Err(Error::no_query_produced("query is empty after removing comments").with_operation("sql::sanitize"));
    }

    if separator_index(cleaned).is_some() {
        return Err(Error::query_rejected("only a single statement is allowed", cleaned).with_operation("sql::sanitize"));
    }

    let first = cleaned
        .split(|c: char| !c.is_ascii_alphabetic())
        .find(|w| !w.is_empty())
        .unwrap_or_default()
        .to_ascii_uppercase();
    if first != "SELECT" && first != "WITH" {
        return Err(Error::query_rejected(
            format!("only SELECT or WITH queries are allowed, got {}", first),
            cleaned,
        )
        .with_operation("sql::sanitize"));
    }

    Ok(cleaned.to_string())
}

/// Body of the first fenced code block, without its language tag.
fn fenced_block(content: &str) -> Option<&str> {
    let open = content.find("```")?;
    let after = &content[open + 3..];
    let body_start = match after.find('\n') {
        Some(nl) if after[..nl].trim().chars().all(|c| c.is_ascii_alphanumeric()) => nl + 1,
        _ => 0,
    };
    let body = &after[body_start..];
    let end = body.find("```").unwrap_or(body.len());
    Some(body[..end].trim())
}

/// Byte offset of the first standalone SELECT, or of a WITH that opens a CTE.
fn find_keyword_start(text: &str) -> Option<usize> {
    let upper = text.to_ascii_uppercase();
    let bytes = upper.as_bytes();
    ["SELECT", "WITH"]
        .iter()
        .filter_map(|kw| {
            upper.match_indices(kw).map(|(i, _)| i).find(|&i| {
                let end = i + kw.len();
                let standalone = (i == 0 || !is_word_byte(bytes[i - 1])) && !starts_word(bytes, end);
                standalone && (*kw != "WITH" || opens_cte(bytes, end))
            })
        })
        .min()
}

/// `[RECURSIVE] name [(cols)] AS (` starting at `i`, on upper-cased bytes.
fn opens_cte(b: &[u8], i: usize) -> bool {
    let mut i = skip_ws(b, i);
    if b[i..].starts_with(b"RECURSIVE") && !starts_word(b, i + 9) {
        i = skip_ws(b, i + 9);
    }

    let name_end = if b.get(i) == Some(&b'"') {
        match b[i + 1..].iter().position(|&c| c == b'"') {
            Some(p) => i + p + 2,
            None => return false,
        }
    } else {
        i + b[i..].iter().take_while(|&&c| is_word_byte(c)).count()
    };
    if name_end == i {
        return false;
    }

    i = skip_ws(b, name_end);
    if b.get(i) == Some(&b'(') {
        match b[i..].iter().position(|&c| c == b')') {
            Some(p) => i = skip_ws(b, i + p + 1),
            None => return false,
        }
    }
    if !b[i..].starts_with(b"AS") || starts_word(b, i + 2) {
        return false;
    }
    b.get(skip_ws(b, i + 2)) == Some(&b'(')
}

fn skip_ws(b: &[u8], i: usize) -> usize {
    i + b[i..].iter().take_while(|c| c.is_ascii_whitespace()).count()
}

fn starts_word(b: &[u8], i: usize) -> bool {
    b.get(i).is_some_and(|&c| is_word_byte(c))
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Unfenced query text up to the first blank line or top-level `;`.
fn statement_span(text: &str) -> &str {
    let mut end = text.len();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if offset > 0 && line.trim().is_empty() {
            end = offset;
            break;
        }
        offset += line.len();
    }
    let text = &text[..end];
    match separator_index(text) {
        Some(i) => &text[..i],
        None => text,
    }
}

/// Remove `--` and `/* */` comments, leaving quoted text intact.
fn strip_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            '-' if chars.peek() == Some(&'-') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Byte offset of the first `;` outside quoted text.
fn separator_index(sql: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in sql.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if matches!(c, '\'' | '"' | '`') => quote = Some(c),
            None if c == ';' => return Some(i),
            None => {}
        }
    }
    None
}

pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_error::ErrorKind;

    #[test]
    fn test_extract_from_sql_fence() {
        let reply = "Here you go:\n```sql\nSELECT DATE(Date) AS Date, SUM(TotalRevenue) FROM sales_data GROUP BY 1;\n```\nDone.";
        assert_eq!(
            extract_sql(reply).unwrap(),
            "SELECT DATE(Date) AS Date, SUM(TotalRevenue) FROM sales_data GROUP BY 1"
        );
    }

    #[test]
    fn test_extract_from_bare_fence_and_prose() {
        assert_eq!(extract_sql("```\nselect 1\n```").unwrap(), "select 1");
        assert_eq!(
            extract_sql("The query is: WITH t AS (SELECT 1 AS x) SELECT x FROM t").unwrap(),
            "WITH t AS (SELECT 1 AS x) SELECT x FROM t"
        );
    }

    #[test]
    fn test_keyword_must_stand_alone() {
        // "selection" must not be mistaken for SELECT
        let sql = extract_sql("My selection: SELECT StoreID FROM stores").unwrap();
        assert_eq!(sql, "SELECT StoreID FROM stores");
    }

    #[test]
    fn test_prose_with_is_not_a_cte() {
        let sql = extract_sql("Starting with the sales table, the query is: SELECT 1 AS n").unwrap();
        assert_eq!(sql, "SELECT 1 AS n");

        let sql = extract_sql("Use this:\nWITH RECURSIVE days(d) AS (SELECT 1) SELECT d FROM days").unwrap();
        assert!(sql.starts_with("WITH RECURSIVE days(d) AS"));
    }

    #[test]
    fn test_trailing_prose_is_dropped() {
        assert_eq!(extract_sql("SELECT 1 AS n\n\nThis returns one row.").unwrap(), "SELECT 1 AS n");
        assert_eq!(
            extract_sql("SELECT StoreID\nFROM stores; this lists every store").unwrap(),
            "SELECT StoreID\nFROM stores"
        );
        // Inside a fence the whole block is the query
        let err = extract_sql("```sql\nSELECT 1; DROP TABLE stores\n```").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QueryRejected);
    }

    #[test]
    fn test_no_query_marker() {
        let err = extract_sql("NO_QUERY: the database has no weather data").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoQueryProduced);
        assert!(err.message().contains("weather"));

        let err = extract_sql("I am not sure.").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoQueryProduced);
    }

    #[test]
    fn test_comments_and_semicolons_stripped() {
        let sql = sanitize("-- top products\nSELECT ProductName /* name */ FROM products ;;").unwrap();
        assert_eq!(sql, "SELECT ProductName   FROM products");
    }

    #[test]
    fn test_quoted_text_is_preserved() {
        let sql = sanitize("SELECT * FROM customer_feedback WHERE Comment LIKE '%--;%'").unwrap();
        assert!(sql.ends_with("'%--;%'"));
    }

    #[test]
    fn test_writes_and_multiple_statements_rejected() {
        let err = sanitize("DELETE FROM sales_data").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QueryRejected);
        assert_eq!(err.context_value("sql"), Some("DELETE FROM sales_data"));

        let err = sanitize("SELECT 1; DROP TABLE stores").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QueryRejected);

        let err = extract_sql("```sql\nUPDATE products SET Price = 0\n```").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoQueryProduced);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
    }
}
