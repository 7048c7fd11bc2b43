/// Condition evaluator - interprets WHERE text against a single row
///
/// A condition is `<column> <op> <value>`: exactly three words, where a
/// single-quoted literal counts as one word. Anything else is malformed and
/// matches every row.
use crate::types::{Row, Table};

/// Parsed `<column> <op> <value>` triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predicate<'a> {
    pub column: &'a str,
    pub op: &'a str,
    /// Literal with any surrounding single quotes removed
    pub value: &'a str,
}

impl<'a> Predicate<'a> {
    /// `None` if the text is not exactly three words
    pub fn parse(condition: &'a str) -> Option<Self> {
        match split_words(condition).as_slice() {
            [column, op, value] => Some(Self {
                column: *column,
                op: *op,
                value: strip_quotes(*value),
            }),
            _ => None,
        }
    }
}

/// `<column> IN (<statement>)` found in condition text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InSubquery<'a> {
    /// Word right before `IN`; empty if there is none
    pub column: &'a str,
    /// Text between the `(` after `IN` and the last `)`
    pub sql: &'a str,
}

/// Statement verbs that make `IN (...)` a subquery rather than a value list
const STATEMENT_VERBS: &[&str] = &["SELECT", "INSERT", "UPDATE", "DELETE", "CREATE"];

/// Look for the first `IN (` followed by a statement in the condition text.
///
/// Any statement verb counts; a subquery that is not a SELECT matches no rows.
pub fn find_in_subquery(condition: &str) -> Option<InSubquery<'_>> {
    const MARKER: &str = " IN (";

    let mut search_from = 0;
    while let Some(found) = condition[search_from..].find(MARKER) {
        let in_pos = search_from + found;
        let open = in_pos + MARKER.len() - 1;
        let after = &condition[open + 1..];

        let verb = after.split_whitespace().next().unwrap_or_default();
        if STATEMENT_VERBS.contains(&verb) {
            let column = condition[..in_pos].split_whitespace().last().unwrap_or("");
            let close = condition.rfind(')').filter(|&c| c > open).unwrap_or(condition.len());
            return Some(InSubquery {
                column,
                sql: condition[open + 1..close].trim(),
            });
        }
        search_from = open;
    }
    None
}

/// Optional sign followed by at least one digit
pub fn is_integer_literal(value: &str) -> bool {
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn split_words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut rest = text.trim_start();

    while !rest.is_empty() {
        let len = if let Some(quoted) = rest.strip_prefix('\'') {
            quoted.find('\'').map(|end| end + 2).unwrap_or(rest.len())
        } else {
            rest.find(char::is_whitespace).unwrap_or(rest.len())
        };
        words.push(&rest[..len]);
        rest = rest[len..].trim_start();
    }
    words
}

fn strip_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Evaluates condition text using one table's column types
pub struct ConditionEvaluator<'t> {
    table: &'t Table,
}

impl<'t> ConditionEvaluator<'t> {
    pub fn new(table: &'t Table) -> Self {
        Self { table }
    }

    /// Does `row` satisfy `condition`?
    ///
    /// Malformed conditions match. Unknown columns, unparsable integers and
    /// operators the column type does not support do not.
    pub fn matches(&self, row: &Row, condition: &str) -> bool {
        let Some(predicate) = Predicate::parse(condition) else {
            return true;
        };
        self.matches_predicate(row, &predicate)
    }

    pub fn matches_predicate(&self, row: &Row, predicate: &Predicate<'_>) -> bool {
        let Some(index) = self.table.column_index(predicate.column) else {
            return false;
        };
        let Some(cell) = row.get(index) else {
            return false;
        };

        if self.table.columns[index].is_int() {
            compare_int(cell, predicate.op, predicate.value)
        } else {
            compare_text(cell, predicate.op, predicate.value)
        }
    }
}

fn compare_int(cell: &str, op: &str, literal: &str) -> bool {
    let (Ok(r), Ok(v)) = (cell.parse::<i64>(), literal.parse::<i64>()) else {
        return false;
    };
    match op {
        "=" => r == v,
        ">" => r > v,
        "<" => r < v,
        ">=" => r >= v,
        "<=" => r <= v,
        "!=" => r != v,
        _ => false,
    }
}

fn compare_text(cell: &str, op: &str, literal: &str) -> bool {
    match op {
        "=" => cell == literal,
        "!=" => cell != literal,
        ">" => cell > literal,
        "<" => cell < literal,
        _ => false,
    }
}
