//! Parser for the call-shaped expressions carried in `CheckRule::api_call`.
//!
//! Only a restricted form is accepted: a dotted function name, optionally
//! followed by a parenthesised list of literal arguments, e.g.
//! `cmds.ls(type='mesh', long=True)`. Nothing is executed here; the parsed
//! call is dispatched to a function registered in a
//! [`QueryRegistry`](super::scene::QueryRegistry).

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::rules::SceneValue;
use super::scene::SceneQueryError;

/// Dotted name with an optional argument list spanning the rest of the input.
static CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*([A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*)\s*(?:\((.*)\))?\s*$")
        .expect("valid regex")
});

static KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*([A-Za-z_]\w*)\s*=(.*)$").expect("valid regex"));

/// A parsed scene query call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryCall {
    /// Fully qualified function name, e.g. `cmds.getAttr`.
    pub name: String,
    pub args: Vec<SceneValue>,
    pub kwargs: BTreeMap<String, SceneValue>,
}

impl QueryCall {
    /// Positional argument `index` as a string, if present and a string.
    pub fn str_arg(&self, index: usize) -> Option<&str> {
        match self.args.get(index) {
            Some(SceneValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn kwarg(&self, key: &str) -> Option<&SceneValue> {
        self.kwargs.get(key)
    }
}

/// Parse `expression` into a [`QueryCall`].
pub fn parse_call(expression: &str) -> Result<QueryCall, SceneQueryError> {
    let invalid = |reason: &str| SceneQueryError::InvalidExpression {
        expression: expression.to_string(),
        reason: reason.to_string(),
    };

    let caps = CALL_RE
        .captures(expression)
        .ok_or_else(|| invalid("expected a function name with optional arguments"))?;

    let mut call = QueryCall {
        name: caps[1].to_string(),
        ..QueryCall::default()
    };

    let Some(arg_list) = caps.get(2) else {
        return Ok(call);
    };

    for raw in split_arguments(arg_list.as_str()).map_err(|r| invalid(&r))? {
        if let Some(kw) = KEYWORD_RE.captures(&raw) {
            let value = parse_literal(&kw[2]).map_err(|r| invalid(&r))?;
            call.kwargs.insert(kw[1].to_string(), value);
        } else {
            if !call.kwargs.is_empty() {
                return Err(invalid("positional argument follows keyword argument"));
            }
            call.args.push(parse_literal(&raw).map_err(|r| invalid(&r))?);
        }
    }

    Ok(call)
}

/// Split an argument list on top-level commas, honouring quoted strings.
fn split_arguments(input: &str) -> Result<Vec<String>, String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in input.chars() {
        match quote {
            Some(q) => {
                current.push(ch);
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                ',' => parts.push(std::mem::take(&mut current)),
                _ => current.push(ch),
            },
        }
    }

    if quote.is_some() {
        return Err("unterminated string literal".to_string());
    }
    parts.push(current);

    // `f()` yields one empty part; a trailing comma yields a final empty one.
    if parts.len() == 1 && parts[0].trim().is_empty() {
        return Ok(Vec::new());
    }
    if parts.last().is_some_and(|p| p.trim().is_empty()) {
        parts.pop();
    }
    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err("empty argument".to_string());
    }
    Ok(parts)
}

fn parse_literal(raw: &str) -> Result<SceneValue, String> {
    let token = raw.trim();
    match token {
        "True" | "true" => return Ok(SceneValue::Bool(true)),
        "False" | "false" => return Ok(SceneValue::Bool(false)),
        "None" | "null" => return Ok(SceneValue::Null),
        _ => {}
    }

    if let Some(parsed) = parse_string(token) {
        return parsed.map(SceneValue::Str);
    }
    if let Ok(i) = token.parse::<i64>() {
        return Ok(SceneValue::Int(i));
    }
    if let Ok(x) = token.parse::<f64>() {
        return Ok(SceneValue::Float(x));
    }
    Err(format!("unsupported argument `{token}`"))
}

/// Parse a quoted string literal. Returns `None` when `token` does not
/// start with a quote.
fn parse_string(token: &str) -> Option<Result<String, String>> {
    let quote = token.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let mut out = String::new();
    let mut chars = token[1..].chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => break,
            }
        } else if ch == quote {
            return Some(if chars.as_str().is_empty() {
                Ok(out)
            } else {
                Err(format!("unexpected input after string literal in `{token}`"))
            });
        } else {
            out.push(ch);
        }
    }
    Some(Err("unterminated string literal".to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
