//! Safe navigation over the compact provider tree.
//!
//! Yahoo payloads are deep and their shape drifts between endpoints and
//! seasons. Every lookup goes through here so that a missing node is a normal,
//! reportable outcome instead of a panic somewhere in the ranking code.
use log::warn;
use serde_json::Value;
use thiserror::Error;

/// Leaf key holding an element's text content.
pub const TEXT: &str = "_text";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to locate {path} in {object}")]
pub struct MissingField {
    pub object: String,
    pub path: String,
}

impl MissingField {
    fn new(object: &str, path: &[&str]) -> Self {
        Self { object: object.to_owned(), path: path.join(".") }
    }
}

/// Walk `path` from `root` without logging. Numeric segments index arrays.
/// Absent keys and JSON null are both missing; `""`, `false` and `0` are not.
pub fn try_resolve<'a>(
    object: &str,
    root: &'a Value,
    path: &[&str],
) -> Result<&'a Value, MissingField> {
    let mut node = root;
    for field in path {
        let next = match node {
            Value::Object(map) => map.get(*field),
            Value::Array(items) => field.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        node = match next {
            Some(Value::Null) | None => return Err(MissingField::new(object, path)),
            Some(value) => value,
        };
    }
    if node.is_null() {
        return Err(MissingField::new(object, path));
    }
    Ok(node)
}

/// Like [`try_resolve`], but a miss is logged and collapses to `None`.
pub fn resolve<'a>(object: &str, root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    match try_resolve(object, root, path) {
        Ok(value) => Some(value),
        Err(missing) => {
            warn!("{missing}");
            None
        }
    }
}

/// Resolve a node that may hold one child (object) or many (array).
pub fn resolve_list<'a>(object: &str, root: &'a Value, path: &[&str]) -> Vec<&'a Value> {
    match resolve(object, root, path) {
        Some(value) => one_or_many(value),
        None => Vec::new(),
    }
}

pub fn one_or_many(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().filter(|v| !v.is_null()).collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Resolve `path` then read the `_text` leaf below it.
pub fn resolve_text(object: &str, root: &Value, path: &[&str]) -> Option<String> {
    let with_text: Vec<&str> = path.iter().copied().chain([TEXT]).collect();
    resolve(object, root, &with_text).and_then(leaf_string)
}

/// Quiet variant of [`resolve_text`] for leaves that are legitimately absent.
pub fn optional_text(root: &Value, path: &[&str]) -> Option<String> {
    let with_text: Vec<&str> = path.iter().copied().chain([TEXT]).collect();
    try_resolve("", root, &with_text).ok().and_then(leaf_string)
}

pub fn resolve_number(object: &str, root: &Value, path: &[&str]) -> Option<f64> {
    let with_text: Vec<&str> = path.iter().copied().chain([TEXT]).collect();
    resolve(object, root, &with_text).and_then(leaf_number)
}

pub fn leaf_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn leaf_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn league() -> Value {
        json!({
            "fantasy_content": {
                "league": {
                    "current_week": { "_text": "7" },
                    "name": { "_text": "" },
                    "is_finished": false,
                    "num_teams": 0,
                    "renew": null,
                    "teams": { "team": [ { "_text": "a" }, { "_text": "b" } ] }
                }
            }
        })
    }

    #[test]
    fn resolves_nested_text() {
        let tree = league();
        let week = resolve_text("league", &tree, &["fantasy_content", "league", "current_week"]);
        assert_eq!(week.as_deref(), Some("7"));
        assert_eq!(
            resolve_number("league", &tree, &["fantasy_content", "league", "current_week"]),
            Some(7.0)
        );
    }

    #[test]
    fn missing_intermediate_key_is_missing_not_a_panic() {
        let tree = league();
        let path = ["fantasy_content", "scoreboard", "matchups", "matchup"];
        let err = try_resolve("league", &tree, &path).unwrap_err();
        assert_eq!(err.object, "league");
        assert_eq!(err.path, "fantasy_content.scoreboard.matchups.matchup");
        assert!(resolve("league", &tree, &["fantasy_content", "scoreboard", "week"]).is_none());
    }

    #[test]
    fn null_counts_as_missing() {
        let tree = league();
        assert!(resolve("league", &tree, &["fantasy_content", "league", "renew"]).is_none());
        assert!(resolve("league", &tree, &["fantasy_content", "league", "renew", "x"]).is_none());
    }

    #[test]
    fn falsy_values_are_present() {
        let tree = league();
        let name = resolve_text("league", &tree, &["fantasy_content", "league", "name"]);
        assert_eq!(name.as_deref(), Some(""));
        assert_eq!(
            resolve("league", &tree, &["fantasy_content", "league", "is_finished"]),
            Some(&Value::Bool(false))
        );
        assert_eq!(
            resolve("league", &tree, &["fantasy_content", "league", "num_teams"]),
            Some(&json!(0))
        );
    }

    #[test]
    fn numeric_segments_index_arrays() {
        let tree = league();
        let team = |i| ["fantasy_content", "league", "teams", "team", i];
        let second = resolve_text("league", &tree, &team("1"));
        assert_eq!(second.as_deref(), Some("b"));
        assert!(resolve("league", &tree, &team("9")).is_none());
        assert!(resolve("league", &tree, &team("x")).is_none());
    }

    #[test]
    fn lists_accept_one_or_many() {
        let single = json!({ "teams": { "team": { "_text": "only" } } });
        let many = league();
        assert_eq!(resolve_list("single", &single, &["teams", "team"]).len(), 1);
        let teams = ["fantasy_content", "league", "teams", "team"];
        assert_eq!(resolve_list("many", &many, &teams).len(), 2);
        assert!(resolve_list("single", &single, &["nope"]).is_empty());
    }

    #[test]
    fn leaf_number_rejects_placeholders() {
        assert_eq!(leaf_number(&json!("-")), None);
        assert_eq!(leaf_number(&json!(" 12 ")), Some(12.0));
        assert_eq!(leaf_number(&json!(".471")), Some(0.471));
        assert_eq!(leaf_number(&json!({ "a": 1 })), None);
    }
}
