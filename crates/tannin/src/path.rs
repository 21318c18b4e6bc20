//! Variable-path resolution.
//!
//! An interpolation body like `user.profile.name.truncate(10,"…")` is parsed
//! into a root variable, a chain of key accessors, and a list of modifier
//! invocations. Splitting is escape-aware throughout: a `.` or `,` inside a
//! double-quoted argument list is literal, a backslash escapes the character
//! after it, and unescaped double quotes toggle string state without being
//! kept.

use serde_json::Value;

/// Reserved root name used when an interpolation has no named root
/// (`{$.upper()}`), for chaining off an anonymous function result.
pub const ANON_ROOT: &str = "__func";

/// One step of a key-access chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal key or index: `profile` in `$user.profile`.
    Key(String),
    /// Indirect key: `$idx` in `$items.$idx` — the key is itself a variable.
    VarKey(String),
}

/// A single modifier invocation with its raw string arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierCall {
    /// Registry name of the modifier.
    pub name: String,
    /// Arguments exactly as written, quotes stripped, escapes resolved.
    pub args: Vec<String>,
}

impl ModifierCall {
    pub(crate) fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        ModifierCall {
            name: name.into(),
            args,
        }
    }
}

/// A parsed variable reference: root, key accessors, then modifiers.
///
/// Key accessors resolve left to right to a concrete value; modifiers apply
/// afterwards, also left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarPath {
    /// Root binding name.
    pub root: String,
    /// Ordered key accessors.
    pub segments: Vec<Segment>,
    /// Ordered modifier invocations.
    pub modifiers: Vec<ModifierCall>,
}

impl VarPath {
    /// Parses an interpolation body (without the leading `$`).
    pub fn parse(body: &str) -> VarPath {
        let pieces = split_path(body);
        let mut iter = pieces.into_iter();

        let root = match iter.next() {
            Some(r) if !r.is_empty() => r,
            _ => ANON_ROOT.to_string(),
        };

        let mut segments = Vec::new();
        let mut modifiers = Vec::new();
        for piece in iter {
            if piece.ends_with(')') {
                // A segment is a modifier invocation iff it ends with `)`.
                let (name, raw_args) = match piece.find('(') {
                    Some(open) => (&piece[..open], &piece[open + 1..piece.len() - 1]),
                    None => (piece.as_str(), ""),
                };
                modifiers.push(ModifierCall::new(name, split_args(raw_args)));
            } else if let Some(name) = piece.strip_prefix('$') {
                segments.push(Segment::VarKey(name.to_string()));
            } else {
                segments.push(Segment::Key(piece));
            }
        }

        VarPath {
            root,
            segments,
            modifiers,
        }
    }

    /// Whether the modifier chain contains an invocation of `name`.
    pub fn has_modifier(&self, name: &str) -> bool {
        self.modifiers.iter().any(|m| m.name == name)
    }

    /// Resolves the key-access chain against a root value.
    ///
    /// `lookup` resolves indirect (`$key`) segments to their binding. Any
    /// missing key or non-indexable intermediate resolves to `Null` — an
    /// undefined variable is silent, never an error.
    pub fn resolve<'a, F>(&self, root: &'a Value, lookup: F) -> Value
    where
        F: Fn(&str) -> Option<&'a Value>,
    {
        let mut current = root.clone();
        for segment in &self.segments {
            let key = match segment {
                Segment::Key(k) => k.clone(),
                Segment::VarKey(name) => match lookup(name) {
                    Some(v) => crate::value::display(v),
                    None => return Value::Null,
                },
            };
            current = index_value(&current, &key);
            if current.is_null() {
                return Value::Null;
            }
        }
        current
    }
}

fn index_value(value: &Value, key: &str) -> Value {
    match value {
        Value::Object(map) => map.get(key).cloned().unwrap_or(Value::Null),
        Value::Array(items) => key
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Splits a path body on `.`, treating dots inside double-quoted argument
/// lists as literal.
fn split_path(body: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut escaped = false;

    for ch in body.chars() {
        if escaped {
            escaped = false;
            current.push(ch);
            continue;
        }
        match ch {
            '\\' => {
                escaped = true;
                current.push(ch);
            }
            '"' => {
                in_string = !in_string;
                current.push(ch);
            }
            '.' if !in_string => {
                pieces.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    pieces.push(current);
    pieces
}

/// Splits a modifier argument list on unescaped commas outside strings.
///
/// Double quotes delimit string arguments and are stripped; `\"` keeps a
/// literal quote, `\\` a literal backslash. Whitespace outside strings is
/// dropped so `truncate(10, "a, b")` parses as `["10", "a, b"]`.
pub(crate) fn split_args(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut escaped = false;

    for ch in raw.chars() {
        if escaped {
            escaped = false;
            current.push(ch);
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => in_string = !in_string,
            ',' if !in_string => args.push(std::mem::take(&mut current)),
            c if c.is_whitespace() && !in_string => {}
            c => current.push(c),
        }
    }
    args.push(current);
    args
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_root_only() {
        let p = VarPath::parse("name");
        assert_eq!(p.root, "name");
        assert!(p.segments.is_empty());
        assert!(p.modifiers.is_empty());
    }

    #[test]
    fn test_keys_then_modifiers() {
        let p = VarPath::parse("user.profile.name.truncate(10,\"...\")");
        assert_eq!(p.root, "user");
        assert_eq!(
            p.segments,
            vec![
                Segment::Key("profile".into()),
                Segment::Key("name".into())
            ]
        );
        assert_eq!(
            p.modifiers,
            vec![ModifierCall::new("truncate", vec!["10".into(), "...".into()])]
        );
    }

    #[test]
    fn test_dot_inside_quoted_args_is_literal() {
        let p = VarPath::parse("price.numberFormat(2).replace(\".\",\",\")");
        assert_eq!(p.root, "price");
        assert_eq!(p.modifiers.len(), 2);
        assert_eq!(p.modifiers[1].args, vec![".".to_string(), ",".to_string()]);
    }

    #[test]
    fn test_indirect_key() {
        let p = VarPath::parse("items.$idx.name");
        assert_eq!(
            p.segments,
            vec![
                Segment::VarKey("idx".into()),
                Segment::Key("name".into())
            ]
        );
    }

    #[test]
    fn test_empty_root_defaults_to_anonymous() {
        let p = VarPath::parse(".upper()");
        assert_eq!(p.root, ANON_ROOT);
        assert_eq!(p.modifiers.len(), 1);
    }

    #[test]
    fn test_escaped_quote_in_args() {
        let p = VarPath::parse("v.replace(\"a\\\"b\",\"c\")");
        assert_eq!(p.modifiers[0].args, vec!["a\"b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_comma_inside_string_not_a_split() {
        assert_eq!(split_args("\"a,b\",c"), vec!["a,b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_no_args() {
        assert_eq!(split_args(""), Vec::<String>::new());
        assert_eq!(split_args("  "), Vec::<String>::new());
    }

    #[test]
    fn test_resolve_nested() {
        let root = json!({"profile": {"name": "Ada"}});
        let p = VarPath::parse("user.profile.name");
        let got = p.resolve(&root, |_| None);
        assert_eq!(got, json!("Ada"));
    }

    #[test]
    fn test_resolve_array_index() {
        let root = json!([10, 20, 30]);
        let p = VarPath::parse("xs.1");
        assert_eq!(p.resolve(&root, |_| None), json!(20));
    }

    #[test]
    fn test_resolve_missing_is_null() {
        let root = json!({"a": 1});
        let p = VarPath::parse("x.b.c");
        assert_eq!(p.resolve(&root, |_| None), Value::Null);
    }

    #[test]
    fn test_resolve_indirect_key() {
        let root = json!({"one": "first"});
        let bindings = json!({"which": "one"});
        let p = VarPath::parse("map.$which");
        let got = p.resolve(&root, |name| bindings.get(name));
        assert_eq!(got, json!("first"));
    }
}
