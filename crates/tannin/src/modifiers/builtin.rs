//! The built-in modifier catalog.
//!
//! Behavior notes that apply across the catalog:
//!
//! - Case transforms pass non-string values through unchanged; hashing and
//!   collection modifiers fail on the wrong input type instead. Failures
//!   surface as inline diagnostics, never as render aborts.
//! - Date modifiers work on RFC 3339 strings, `YYYY-MM-DD[ HH:MM:SS]`
//!   strings, or Unix-timestamp numbers. Timezone arguments are fixed
//!   offsets (`+02:00`, `-0500`) or `GMT`/`UTC`; `date` takes a chrono
//!   `%`-style format string.
//! - The three `context*` modifiers are normally appended automatically by
//!   the context tracker, with an in-string flag of `"1"` or `""`, but they
//!   can also be invoked explicitly.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use sha1::{Digest, Sha1};

use crate::value::{as_f64, display, is_empty, loose_cmp, loose_eq};

use super::{ModifierError, ModifierRegistry};

type ModResult = Result<Value, ModifierError>;

pub(super) fn register_builtins(registry: &mut ModifierRegistry, local_tz: &str) {
    // Case transforms.
    registry.register("upper", |v, _| {
        Ok(match v.as_str() {
            Some(s) => Value::String(s.to_uppercase()),
            None => v.clone(),
        })
    });
    registry.register("lower", |v, _| {
        Ok(match v.as_str() {
            Some(s) => Value::String(s.to_lowercase()),
            None => v.clone(),
        })
    });
    registry.register("capitalize", |v, _| {
        Ok(match v.as_str() {
            Some(s) => Value::String(ucwords(s)),
            None => v.clone(),
        })
    });

    // Numeric.
    registry.register("abs", |v, _| {
        Ok(match as_f64(v) {
            Some(n) => num(n.abs()),
            None => v.clone(),
        })
    });
    registry.register("sum", |v, args| arithmetic(v, args, |a, b| Ok(a + b)));
    registry.register("subtract", |v, args| arithmetic(v, args, |a, b| Ok(a - b)));
    registry.register("multiply", |v, args| arithmetic(v, args, |a, b| Ok(a * b)));
    registry.register("divide", |v, args| {
        arithmetic(v, args, |a, b| {
            if b == 0.0 {
                Err(ModifierError::new("division by zero"))
            } else {
                Ok(a / b)
            }
        })
    });
    registry.register("mod", |v, args| {
        arithmetic(v, args, |a, b| {
            let (a, b) = (a.trunc() as i64, b.trunc() as i64);
            if b == 0 {
                Err(ModifierError::new("division by zero"))
            } else {
                Ok((a % b) as f64)
            }
        })
    });
    registry.register("numberFormat", |v, args| {
        let n = as_f64(v).ok_or_else(|| ModifierError::new("input must be numeric"))?;
        let decimals = args
            .first()
            .and_then(|a| a.parse::<usize>().ok())
            .unwrap_or(2);
        Ok(Value::String(number_format(n, decimals)))
    });

    // Strings.
    registry.register("truncate", |v, args| {
        let len = args.first().and_then(|a| a.parse::<usize>().ok()).unwrap_or(0);
        if len == 0 {
            return Err(ModifierError::new("length parameter is required"));
        }
        let s = display(v);
        let truncated: String = s.chars().take(len).collect();
        Ok(Value::String(if s.chars().count() > len {
            truncated + "..."
        } else {
            truncated
        }))
    });
    registry.register("trim", |v, _| {
        Ok(match v.as_str() {
            Some(s) => Value::String(s.trim().to_string()),
            None => v.clone(),
        })
    });
    registry.register("stripSlashes", |v, _| {
        Ok(match v.as_str() {
            Some(s) => Value::String(strip_slashes(s)),
            None => v.clone(),
        })
    });
    registry.register("addSlashes", |v, _| Ok(Value::String(add_slashes(&display(v)))));
    registry.register("nl2br", |v, _| Ok(Value::String(nl2br(&display(v)))));
    registry.register("stripTags", |v, _| {
        Ok(match v.as_str() {
            Some(s) => Value::String(strip_tags(s)),
            None => v.clone(),
        })
    });
    registry.register("encodeTags", |v, _| {
        Ok(match v.as_str() {
            Some(s) => Value::String(html_escape::encode_text(s).into_owned()),
            None => v.clone(),
        })
    });
    registry.register("decodeTags", |v, _| {
        Ok(match v.as_str() {
            Some(s) => Value::String(html_escape::decode_html_entities(s).into_owned()),
            None => v.clone(),
        })
    });
    registry.register("safe", |v, _| {
        Ok(Value::String(
            html_escape::encode_quoted_attribute(&display(v)).into_owned(),
        ))
    });
    registry.register("urlDecode", |v, _| {
        Ok(match v.as_str() {
            Some(s) => Value::String(url_decode(s)),
            None => v.clone(),
        })
    });
    registry.register("urlFriendly", |v, _| {
        Ok(match v.as_str() {
            Some(s) => Value::String(url_friendly(s)),
            None => v.clone(),
        })
    });
    registry.register("sha1", |v, _| {
        let s = v
            .as_str()
            .ok_or_else(|| ModifierError::new("input must be string"))?;
        let digest = Sha1::digest(s.as_bytes());
        Ok(Value::String(to_hex(&digest)))
    });
    registry.register("substr", |v, args| {
        let s = display(v);
        let start = args.first().and_then(|a| a.parse::<i64>().ok()).unwrap_or(0);
        let len = match args.get(1) {
            Some(a) => Some(a.parse::<i64>().map_err(|_| {
                ModifierError::new("length must be numeric")
            })?),
            None => None,
        };
        Ok(Value::String(substr(&s, start, len)))
    });
    registry.register("join", |v, args| {
        let items = v
            .as_array()
            .ok_or_else(|| ModifierError::new("input must be an array"))?;
        let glue = args
            .first()
            .filter(|g| !g.is_empty())
            .ok_or_else(|| ModifierError::new("string glue is required"))?;
        let joined = items.iter().map(display).collect::<Vec<_>>().join(glue);
        Ok(Value::String(joined))
    });
    registry.register("explode", explode);
    registry.register("split", explode);
    registry.register("replace", |v, args| {
        let s = v
            .as_str()
            .ok_or_else(|| ModifierError::new("input must be a string"))?;
        let search = args
            .first()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ModifierError::new("search is required"))?;
        let replace = args
            .get(1)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ModifierError::new("replace is required"))?;
        Ok(Value::String(s.replace(search.as_str(), replace)))
    });

    // Collections.
    registry.register("count", count);
    registry.register("length", count);
    registry.register("lastIndex", |v, _| match v {
        Value::Array(items) => Ok(if items.is_empty() {
            Value::Null
        } else {
            Value::from(items.len() - 1)
        }),
        Value::Object(map) => Ok(map
            .keys()
            .next_back()
            .map(|k| Value::String(k.clone()))
            .unwrap_or(Value::Null)),
        _ => Err(ModifierError::new("input must be an array")),
    });
    registry.register("lastValue", |v, _| match v {
        Value::Array(items) => Ok(items.last().cloned().unwrap_or(Value::Null)),
        Value::Object(map) => Ok(map.values().next_back().cloned().unwrap_or(Value::Null)),
        _ => Err(ModifierError::new("input must be an array")),
    });

    // Dates.
    let local: FixedOffset = parse_tz(local_tz).unwrap_or_else(|_| gmt());
    registry.register("toLocal", move |v, _| {
        let dt = parse_date(v)?;
        Ok(Value::String(dt.with_timezone(&local).to_rfc3339()))
    });
    registry.register("toTz", |v, args| {
        let dt = parse_date(v)?;
        let tz = args
            .first()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ModifierError::new("timezone is required"))?;
        let offset = parse_tz(tz)?;
        Ok(Value::String(dt.with_timezone(&offset).to_rfc3339()))
    });
    registry.register("toGMT", |v, args| {
        let dt = parse_date(v)?;
        if args.first().map(String::as_str).unwrap_or("").is_empty() {
            return Err(ModifierError::new("timezone is required"));
        }
        Ok(Value::String(dt.with_timezone(&gmt()).to_rfc3339()))
    });
    registry.register("date", |v, args| {
        let dt = parse_date(v)?;
        let format = args
            .first()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ModifierError::new("date format is required"))?;
        let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
        if items.iter().any(|i| matches!(i, Item::Error)) {
            return Err(ModifierError::new("invalid date format"));
        }
        Ok(Value::String(dt.format_with_items(items.iter()).to_string()))
    });

    // JSON.
    registry.register("jsonEncode", |v, _| {
        serde_json::to_string(v)
            .map(Value::String)
            .map_err(|e| ModifierError::new(e.to_string()))
    });

    // Conditionals.
    registry.register("default", |v, args| {
        let fallback = args.first().cloned().unwrap_or_default();
        Ok(if is_empty(v) {
            Value::String(fallback)
        } else {
            v.clone()
        })
    });
    registry.register("isEmpty", |v, _| Ok(Value::Bool(is_empty(v))));
    registry.register("ifEmpty", |v, args| {
        let true_val = args
            .first()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ModifierError::new("true value is required"))?;
        if is_empty(v) {
            return Ok(Value::String(true_val.clone()));
        }
        match args.get(1).filter(|a| !a.is_empty()) {
            Some(false_val) => Ok(Value::String(false_val.clone())),
            None => Ok(v.clone()),
        }
    });
    registry.register("if", |v, args| {
        let condition = args
            .first()
            .ok_or_else(|| ModifierError::new("comparison value is required"))?;
        let true_val = args
            .get(1)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ModifierError::new("true value is required"))?;
        let false_val = args.get(2).filter(|a| !a.is_empty());
        let operator = args.get(3).map(String::as_str).unwrap_or("eq");

        let operand = Value::String(condition.clone());
        let holds = compare(&operand, v, operator);
        if holds {
            Ok(Value::String(true_val.clone()))
        } else {
            match false_val {
                Some(f) => Ok(Value::String(f.clone())),
                None => Ok(v.clone()),
            }
        }
    });

    // Context dispatch. Appended automatically by the context tracker; the
    // flag argument says whether the interpolation sits inside a quoted
    // string at that position.
    registry.register("contextJs", |v, args| Ok(context_js(v, arg_flag(args))));
    registry.register("contextTag", |v, args| Ok(context_tag(v, arg_flag(args))));
    registry.register("contextOutTag", |v, _| Ok(context_out_tag(v)));
    registry.register("addDoubleQuotes", |v, _| {
        Ok(Value::String(format!("\"{}\"", display(v))))
    });
    // Escape hatches: identity values whose presence in a chain tells the
    // context tracker to leave the interpolation alone.
    registry.register("preventTagEncode", |v, _| Ok(v.clone()));
    registry.register("ignoreContext", |v, _| Ok(v.clone()));
}

// ---------------------------------------------------------------------------
// Shared helpers

fn arithmetic(
    v: &Value,
    args: &[String],
    op: impl Fn(f64, f64) -> Result<f64, ModifierError>,
) -> ModResult {
    let a = as_f64(v).ok_or_else(|| ModifierError::new("input and value must be numeric"))?;
    let b = args
        .first()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .ok_or_else(|| ModifierError::new("input and value must be numeric"))?;
    Ok(num(op(a, b)?))
}

fn explode(v: &Value, args: &[String]) -> ModResult {
    let s = v
        .as_str()
        .ok_or_else(|| ModifierError::new("input must be a string"))?;
    let delimiter = args
        .first()
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ModifierError::new("delimiter is required"))?;
    Ok(Value::Array(
        s.split(delimiter.as_str())
            .map(|part| Value::String(part.to_string()))
            .collect(),
    ))
}

fn count(v: &Value, _args: &[String]) -> ModResult {
    match v {
        Value::Array(items) => Ok(Value::from(items.len())),
        Value::Object(map) => Ok(Value::from(map.len())),
        _ => Err(ModifierError::new("input must be an array")),
    }
}

/// Emits a whole number as an integer, anything else as a float.
fn num(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn arg_flag(args: &[String]) -> bool {
    args.first().map(|a| !a.is_empty() && a != "0").unwrap_or(false)
}

fn ucwords(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut cap_next = true;
    for ch in s.chars() {
        if ch.is_whitespace() {
            cap_next = true;
            out.push(ch);
        } else if cap_next {
            out.extend(ch.to_uppercase());
            cap_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn strip_slashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn add_slashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '\'' | '"' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn nl2br(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                out.push_str("<br />");
                out.push('\r');
                if chars.peek() == Some(&'\n') {
                    out.push('\n');
                    chars.next();
                }
            }
            '\n' => {
                out.push_str("<br />");
                out.push('\n');
            }
            c => out.push(c),
        }
    }
    out
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn url_decode(s: &str) -> String {
    let plus_decoded = s.replace('+', " ");
    percent_encoding::percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Form-style URL encoding: space becomes `+`, everything unsafe becomes
/// `%XX`.
pub(crate) fn url_encode(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

fn url_friendly(s: &str) -> String {
    url_encode(&crate::util::remove_special_chars(&s.to_lowercase()))
}

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

fn substr(s: &str, start: i64, len: Option<i64>) -> String {
    let chars: Vec<char> = s.chars().collect();
    let n = chars.len() as i64;
    let from = if start < 0 { (n + start).max(0) } else { start.min(n) };
    let to = match len {
        None => n,
        Some(l) if l < 0 => (n + l).max(from),
        Some(l) => (from + l).min(n),
    };
    chars[from as usize..to.max(from) as usize].iter().collect()
}

fn number_format(n: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, n.abs());
    let (int_part, dec_part) = match formatted.split_once('.') {
        Some((i, d)) => (i.to_string(), Some(d.to_string())),
        None => (formatted, None),
    };

    let mut grouped = String::new();
    let digits: Vec<char> = int_part.chars().collect();
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    let mut out = String::new();
    if n < 0.0 {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(d) = dec_part {
        out.push('.');
        out.push_str(&d);
    }
    out
}

fn compare(left: &Value, right: &Value, operator: &str) -> bool {
    use std::cmp::Ordering;
    match operator {
        "<" | "lt" => loose_cmp(left, right) == Some(Ordering::Less),
        ">" | "gt" => loose_cmp(left, right) == Some(Ordering::Greater),
        "<=" | "lte" => matches!(
            loose_cmp(left, right),
            Some(Ordering::Less) | Some(Ordering::Equal)
        ),
        ">=" | "gte" => matches!(
            loose_cmp(left, right),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        ),
        "!=" | "neq" => !loose_eq(left, right),
        // "", "=", "==", "eq", and anything unrecognized compare as equality.
        _ => loose_eq(left, right),
    }
}

// ---------------------------------------------------------------------------
// Dates

fn gmt() -> FixedOffset {
    use chrono::Offset;
    Utc.fix()
}

fn parse_date(v: &Value) -> Result<DateTime<FixedOffset>, ModifierError> {
    let invalid = || ModifierError::new("variable is not a valid date");
    match v {
        Value::String(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Ok(dt);
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Ok(naive.and_utc().fixed_offset());
            }
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                let naive = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
                return Ok(naive.and_utc().fixed_offset());
            }
            Err(invalid())
        }
        Value::Number(n) => {
            let secs = n.as_i64().ok_or_else(invalid)?;
            Utc.timestamp_opt(secs, 0)
                .single()
                .map(|dt| dt.fixed_offset())
                .ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

fn parse_tz(tz: &str) -> Result<FixedOffset, ModifierError> {
    let invalid = || ModifierError::new(format!("invalid timezone '{tz}'"));
    if tz.eq_ignore_ascii_case("gmt") || tz.eq_ignore_ascii_case("utc") {
        return Ok(gmt());
    }
    let (sign, rest) = match tz.chars().next() {
        Some('+') => (1, &tz[1..]),
        Some('-') => (-1, &tz[1..]),
        _ => return Err(invalid()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

// ---------------------------------------------------------------------------
// Context escaping

fn context_js(v: &Value, in_str: bool) -> Value {
    match v {
        Value::Array(_) | Value::Object(_) => {
            let json = serde_json::to_string(v).unwrap_or_default();
            if in_str {
                Value::String(add_slashes(&json))
            } else {
                Value::String(json)
            }
        }
        Value::Number(_) | Value::Bool(_) => v.clone(),
        Value::Null => Value::String("null".to_string()),
        Value::String(s) => {
            if in_str {
                Value::String(add_slashes(s))
            } else {
                Value::String(format!("\"{}\"", add_slashes(s)))
            }
        }
    }
}

fn context_tag(v: &Value, in_str: bool) -> Value {
    match v {
        Value::Array(_) | Value::Object(_) if in_str => Value::String(query_string(v)),
        _ if in_str => Value::String(url_encode(&display(v))),
        _ => Value::String(
            html_escape::encode_quoted_attribute(&display(v)).into_owned(),
        ),
    }
}

fn context_out_tag(v: &Value) -> Value {
    match v {
        Value::Array(_) | Value::Object(_) => Value::String(format!("{v:?}")),
        _ => Value::String(
            html_escape::encode_quoted_attribute(&display(v)).into_owned(),
        ),
    }
}

/// Serializes a structured value as an `application/x-www-form-urlencoded`
/// query string, nesting keys bracket-style (`a[b]=c`).
fn query_string(v: &Value) -> String {
    let mut pairs: Vec<(String, String)> = Vec::new();
    collect_pairs(v, None, &mut pairs);
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (k, val) in &pairs {
        serializer.append_pair(k, val);
    }
    serializer.finish()
}

fn collect_pairs(v: &Value, prefix: Option<&str>, pairs: &mut Vec<(String, String)>) {
    let nested_key = |key: &str| match prefix {
        Some(p) => format!("{p}[{key}]"),
        None => key.to_string(),
    };
    match v {
        Value::Object(map) => {
            for (k, val) in map {
                collect_pairs(val, Some(&nested_key(k)), pairs);
            }
        }
        Value::Array(items) => {
            for (i, val) in items.iter().enumerate() {
                collect_pairs(val, Some(&nested_key(&i.to_string())), pairs);
            }
        }
        scalar => {
            if let Some(p) = prefix {
                pairs.push((p.to_string(), display(scalar)));
            }
        }
    }
}
