//! Localization string tables.
//!
//! A string table is a small XML file of key/value pairs:
//!
//! ```xml
//! <Strings>
//!     <string><key>greeting</key><value>Hallo</value></string>
//!     <string><key>farewell</key><value>Servus</value></string>
//! </Strings>
//! ```
//!
//! [`Template::load_language`](crate::Template::load_language) loads one and
//! exposes it under `localized.<file stem>.<key>`, so a template reads
//! `{$localized.de.greeting}`.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::error::{RenderError, Result};

/// Loads and parses a string-table file. Returns the file stem (the table's
/// name in the `localized` binding) and its entries.
pub fn load_string_table(path: &str) -> Result<(String, Map<String, Value>)> {
    let xml = std::fs::read_to_string(path)?;
    let stem = Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    let table = parse_string_table(&xml)
        .map_err(|message| RenderError::eval(message, path.to_string()))?;
    Ok((stem, table))
}

/// Parses string-table XML into a key/value map.
pub fn parse_string_table(xml: &str) -> std::result::Result<Map<String, Value>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut table = Map::new();
    let mut key: Option<String> = None;
    let mut value: Option<String> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"string" => {
                    key = None;
                    value = None;
                }
                b"key" => field = Some(Field::Key),
                b"value" => field = Some(Field::Value),
                _ => {}
            },
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| e.to_string())?.into_owned();
                match field {
                    Some(Field::Key) => key = Some(text),
                    Some(Field::Value) => value = Some(text),
                    None => {}
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"key" | b"value" => field = None,
                b"string" => {
                    if let (Some(k), Some(v)) = (key.take(), value.take()) {
                        table.insert(k, Value::String(v));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(table)
}

enum Field {
    Key,
    Value,
}
