pub mod ghs;
pub mod names;
pub mod properties;
pub mod references;
pub mod tox;

use serde_json::Value;

/// `Record.Section` of a PUG View document.
pub(crate) fn record_sections(doc: &Value) -> &[Value] {
    doc.pointer("/Record/Section")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

pub(crate) fn child_sections(section: &Value) -> &[Value] {
    array_field(section, "Section")
}

pub(crate) fn information(section: &Value) -> &[Value] {
    array_field(section, "Information")
}

pub(crate) fn heading(section: &Value) -> Option<&str> {
    section.get("TOCHeading")?.as_str()
}

/// `Information[i].Name`, e.g. "IUPAC Name" or "Synonym".
pub(crate) fn info_name(info: &Value) -> Option<&str> {
    info.get("Name")?.as_str()
}

/// All `Value.StringWithMarkup[*].String` leaves of one Information entry.
pub(crate) fn markup_strings(info: &Value) -> impl Iterator<Item = &str> {
    info.pointer("/Value/StringWithMarkup")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|markup| markup.get("String")?.as_str())
}

/// Every markup string attached directly to `section`, in order.
pub(crate) fn section_strings(section: &Value) -> Vec<String> {
    information(section)
        .iter()
        .flat_map(markup_strings)
        .map(str::to_string)
        .collect()
}

fn array_field<'a>(node: &'a Value, key: &str) -> &'a [Value] {
    node.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) fn fixture(name: &str) -> Value {
    let raw = std::fs::read_to_string(format!("tests/fixtures/{}.json", name)).unwrap();
    serde_json::from_str(&raw).unwrap()
}
