use std::io::{self, BufRead};

pub const PROMPT: &str = "Enter CAS numbers (one per line). Press Enter twice to finish:";

/// Trimmed lines up to the first blank line (or EOF).
pub fn read_identifiers<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut ids = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let id = line.trim();
        if id.is_empty() {
            break;
        }
        ids.push(id.to_string());
    }
    Ok(ids)
}
