//! Display cleanup for occupant labels.
//!
//! Calendar feeds pack lecturer names into a free-text description with footnotes,
//! escape sequences and full names. Only the short uppercase form is shown to users.

/// Label shown when no usable occupant text survives cleanup.
pub const NO_DESCRIPTION: &str = "No description";

/// Longest cleaned label kept, in characters.
pub const MAX_LABEL_CHARS: usize = 70;

/// Marker after which the feed appends free-form notes.
const NOTE_MARKER: &str = "\\nNOTE";

/// Reduce a raw occupant description to a short uppercase list of names.
///
/// - Text from the first `\nNOTE` marker on is dropped, as are backslashes and
///   carriage returns.
/// - Names are split on commas. A name containing a dot keeps what follows the
///   last dot (`"Prof. M. Rossi"` becomes `"Rossi"`); otherwise its last word is
///   dropped (`"ROSSI MARIO 12345"` becomes `"ROSSI MARIO"`).
/// - The result is joined with `", "` and uppercased. Empty results and results
///   longer than [`MAX_LABEL_CHARS`] become [`NO_DESCRIPTION`].
pub fn occupant_label(raw: &str) -> String {
    if raw.is_empty() || raw == NO_DESCRIPTION {
        return NO_DESCRIPTION.to_string();
    }

    let body = raw.split(NOTE_MARKER).next().unwrap_or_default();
    let body: String = body.chars().filter(|c| !matches!(c, '\\' | '\r')).collect();

    let names: Vec<String> = body.split(',').map(short_name).collect();
    let label = names.join(", ");

    if label.trim_matches([',', ' ']).is_empty() || label.chars().count() > MAX_LABEL_CHARS {
        return NO_DESCRIPTION.to_string();
    }
    label.to_uppercase()
}

fn short_name(name: &str) -> String {
    let name = name.trim();
    match name.rsplit_once('.') {
        Some((_, tail)) => tail.trim().to_string(),
        None => {
            let words: Vec<&str> = name.split_whitespace().collect();
            match words.split_last() {
                Some((_, rest)) => rest.join(" "),
                None => String::new(),
            }
        }
    }
}
