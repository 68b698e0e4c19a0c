//! Item naming: title slugs and dated filenames.

use chrono::NaiveDate;

/// Derive a filesystem-safe slug from an item title.
///
/// Lowercases, folds common accented letters to their ASCII base, and
/// collapses every other non-alphanumeric run into a single dash. Distinct
/// titles can still collide; a collision surfaces as a duplicate skip at
/// fetch time rather than an error here.
pub fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.to_lowercase().chars() {
        let c = fold_diacritic(c);
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    out
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        _ => c,
    }
}

/// Prefix a filename with its publish date, `YYYYMMDD-` style, so plain
/// name sorts become date sorts.
pub fn dated_name(name: &str, date: NaiveDate) -> String {
    format!("{}-{name}", date.format("%Y%m%d"))
}

/// Whether `name` already carries this exact date prefix.
pub fn has_date_prefix(name: &str, date: NaiveDate) -> bool {
    name.starts_with(&format!("{}-", date.format("%Y%m%d")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
