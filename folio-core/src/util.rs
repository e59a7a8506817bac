use std::{fs, io, path::Path};

use once_cell::sync::Lazy;
use regex::Regex;

static ORDER_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)[\s\-_]+(.+)$").unwrap());
static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SLUG_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").unwrap());

/// Splits a leading numeric ordering prefix off a folder or file name.
///
/// `"01-Weddings"`, `"02 - Portraits"` and `"10_Classical Dance"` all carry a
/// prefix; names without one return `None` and are left untouched. Prefixes
/// too long for a `u64` still split, ordered as `u64::MAX`.
pub fn order_prefix(name: &str) -> (Option<u64>, &str) {
    ORDER_PREFIX
        .captures(name)
        .and_then(|caps| {
            let order = caps.get(1)?.as_str().parse().unwrap_or(u64::MAX);
            let rest = caps.get(2)?.as_str().trim();
            Some((Some(order), rest))
        })
        .unwrap_or((None, name))
}

/// URL-friendly slug of a name, ignoring any ordering prefix.
pub fn slugify(name: &str) -> String {
    let (_, clean) = order_prefix(name);
    let lower = clean.to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(&lower, "");
    let dashed = SLUG_SEPARATORS.replace_all(&stripped, "-");
    dashed.trim_matches('-').to_string()
}

pub fn mkdir_if_not_exists(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).or_else(|err| {
        if err.kind() == io::ErrorKind::AlreadyExists {
            Ok(())
        } else {
            Err(err)
        }
    })
}
