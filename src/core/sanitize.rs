// src/core/sanitize.rs
// String canonicalization shared by every source, so keys built from
// different sites compare equal: "Sangamon County" == "sangamon".

/// Trailing tokens naming the kind of county-level unit.
const COUNTY_TOKENS: &[&str] = &["county", "parish", "borough"];

pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&deg;", "°")
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Remove every `( ... )` group, contents included. No nesting.
pub fn strip_parenthetical(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;
    for ch in s.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Lowercase, drop parentheticals, whitespace → `_`, drop a trailing county
/// token, trim `_`. `"Athens (Clarke County)"` → `"athens"`, `"Sangamon County"` → `"sangamon"`.
pub fn canonicalize(s: &str) -> String {
    let lowered = strip_parenthetical(&s.to_lowercase());
    let mut tokens: Vec<&str> = lowered
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() > 1 && tokens.last().is_some_and(|t| COUNTY_TOKENS.contains(t)) {
        tokens.pop();
    }
    tokens.join("_").trim_matches('_').to_string()
}

/// Human city key derived from a place slug (county disambiguation removed).
pub fn city_from_place(place: &str) -> String {
    canonicalize(place)
}

/// Census place names carry their legal type: "Springfield city" → "springfield".
pub fn strip_place_type(name: &str) -> String {
    const TYPES: &[&str] = &[
        " city and borough", " consolidated government", " unified government",
        " metropolitan government", " city", " town", " village", " borough", " cdp",
    ];
    let trimmed = name.trim();
    let lc = trimmed.to_ascii_lowercase();
    for t in TYPES {
        if lc.ends_with(t) {
            return canonicalize(&trimmed[..trimmed.len() - t.len()]);
        }
    }
    canonicalize(trimmed)
}
