// src/core/html.rs
// Tolerant, case-insensitive slicing of HTML. No DOM; just enough to find
// blocks, anchors and label/value cells.

use std::borrow::Cow;

use super::sanitize::{normalize_entities, normalize_ws};

pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// A document and its lowercased copy, for repeated case-insensitive scans.
/// `to_lower` only touches ASCII, so byte offsets agree between the two.
pub struct CiDoc<'a> {
    doc: &'a str,
    lc: Cow<'a, str>,
}

impl<'a> CiDoc<'a> {
    pub fn new(doc: &'a str) -> Self {
        Self { doc, lc: Cow::Owned(to_lower(doc)) }
    }

    pub fn text(&self) -> &'a str {
        self.doc
    }

    /// `doc[start..end]`, reusing the lowercased copy.
    pub fn slice(&self, start: usize, end: usize) -> CiDoc<'_> {
        CiDoc { doc: &self.doc[start..end], lc: Cow::Borrowed(&self.lc[start..end]) }
    }

    /// `(start, end)` of the next `<o ...> ... c` block at or after `from`.
    pub fn next_block(&self, o: &str, c: &str, from: usize) -> Option<(usize, usize)> {
        let ol = to_lower(o);
        let cl = to_lower(c);
        let start = self.lc.get(from..)?.find(&ol)? + from;
        let open_end = self.doc[start..].find('>')? + start + 1;
        let end_rel = self.lc[open_end..].find(&cl)?;
        let end = open_end + end_rel + c.len();
        Some((start, end))
    }
}

pub fn inner_after_open_tag(block: &str) -> String {
    if let Some(oe) = block.find('>') {
        if let Some(cs) = block.rfind('<') {
            if cs > oe {
                return block[oe + 1..cs].to_string();
            }
        }
    }
    s!()
}

pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&out)
}

/// Visible text of an HTML fragment: tags stripped, entities decoded, whitespace collapsed.
pub fn visible_text(s: &str) -> String {
    normalize_ws(&normalize_entities(&strip_tags(s)))
}

/// Value of `attr` in a tag opener like `<a class="x" href='/y'>`.
pub fn attr_value(opener: &str, attr: &str) -> Option<String> {
    let lc = to_lower(opener);
    let needle = format!("{}=", to_lower(attr));
    let mut from = 0;
    // skip matches that are a suffix of a longer attribute name (data-href=)
    let pos = loop {
        let p = lc.get(from..)?.find(&needle)? + from;
        let prev = lc[..p].chars().next_back();
        if matches!(prev, Some(c) if c.is_ascii_whitespace()) {
            break p;
        }
        from = p + needle.len();
    };
    let val = opener[pos + needle.len()..].trim_start();
    let (quote, start_off) = match val.as_bytes().first() {
        Some(b'"') => ('"', 1),
        Some(b'\'') => ('\'', 1),
        _ => ('\0', 0),
    };
    let end = if quote != '\0' {
        val[start_off..].find(quote).map(|e| start_off + e)
    } else {
        val.find(|c: char| c.is_ascii_whitespace() || c == '>')
    }
    .unwrap_or(val.len());
    Some(val[start_off..end].to_string())
}

/// Every `<a href=...>text</a>` in `block`, in document order.
pub fn anchors(block: &str) -> Vec<(String, String)> {
    let scan = CiDoc::new(block);
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some((s, e)) = scan.next_block("<a", "</a>", pos) {
        pos = e;
        let a = &block[s..e];
        // `<abbr>` and friends also start with "<a"
        if !a[2..].starts_with(|c: char| c.is_ascii_whitespace() || c == '>') {
            pos = s + 2;
            continue;
        }
        let opener_end = a.find('>').unwrap_or(a.len());
        if let Some(href) = attr_value(&a[..opener_end], "href") {
            out.push((href, visible_text(&inner_after_open_tag(a))));
        }
    }
    out
}

/// Every `<tag ...>...</tag>` block whose opener carries `class` among its classes.
pub fn blocks_with_class<'a>(doc: &'a str, tag: &str, class: &str) -> Vec<&'a str> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let scan = CiDoc::new(doc);
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some((s, e)) = scan.next_block(&open, &close, pos) {
        pos = e;
        let block = &doc[s..e];
        let opener_end = block.find('>').unwrap_or(block.len());
        let has = attr_value(&block[..opener_end], "class")
            .map(|v| v.split_ascii_whitespace().any(|c| c.eq_ignore_ascii_case(class)))
            .unwrap_or(false);
        if has {
            out.push(block);
        }
    }
    out
}

/// Text of the cell right after the `<td>` whose visible text starts with `label`.
/// Rows look like `<tr><td>Rainfall</td><td>37.8 in.</td><td>38.1 in.</td></tr>`.
pub fn table_value_after_label(doc: &str, label: &str) -> Option<String> {
    let want = to_lower(label);
    let scan = CiDoc::new(doc);
    let mut pos = 0usize;
    while let Some((tr_s, tr_e)) = scan.next_block("<tr", "</tr>", pos) {
        pos = tr_e;
        let tr = scan.slice(tr_s, tr_e);
        let mut cells = Vec::new();
        let mut td_pos = 0usize;
        while let Some((td_s, td_e)) = tr.next_block("<td", "</td>", td_pos) {
            cells.push(visible_text(&inner_after_open_tag(&tr.text()[td_s..td_e])));
            td_pos = td_e;
        }
        if cells.len() >= 2 && to_lower(&cells[0]).starts_with(&want) {
            return Some(cells.swap_remove(1));
        }
    }
    None
}
