// src/specs/places.rs
//! State directory page: every place link sits inside a `div.col-md-4`
//! column; the place id is the last path segment of the link.

use std::collections::HashSet;

use crate::core::html::{anchors, blocks_with_class};

pub fn state_url(base: &str, state_code: &str) -> String {
    format!("{}/find/state.aspx?state={}", base.trim_end_matches('/'), state_code)
}

/// Place ids in page order, deduplicated.
pub fn parse_state_directory(doc: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for column in blocks_with_class(doc, "div", "col-md-4") {
        for (href, _) in anchors(column) {
            let slug = href
                .split(['?', '#'])
                .next()
                .unwrap_or("")
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or("")
                .to_ascii_lowercase();
            if !slug.is_empty() && seen.insert(slug.clone()) {
                out.push(slug);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_from_columns_only() {
        let doc = r#"
            <nav><a href="/city/illinois/nav_link">Nav</a></nav>
            <div class="col-md-4">
              <a href="../city/illinois/springfield">Springfield</a><br>
              <a href="../city/illinois/athens_(menard_county)/">Athens</a>
            </div>
            <div class="col-md-4"><a href="../city/illinois/springfield">dup</a>
              <a href="../city/illinois/Zion?x=1">Zion</a></div>"#;
        assert_eq!(parse_state_directory(doc), vec!["springfield", "athens_(menard_county)", "zion"]);
    }

    #[test]
    fn url_shape() {
        assert_eq!(state_url("https://x.net/", "il"), "https://x.net/find/state.aspx?state=il");
    }
}
