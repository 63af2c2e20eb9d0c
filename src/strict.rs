use std::collections::HashSet;

use kuchiki::traits::TendrilSink as _;

use crate::section::SectionId;

/// Reject pages that would load anything from the network or carry dangling
/// navigation anchors.
pub fn assert_self_contained(html: &str, css: &str) -> anyhow::Result<()> {
    assert_css_strict(css)?;
    let doc = kuchiki::parse_html().one(html);
    assert_html_strict(&doc)?;
    assert_anchors_resolve(&doc)?;
    Ok(())
}

fn assert_css_strict(css: &str) -> anyhow::Result<()> {
    let lowered = css.to_ascii_lowercase();
    if lowered.contains("@import") || has_remote_url(&lowered) {
        anyhow::bail!("offline check failed: css references non-local urls");
    }
    Ok(())
}

fn has_remote_url(lowered: &str) -> bool {
    ["url(http", "url(\"http", "url('http", "url(//", "url(\"//", "url('//"]
        .iter()
        .any(|p| lowered.contains(p))
}

fn assert_html_strict(doc: &kuchiki::NodeRef) -> anyhow::Result<()> {
    for selector in [
        "img[src]",
        "img[srcset]",
        "source[src]",
        "source[srcset]",
        "script[src]",
        "link[href]",
        "iframe[src]",
        "audio[src]",
        "video[src]",
    ] {
        if let Ok(nodes) = doc.select(selector) {
            for node in nodes {
                let attrs = node.attributes.borrow();
                for attr in ["src", "srcset", "href"] {
                    if let Some(v) = attrs.get(attr) {
                        if is_remote_auto_load(v) {
                            anyhow::bail!(
                                "offline check failed: <{} {}=\"{}\"> is not local",
                                node.name.local.as_ref(),
                                attr,
                                v
                            );
                        }
                    }
                }
            }
        }
    }

    if let Ok(nodes) = doc.select("[style]") {
        for node in nodes {
            if let Some(style) = node.attributes.borrow().get("style") {
                if has_remote_url(&style.to_ascii_lowercase()) {
                    anyhow::bail!("offline check failed: style attribute contains remote url()");
                }
            }
        }
    }
    if let Ok(nodes) = doc.select("style") {
        for node in nodes {
            assert_css_strict(&node.as_node().text_contents())?;
        }
    }

    Ok(())
}

/// Links the page itself generates for in-page navigation. Profile-supplied
/// links are rendered as given and not checked.
const NAV_LINKS: &str = r##"nav a[href^="#"], #home .hero-actions a[href^="#"]"##;

/// Every navigation `#fragment` must land on an element id, and every section must exist.
fn assert_anchors_resolve(doc: &kuchiki::NodeRef) -> anyhow::Result<()> {
    let mut ids = HashSet::new();
    if let Ok(nodes) = doc.select("[id]") {
        for node in nodes {
            if let Some(id) = node.attributes.borrow().get("id") {
                ids.insert(id.to_string());
            }
        }
    }

    for section in SectionId::ALL {
        if !ids.contains(section.as_str()) {
            anyhow::bail!("offline check failed: section #{section} is missing");
        }
    }

    if let Ok(nodes) = doc.select(NAV_LINKS) {
        for node in nodes {
            let attrs = node.attributes.borrow();
            let Some(href) = attrs.get("href") else { continue };
            let Some(fragment) = href.strip_prefix('#') else { continue };
            // A bare `#` is a placeholder link, not a navigation target.
            if fragment.is_empty() {
                continue;
            }
            if !ids.contains(fragment) {
                anyhow::bail!("offline check failed: link {href} has no target");
            }
        }
    }
    Ok(())
}

fn is_remote_auto_load(v: &str) -> bool {
    let s = v.trim().to_ascii_lowercase();
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> String {
        let sections: String = SectionId::ALL
            .iter()
            .map(|s| format!("<section id=\"{s}\"></section>"))
            .collect();
        format!("<!DOCTYPE html><html><head></head><body>{body}{sections}</body></html>")
    }

    #[test]
    fn accepts_local_page() {
        let html = page(
            r##"<nav><a href="#skills">Skills</a><a href="#">x</a></nav><a href="https://github.com">gh</a>"##,
        );
        assert_self_contained(&html, "body { color: red; }").unwrap();
    }

    #[test]
    fn rejects_remote_script() {
        let html = page(r#"<script src="https://cdn.example.com/x.js"></script>"#);
        assert!(assert_self_contained(&html, "").is_err());
    }

    #[test]
    fn rejects_remote_css_url() {
        let html = page("");
        assert!(assert_self_contained(&html, "a { background: url(https://x/y.png) }").is_err());
        assert!(assert_self_contained(&html, "@import \"x.css\";").is_err());
    }

    #[test]
    fn rejects_dangling_anchor() {
        let html = page(r##"<nav><a href="#blog">Blog</a></nav>"##);
        let err = assert_self_contained(&html, "").unwrap_err();
        assert!(err.to_string().contains("#blog"));
    }

    #[test]
    fn profile_links_are_not_checked() {
        let html = page(r##"<article class="card project"><a href="#top">View</a></article>"##);
        assert_self_contained(&html, "").unwrap();
    }

    #[test]
    fn rejects_missing_section() {
        let html = "<html><body><section id=\"home\"></section></body></html>";
        assert!(assert_self_contained(html, "").is_err());
    }
}
