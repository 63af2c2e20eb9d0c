use std::sync::LazyLock;

use base64::Engine as _;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use regex::Regex;
use url::Url;

use crate::builtin;
use crate::profile::{Education, Internship, Profile, Project};
use crate::section::SectionId;
use crate::theme::Theme;
use crate::tracker::ObserverOptions;

/// Everything about the page that is not profile data.
#[derive(Debug, Clone)]
pub struct PageState {
    pub active: SectionId,
    pub theme: Theme,
    /// Class attribute for `<html>`, as left by the theme controller.
    pub root_class: String,
    pub year: i32,
    pub observer: ObserverOptions,
}

pub fn build_page(
    profile: &Profile,
    state: &PageState,
    css: &str,
    css_link_href: Option<&str>,
) -> String {
    let script = builtin::page_script(&state.observer);
    let markup: Markup = html! {
        (DOCTYPE)
        html lang="en" class=(state.root_class) {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                meta name="color-scheme" content="light dark";
                meta name="description" content=(profile.title);
                title { (profile.name) " | Portfolio" }
                link rel="icon" href=(favicon_data_uri(&profile.name));
                script { (PreEscaped(builtin::theme_head_script())) }
                @if let Some(href) = css_link_href {
                    link rel="stylesheet" href=(href);
                } @else {
                    style { (PreEscaped(css)) }
                }
            }
            body {
                (render_nav(profile, state))
                (render_hero(profile))
                (render_about(profile))
                (render_skills(profile))
                (render_projects(&profile.projects))
                (render_internships(&profile.internships))
                (render_education(&profile.education))
                (render_certs(profile))
                (render_contact(profile))
                (render_footer(profile, state.year))
                script { (PreEscaped(script)) }
            }
        }
    };
    markup.into_string()
}

fn render_nav(profile: &Profile, state: &PageState) -> Markup {
    let dark = state.theme.is_dark();
    html! {
        nav class="nav" {
            div class="container nav-inner" {
                a class="brand" href=(SectionId::Home.anchor()) { (profile.name) }
                div class="nav-links" {
                    @for id in SectionId::ALL {
                        @if let Some(label) = id.nav_label() {
                            @let is_active = id == state.active;
                            a.nav-link.active[is_active]
                                href=(id.anchor())
                                data-nav=(id.as_str())
                                aria-current=[is_active.then_some("true")] { (label) }
                        }
                    }
                }
                div class="nav-actions" {
                    (link_to("icon-link", &profile.links.github, html! { "GH" }, Some("GitHub")))
                    (link_to("icon-link", &profile.links.linkedin, html! { "in" }, Some("LinkedIn")))
                    button type="button" id="theme-toggle" class="btn btn-outline theme-toggle"
                        aria-label="Toggle theme" aria-pressed=(if dark { "true" } else { "false" }) {
                        @if dark { "☀" } @else { "☾" }
                    }
                }
            }
        }
    }
}

fn render_hero(profile: &Profile) -> Markup {
    html! {
        header id=(SectionId::Home.as_str()) data-section=(SectionId::Home.as_str()) class="hero" {
            div class="container hero-grid" {
                div {
                    h1 { (profile.name) }
                    p class="hero-title" { (profile.title) }
                    div class="hero-meta" {
                        span { "⌖ " (profile.location) }
                        span { "•" }
                        a href=(format!("mailto:{}", profile.email)) { (profile.email) }
                        span { "•" }
                        span { (profile.phone) }
                    }
                    div class="hero-actions" {
                        a class="btn" href=(SectionId::Projects.anchor()) { "View Projects" }
                        a class="btn btn-outline" href=(SectionId::Contact.anchor()) { "Contact Me" }
                        @if let Some(cv) = profile.links.cv.as_deref().filter(|s| !s.trim().is_empty()) {
                            a class="btn btn-ghost" href=(cv) download { "⤓ Download CV" }
                        } @else {
                            span class="btn btn-ghost" aria-disabled="true" { "⤓ Download CV" }
                        }
                    }
                }
                div class="card" {
                    h3 { "Career Objective" }
                    p { (profile.summary) }
                }
            }
        }
    }
}

fn section(id: SectionId, glyph: &str, title: &str, body: Markup) -> Markup {
    html! {
        section id=(id.as_str()) data-section=(id.as_str()) class="section" {
            div class="container" {
                div class="section-head" {
                    span class="glyph" aria-hidden="true" { (glyph) }
                    h2 { (title) }
                }
                (body)
            }
        }
    }
}

fn render_about(profile: &Profile) -> Markup {
    let text = profile.about.as_deref().unwrap_or(&profile.summary);
    section(SectionId::About, ">_", "About Me", html! { p { (text) } })
}

fn render_skills(profile: &Profile) -> Markup {
    let merge_strong = profile.skills.contains_key("tools");
    let body = html! {
        div class="grid-2" {
            @for (category, labels) in &profile.skills {
                @if !(merge_strong && category == "strong") {
                    div class="card" data-skill=(category) {
                        h3 { (skill_title(category)) }
                        @for s in labels {
                            span class="pill" { (s) }
                        }
                        @if merge_strong && category == "tools" {
                            @if let Some(strong) = profile.skills.get("strong") {
                                div class="spacer" {}
                                @for s in strong {
                                    span class="pill" { (s) }
                                }
                            }
                        }
                    }
                }
            }
        }
    };
    section(SectionId::Skills, "⚙", "Technical Skills", body)
}

fn render_projects(projects: &[Project]) -> Markup {
    let body = html! {
        div class="grid-2" {
            @for p in projects {
                (render_project(p))
            }
        }
    };
    section(SectionId::Projects, "</>", "Projects", body)
}

fn render_project(p: &Project) -> Markup {
    html! {
        article class="card project" {
            div class="card-head" {
                h3 { (p.name) }
                span class="date-chip" { (p.date) }
            }
            p class="role" { (p.role) }
            p { (p.desc) }
            div class="tags" {
                @for t in &p.tech {
                    span class="tag" { (t) }
                }
            }
            @if let Some(link) = p.link.as_deref().filter(|s| !s.trim().is_empty()) {
                (link_to("", link, html! { "View ↗" }, None))
            }
        }
    }
}

fn render_internships(internships: &[Internship]) -> Markup {
    let body = html! {
        div class="timeline" {
            @for i in internships {
                div class="timeline-item" {
                    div class="timeline-head" {
                        h4 { (i.org) }
                        span class="muted" { (i.date) }
                    }
                    ul {
                        @for pt in &i.points {
                            li { (pt) }
                        }
                    }
                }
            }
        }
    };
    section(SectionId::Experience, "⚒", "Internships", body)
}

fn render_education(education: &[Education]) -> Markup {
    let body = html! {
        div class="grid-3" {
            @for e in education {
                div class="card" {
                    h3 { (e.degree) }
                    p { strong { (e.org) } }
                    p class="muted" { (e.date) }
                    p { (e.detail) }
                }
            }
        }
    };
    section(SectionId::Education, "✎", "Education", body)
}

fn render_certs(profile: &Profile) -> Markup {
    let body = html! {
        div class="grid-2" {
            div class="card" {
                h3 { "Certifications" }
                ul {
                    @for c in &profile.certifications {
                        li { (c) }
                    }
                }
            }
            div class="card" {
                h3 { "Highlights" }
                ul {
                    @for a in &profile.achievements {
                        li { (a) }
                    }
                }
            }
        }
    };
    section(SectionId::Certs, "★", "Certifications & Achievements", body)
}

fn render_contact(profile: &Profile) -> Markup {
    let links = &profile.links;
    let body = html! {
        div class="grid-2" {
            div class="card" {
                h3 { "Get in Touch" }
                p {
                    "Email: "
                    a href=(format!("mailto:{}", profile.email)) { (profile.email) }
                }
                p {
                    "Phone: "
                    a href=(tel_href(&profile.phone)) { (profile.phone) }
                }
                div class="hero-actions" {
                    (link_to("btn btn-outline", &links.github, html! { "GitHub" }, None))
                    (link_to("btn btn-outline", &links.linkedin, html! { "LinkedIn" }, None))
                }
            }
            div class="card" {
                h3 { "Profiles" }
                p { (link_to("", &links.leetcode, html! { "LeetCode ↗" }, None)) }
                p { (link_to("", &links.hackerrank, html! { "HackerRank ↗" }, None)) }
            }
        }
    };
    section(SectionId::Contact, "✉", "Contact", body)
}

fn render_footer(profile: &Profile, year: i32) -> Markup {
    html! {
        footer class="footer" {
            div class="container footer-inner" {
                p { "© " (year) " " (profile.name) ". All rights reserved." }
                div {
                    (link_to("", &profile.links.github, html! { "GitHub" }, None))
                    " • "
                    (link_to("", &profile.links.linkedin, html! { "LinkedIn" }, None))
                }
            }
        }
    }
}

/// Web links open in a new tab; in-page, `mailto:` and `tel:` links do not.
fn link_to(class: &str, href: &str, body: Markup, label: Option<&str>) -> Markup {
    let new_tab = opens_new_tab(href);
    html! {
        a class=[(!class.is_empty()).then_some(class)]
            href=(href)
            target=[new_tab.then_some("_blank")]
            rel=[new_tab.then_some("noreferrer")]
            aria-label=[label] { (body) }
    }
}

pub(crate) fn opens_new_tab(href: &str) -> bool {
    match Url::parse(href.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

static NON_DIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^+0-9]").expect("phone digit regex"));

pub(crate) fn tel_href(phone: &str) -> String {
    format!("tel:{}", NON_DIAL.replace_all(phone, ""))
}

fn skill_title(category: &str) -> String {
    match category {
        "languages" => "Languages".to_string(),
        "web" => "Web / Full‑Stack".to_string(),
        "database" => "Database".to_string(),
        "tools" => "Tools & Strengths".to_string(),
        "strong" => "Strengths".to_string(),
        "os" => "Operating Systems".to_string(),
        other => other
            .split(['_', '-', ' '])
            .filter(|w| !w.is_empty())
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|w| w.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

/// Inline SVG monogram, so the page needs no favicon file.
fn favicon_data_uri(name: &str) -> String {
    let svg = format!(
        concat!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 64 64">"##,
            r##"<rect width="64" height="64" rx="14" fill="#2563eb"/>"##,
            r##"<text x="32" y="42" font-family="sans-serif" font-size="28" "##,
            r##"font-weight="700" text-anchor="middle" fill="#fff">{}</text></svg>"##
        ),
        maud::html! { (initials(name)) }.into_string()
    );
    format!(
        "data:image/svg+xml;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(svg)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tab_only_for_web_links() {
        assert!(opens_new_tab("https://github.com/x"));
        assert!(!opens_new_tab("#"));
        assert!(!opens_new_tab("mailto:a@b.c"));
        assert!(!opens_new_tab("tel:123"));
        assert!(!opens_new_tab("/relative"));
    }

    #[test]
    fn phone_becomes_dialable() {
        assert_eq!(tel_href("+44 (20) 7946-0000"), "tel:+442079460000");
        assert_eq!(tel_href("6260075196"), "tel:6260075196");
    }

    #[test]
    fn skill_titles() {
        assert_eq!(skill_title("web"), "Web / Full‑Stack");
        assert_eq!(skill_title("cloud_platforms"), "Cloud Platforms");
    }

    #[test]
    fn favicon_is_inline() {
        assert_eq!(initials("Umesh Yadav"), "UY");
        assert_eq!(initials("ada"), "A");
        assert!(favicon_data_uri("Ada").starts_with("data:image/svg+xml;base64,"));
    }
}
