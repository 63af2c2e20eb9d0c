mod builtin;
mod cli;
mod html;
mod strict;

pub mod profile;
pub mod section;
pub mod theme;
pub mod tracker;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use cli::Args;
use profile::Profile;
use section::SectionId;
use theme::{FixedScheme, JsonFileStore, KeyValueStore, MemoryStore, RootClass, ThemeController};
use tracker::{ActiveSectionTracker, ObserverOptions, StaticObserver};

pub use cli::{Args as CliArgs, Mode};
pub use html::{PageState, build_page};
pub use strict::assert_self_contained;

pub fn run(args: Args) -> anyhow::Result<()> {
    let profile = match &args.profile {
        Some(path) => Profile::load(path)?,
        None => {
            tracing::info!("no --profile given; using built-in profile");
            Profile::from_json(builtin::BUILTIN_PROFILE.as_bytes())
                .context("load built-in profile")?
        }
    };

    let year = match args.year {
        Some(y) => y,
        None => time::OffsetDateTime::now_utc().year(),
    };
    let scheme = FixedScheme(Some(args.prefers_dark));
    let state = match &args.state {
        Some(path) => {
            let store = JsonFileStore::new(path);
            page_state(store, &scheme, args.toggle_theme, year)
        }
        None => page_state(MemoryStore::new(), &scheme, args.toggle_theme, year),
    };
    tracing::info!(theme = state.theme.as_str(), active = %state.active, "page state resolved");

    match args.mode {
        Mode::Dir => render_dir(&profile, &state, &args),
        Mode::Single => render_single(&profile, &state, &args),
    }
}

/// Run the theme and section state machines the way the page does on load.
pub fn initial_page_state<S: KeyValueStore>(
    store: S,
    scheme: &FixedScheme,
    year: i32,
) -> PageState {
    page_state(store, scheme, false, year)
}

fn page_state<S: KeyValueStore>(
    store: S,
    scheme: &FixedScheme,
    toggle: bool,
    year: i32,
) -> PageState {
    let root = RootClass::new(&["scroll-smooth"]);
    let mut controller = ThemeController::start(store, scheme, root.clone());
    if toggle {
        let theme = controller.toggle();
        tracing::info!(theme = theme.as_str(), "theme toggled");
    }

    let observer = ObserverOptions::default();
    let mut tracker =
        ActiveSectionTracker::with_options(&SectionId::ALL, StaticObserver::default(), observer);
    let active = tracker.active();
    tracker.disconnect();

    PageState {
        active,
        theme: controller.theme(),
        root_class: root.value(),
        year,
        observer,
    }
}

fn render_dir(profile: &Profile, state: &PageState, args: &Args) -> anyhow::Result<()> {
    let out_dir = args.out.clone().unwrap_or_else(|| PathBuf::from("out"));
    std::fs::create_dir_all(&out_dir).with_context(|| format!("create {}", out_dir.display()))?;

    let css_text = builtin::BUILTIN_CSS;
    let css_rel = write_css_file(&out_dir, &args.assets_dir_name, css_text)?;

    let html = html::build_page(profile, state, "", Some(&css_rel));
    strict::assert_self_contained(&html, css_text)?;

    let html_path = out_dir.join("index.html");
    std::fs::write(&html_path, html).with_context(|| format!("write {}", html_path.display()))?;
    tracing::info!(path = %html_path.display(), css = %css_rel, "wrote page");
    Ok(())
}

fn render_single(profile: &Profile, state: &PageState, args: &Args) -> anyhow::Result<()> {
    let out_path = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from("index.html"));

    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }

    let css_text = builtin::BUILTIN_CSS;
    let html = html::build_page(profile, state, css_text, None);
    strict::assert_self_contained(&html, css_text)?;

    std::fs::write(&out_path, html).with_context(|| format!("write {}", out_path.display()))?;
    tracing::info!(path = %out_path.display(), "wrote page");
    Ok(())
}

/// Stylesheet name carries a content hash so cached copies go stale with edits.
fn write_css_file(out_dir: &Path, assets_dir_name: &str, css: &str) -> anyhow::Result<String> {
    let hash = blake3::hash(css.as_bytes()).to_hex();
    let rel = format!("{}/css/site.{}.css", assets_dir_name, &hash.as_str()[..12]);
    let abs = out_dir.join(&rel);
    if let Some(parent) = abs.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    std::fs::write(&abs, css).with_context(|| format!("write {}", abs.display()))?;
    Ok(rel)
}
