use crate::theme::{DARK_CLASS, THEME_KEY};
use crate::tracker::ObserverOptions;

pub const BUILTIN_CSS: &str = include_str!("builtin.css");

pub const BUILTIN_PROFILE: &str = include_str!("builtin_profile.json");

/// Runs in `<head>` so the saved theme is applied before first paint.
const THEME_HEAD_JS: &str = r#"(function () {
  var dark = false;
  try {
    var saved = localStorage.getItem("__STORAGE_KEY__");
    dark = saved
      ? saved === "dark"
      : !!(window.matchMedia && window.matchMedia("(prefers-color-scheme: dark)").matches);
  } catch (_) {
    dark = false;
  }
  document.documentElement.classList.toggle("__DARK_CLASS__", dark);
})();"#;

const PAGE_JS: &str = r#"(function () {
  var storageKey = "__STORAGE_KEY__";
  var darkClass = "__DARK_CLASS__";
  var root = document.documentElement;
  var toggle = document.getElementById("theme-toggle");
  var dark = root.classList.contains(darkClass);

  function commit() {
    root.classList.toggle(darkClass, dark);
    if (toggle) {
      toggle.textContent = dark ? "☀" : "☾";
      toggle.setAttribute("aria-pressed", dark ? "true" : "false");
    }
    try {
      localStorage.setItem(storageKey, dark ? "dark" : "light");
    } catch (_) {}
  }

  commit();
  if (toggle) {
    toggle.addEventListener("click", function () {
      dark = !dark;
      commit();
    });
  }

  var ids = [];
  var links = {};
  document.querySelectorAll("[data-section]").forEach(function (el) {
    ids.push(el.id);
  });
  document.querySelectorAll("nav a[data-nav]").forEach(function (a) {
    links[a.getAttribute("data-nav")] = a;
  });

  function setActive(id) {
    Object.keys(links).forEach(function (key) {
      var on = key === id;
      links[key].classList.toggle("active", on);
      if (on) {
        links[key].setAttribute("aria-current", "true");
      } else {
        links[key].removeAttribute("aria-current");
      }
    });
  }

  if (!("IntersectionObserver" in window) || ids.length === 0) return;

  var obs;
  try {
    obs = new IntersectionObserver(
      function (entries) {
        var best = -1;
        entries.forEach(function (e) {
          if (!e.isIntersecting) return;
          var idx = ids.indexOf(e.target.id);
          if (idx >= 0 && (best < 0 || idx < best)) best = idx;
        });
        if (best >= 0) setActive(ids[best]);
      },
      { rootMargin: "__ROOT_MARGIN__", threshold: __THRESHOLD__ }
    );
  } catch (_) {
    return;
  }

  var watching = false;
  function watch() {
    if (watching) return;
    ids.forEach(function (id) {
      var el = document.getElementById(id);
      if (el) obs.observe(el);
    });
    watching = true;
  }
  function unwatch() {
    if (!watching) return;
    obs.disconnect();
    watching = false;
  }

  watch();
  window.addEventListener("pagehide", unwatch);
  // Pages restored from the back/forward cache come back live.
  window.addEventListener("pageshow", function (e) {
    if (e.persisted) watch();
  });
})();"#;

fn fill(template: &str, options: &ObserverOptions) -> String {
    template
        .replace("__STORAGE_KEY__", THEME_KEY)
        .replace("__DARK_CLASS__", DARK_CLASS)
        .replace("__ROOT_MARGIN__", &options.root_margin())
        .replace("__THRESHOLD__", &options.threshold.to_string())
}

/// Blocking `<head>` script that resolves the theme class.
pub fn theme_head_script() -> String {
    fill(THEME_HEAD_JS, &ObserverOptions::default())
}

/// Inline script driving theme persistence and scroll-spy in the browser.
pub fn page_script(options: &ObserverOptions) -> String {
    fill(PAGE_JS, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;

    #[test]
    fn script_has_no_placeholders_left() {
        let js = page_script(&ObserverOptions::default());
        assert!(!js.contains("__"));
        assert!(js.contains(r#"rootMargin: "-40% 0px -50% 0px", threshold: 0.1"#));
        assert!(js.contains(r#"var storageKey = "theme";"#));

        let head = theme_head_script();
        assert!(!head.contains("__"));
        assert!(head.contains(r#"localStorage.getItem("theme")"#));
        assert!(head.contains(r#"classList.toggle("dark", dark)"#));
    }

    #[test]
    fn observer_reconnects_after_cache_restore() {
        let js = page_script(&ObserverOptions::default());
        assert!(js.contains(r#"window.addEventListener("pagehide", unwatch);"#));
        assert!(js.contains("if (e.persisted) watch();"));
        // Re-observing is guarded so teardown and restore stay idempotent.
        assert!(js.contains("if (watching) return;"));
        assert!(js.contains("if (!watching) return;"));
    }

    #[test]
    fn builtin_profile_is_valid() {
        let p = Profile::from_json(BUILTIN_PROFILE.as_bytes()).unwrap();
        assert_eq!(p.projects.len(), 4);
        assert_eq!(p.skills.keys().next().map(String::as_str), Some("languages"));
    }
}
