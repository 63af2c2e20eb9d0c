use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Mode {
    /// `index.html` plus a fingerprinted stylesheet under `assets/`.
    Dir,
    /// One self-contained HTML file with the stylesheet inlined.
    Single,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Profile JSON file. The built-in sample profile is used when omitted.
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Output mode: `dir` (HTML + assets/) or `single` (one self-contained HTML).
    #[arg(long, value_enum, default_value = "dir")]
    pub mode: Mode,

    /// Output path. For `dir` mode: a directory. For `single` mode: an HTML file path.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// JSON file holding the persisted theme choice (`{"theme": "dark"}`).
    ///
    /// Read to pick the theme baked into the page and written back afterwards.
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Treat the system color scheme as dark when no theme has been saved.
    #[arg(long)]
    pub prefers_dark: bool,

    /// Flip the saved theme before rendering.
    #[arg(long)]
    pub toggle_theme: bool,

    /// Year shown in the footer. Defaults to the current UTC year.
    #[arg(long)]
    pub year: Option<i32>,

    /// Assets directory name for `dir` mode.
    #[arg(long, default_value = "assets")]
    pub assets_dir_name: String,
}
