//! Text formatting for CLI output and the terminal renderer.

use crate::cache::EntryInspection;
use crate::error::ErrorKind;
use crate::merge::{MergedCategory, MergedView};
use crate::render::Renderer;
use crate::types::Fragment;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use parking_lot::Mutex;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// One row per category, in index order.
pub fn format_view_text(view: &MergedView) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Categories")));
    if view.categories.is_empty() {
        out.push_str("No categories.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Category", "Name", "Sections", "Items", "State"]);
    for category in &view.categories {
        table.add_row(vec![
            category.id.clone(),
            category.parent_name.clone(),
            category.children.len().to_string(),
            item_column(category),
            state_column(category),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));
    let loaded = view.categories.iter().filter(|c| c.loaded).count();
    out.push_str(&format!(
        "Total: {} categories, {} loaded, {} items.\n",
        view.categories.len(),
        loaded,
        view.item_count()
    ));
    out
}

fn item_column(category: &MergedCategory) -> String {
    if category.loaded {
        category.item_count().to_string()
    } else {
        let expected: usize = category.children.iter().map(|c| c.item_count).sum();
        format!("({} expected)", expected)
    }
}

fn state_column(category: &MergedCategory) -> String {
    let state = if category.loaded {
        "loaded"
    } else if category.unavailable {
        "unavailable"
    } else {
        "stub"
    };
    if category.hidden {
        format!("{}, hidden", state)
    } else {
        state.to_string()
    }
}

/// Sections and items of a single category.
pub fn format_fragment_text(fragment: &Fragment) -> String {
    let mut out = String::new();
    let title = if fragment.parent_name.is_empty() {
        fragment.id.clone()
    } else {
        format!("{} ({})", fragment.parent_name, fragment.id)
    };
    out.push_str(&format!("{}\n\n", format_section_heading(&title)));
    for child in &fragment.children {
        out.push_str(&format!("{}\n", child.name.bold()));
        if child.items.is_empty() {
            out.push_str("  (empty)\n\n");
            continue;
        }
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Title", "URL", "Description"]);
        for item in &child.items {
            table.add_row(vec![
                item.title.clone(),
                item.url.clone(),
                item.description.clone(),
            ]);
        }
        out.push_str(&format!("{}\n\n", table));
    }
    out.push_str(&format!("Total: {} items.\n", fragment.item_count()));
    out
}

pub fn format_inspection_text(category_id: &str, inspection: Option<&EntryInspection>) -> String {
    let Some(entry) = inspection else {
        return format!("No cache entry for {}.\n", category_id);
    };
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Key", "Version", "Age (s)", "Items", "Valid"]);
    table.add_row(vec![
        entry.key.clone(),
        entry.version.clone(),
        entry.age.as_secs().to_string(),
        entry.item_count.to_string(),
        if entry.valid { "yes" } else { "no" }.to_string(),
    ]);
    format!("{}\n", table)
}

/// Renderer that turns pipeline callbacks into transcript lines.
#[derive(Default)]
pub struct TextRenderer {
    lines: Mutex<Vec<String>>,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything rendered so far.
    pub fn take_transcript(&self) -> String {
        let lines = std::mem::take(&mut *self.lines.lock());
        lines.into_iter().map(|line| line + "\n").collect()
    }

    fn push(&self, line: String) {
        self.lines.lock().push(line);
    }
}

impl Renderer for TextRenderer {
    fn render_skeleton(&self, view: &MergedView) {
        self.push(format!(
            "{} {} categories",
            "skeleton".dimmed(),
            view.categories.len()
        ));
    }

    fn render_full(&self, view: &MergedView) {
        let loaded = view.categories.iter().filter(|c| c.loaded).count();
        self.push(format!(
            "{} {}/{} categories loaded",
            "render".green(),
            loaded,
            view.categories.len()
        ));
    }

    fn render_category_update(&self, category_id: &str, fragment: &Fragment) {
        self.push(format!(
            "{} {} ({} items)",
            "loaded".green(),
            category_id,
            fragment.item_count()
        ));
    }

    fn render_category_unavailable(&self, category_id: &str, kind: ErrorKind) {
        self.push(format!(
            "{} {} [{}]",
            "unavailable".yellow(),
            category_id,
            kind
        ));
    }

    fn render_error(&self, kind: ErrorKind, message: &str) {
        self.push(format!("{} [{}] {}", "error".red().bold(), kind, message));
    }
}
