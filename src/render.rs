//! Indented text listing of a process forest
//!
//! One line per process, children indented under their parent:
//!
//! ```text
//!  100 sh ["sh", "-c", "make"]
//!    101 make ["make", "all"]
//!      102 clone
//! ```

use crate::config::TreeConfig;
use crate::forest::Forest;
use crate::record::TraceRecord;
use std::io::{self, Write};

/// Format one process line at the given depth
pub fn format_line(record: &TraceRecord, depth: usize, config: &TreeConfig) -> String {
    let indent = depth * config.indent_width;
    match (&record.exec, record.short_name()) {
        (Some(image), _) => {
            let args: String = image.argv.chars().take(config.args_width).collect();
            format!("{:indent$} {} {} [{}]", "", record.pid, image.path_basename(), args)
        }
        (None, Some(label)) => format!("{:indent$} {} {}", "", record.pid, label),
        (None, None) => format!("{:indent$} {}", "", record.pid),
    }
}

/// Write the listing, depth first, to `out`
pub fn write_text<W: Write>(forest: &Forest, config: &TreeConfig, out: &mut W) -> io::Result<()> {
    forest.try_walk(|record, depth| writeln!(out, "{}", format_line(record, depth, config)))
}

/// The listing as a string
pub fn render_text(forest: &Forest, config: &TreeConfig) -> String {
    let mut lines = Vec::new();
    forest.walk(|record, depth| lines.push(format_line(record, depth, config)));
    let mut text = lines.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    text
}
