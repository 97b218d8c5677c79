/// Location resolution: from a coded location string to dataset names and
/// chart labels.
///
/// A location code arrives from the presentation layer and is resolved in
/// three modes, tried in order:
///
/// 1. Literal — the code is already a dataset name (`*` wildcard marker) or
///    a fully qualified record path (leading `/`). Used verbatim, no labels.
/// 2. Symbolic — the code is matched by exact suffix against a row of one of
///    the two link tables; names and labels are copied from the row.
/// 3. Prefix inference — no table governs the code; a dataset category is
///    inferred from the code's leading characters.
///
/// A code that resolves in none of the modes yields empty fields. Callers
/// must tolerate empty labels without failing.

use std::fs;
use std::path::Path;

use crate::logging::{self, DataSource};

// ---------------------------------------------------------------------------
// Resolved labels
// ---------------------------------------------------------------------------

/// Label bundle produced by resolution. Any field may be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationLabels {
    /// Dataset name(s) for the main series. May contain `+` sums and the
    /// `(-1)` shift marker, see `fetch`.
    pub primary_name: String,
    /// Dataset name for the control/secondary series, empty when none.
    pub secondary_name: String,
    /// Primary y-axis label.
    pub y_label: String,
    /// Chart/table title.
    pub title: String,
    /// Label for the secondary series.
    pub secondary_label: String,
}

impl LocationLabels {
    /// Title for display: falls back to the primary dataset name when no
    /// title was resolved.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() { &self.primary_name } else { &self.title }
    }
}

// ---------------------------------------------------------------------------
// Prefix-category inference
// ---------------------------------------------------------------------------

/// Ordered (prefix, category) pairs for inference mode. Two-character
/// prefixes are listed before their one-character fallbacks; the scan takes
/// the first match. Matching is case-insensitive.
pub static PREFIX_CATEGORIES: &[(&str, &str)] = &[
    ("S_", "STORAGE"),
    ("C_", "FLOW-CHANNEL"),
    ("D_", "FLOW-DELIVERY"),
    ("R_", "RETURN-FLOW"),
    ("I_", "INFLOW"),
    ("AD_", "FLOW-ACCRDEPL"),
    ("S", "STORAGE"),
    ("D", "FLOW-DELIVERY"),
    ("C", "FLOW-CHANNEL"),
];

/// Infers a dataset category from a variable name's leading characters.
/// Returns the empty string when no prefix matches.
pub fn infer_category(name: &str) -> &'static str {
    for (prefix, category) in PREFIX_CATEGORIES {
        if name
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        {
            return category;
        }
    }
    ""
}

// ---------------------------------------------------------------------------
// Link tables
// ---------------------------------------------------------------------------

/// One row of a link table: a location code plus the names and labels it
/// resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRow {
    pub code: String,
    pub primary_name: String,
    pub secondary_name: String,
    pub y_label: String,
    pub title: String,
    pub secondary_label: String,
}

/// A loaded link table. Row order is match order.
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    pub rows: Vec<LinkRow>,
}

impl LinkTable {
    /// Loads a tab-delimited link table: one header line, then six columns
    /// per row split on runs of tabs. The literal string "null" in any
    /// column is normalized to empty. Rows with fewer than six columns are
    /// skipped.
    pub fn load(path: &Path) -> std::io::Result<LinkTable> {
        let text = fs::read_to_string(path)?;
        let mut rows = Vec::new();
        for line in text.lines().skip(1) {
            let fields: Vec<&str> = line
                .split('\t')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .collect();
            if fields.len() < 6 {
                continue;
            }
            let col = |i: usize| -> String {
                if fields[i] == "null" { String::new() } else { fields[i].to_string() }
            };
            rows.push(LinkRow {
                code: col(0),
                primary_name: col(1),
                secondary_name: col(2),
                y_label: col(3),
                title: col(4),
                secondary_label: col(5),
            });
        }
        Ok(LinkTable { rows })
    }

    /// Loads a table, degrading to an empty one when the file is unreadable.
    /// An empty table simply resolves nothing; it is not a fatal condition.
    pub fn load_or_empty(path: &Path) -> LinkTable {
        match LinkTable::load(path) {
            Ok(table) => table,
            Err(e) => {
                logging::warn(
                    DataSource::Tables,
                    path.to_str(),
                    &format!("link table not readable ({}), resolving against empty table", e),
                );
                LinkTable::default()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Marker prefix for codes that are already dataset names.
pub const LITERAL_MARKER: char = '*';

/// Prefix routing schematic-view codes to the schematic link table.
const SCHEMATIC_PREFIX: &str = "SchVw";

/// Resolves location codes against the two link tables.
pub struct LocationResolver {
    gui_links: LinkTable,
    schematic_links: LinkTable,
}

impl LocationResolver {
    pub fn new(gui_links: LinkTable, schematic_links: LinkTable) -> LocationResolver {
        LocationResolver { gui_links, schematic_links }
    }

    /// Resolves a location code to its label bundle.
    pub fn resolve(&self, code: &str) -> LocationLabels {
        let code = code.trim();

        // Mode 1: literal dataset name or fully qualified record path.
        if code.starts_with(LITERAL_MARKER) {
            return LocationLabels {
                primary_name: code.to_string(),
                title: code.to_string(),
                ..LocationLabels::default()
            };
        }
        if code.starts_with('/') {
            return LocationLabels {
                primary_name: primary_from_record_path(code),
                title: code.to_string(),
                ..LocationLabels::default()
            };
        }

        // Mode 2: suffix match against the link tables. Schematic-view codes
        // use the schematic table and compare case-insensitively; everything
        // else uses the GUI table. First matching row wins.
        if code.starts_with(SCHEMATIC_PREFIX) {
            let upper = code.to_uppercase();
            for row in &self.schematic_links.rows {
                if upper.ends_with(&row.code.to_uppercase()) {
                    return labels_from_row(row);
                }
            }
        } else {
            for row in &self.gui_links.rows {
                if code.ends_with(&row.code) {
                    return labels_from_row(row);
                }
            }
        }

        // Mode 3: no table governs the code; infer a category from its
        // leading characters.
        let category = infer_category(code);
        LocationLabels {
            primary_name: format!("{}/{}", code, category),
            y_label: category.to_string(),
            title: code.to_string(),
            ..LocationLabels::default()
        }
    }
}

/// Rebuilds a dataset name from a fully qualified six-part record path:
/// variable and category, plus the trailing version qualifier.
fn primary_from_record_path(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() > 6 {
        format!("{}/{}/{}", parts[2], parts[3], parts[6])
    } else {
        path.to_string()
    }
}

fn labels_from_row(row: &LinkRow) -> LocationLabels {
    LocationLabels {
        primary_name: row.primary_name.clone(),
        secondary_name: row.secondary_name.clone(),
        y_label: row.y_label.clone(),
        title: row.title.clone(),
        secondary_label: row.secondary_label.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
