use crate::core::routes::Route;
use crate::core::seed::SeedSummary;
use crate::storage::config::SimulatorConfig;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets};

/// Formatter for the CLI's tables
pub struct TableDisplay {
    max_width: Option<u16>,
    use_colors: bool,
}

impl TableDisplay {
    /// Create a new TableDisplay instance
    pub fn new() -> Self {
        Self {
            max_width: None,
            use_colors: true,
        }
    }

    pub fn with_max_width(mut self, width: u16) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = self.max_width {
            table.set_width(width);
        }
        table
    }

    fn header(&self, titles: &[&str]) -> Vec<Cell> {
        titles
            .iter()
            .map(|title| {
                let cell = Cell::new(title).add_attribute(Attribute::Bold);
                if self.use_colors {
                    cell.fg(Color::Green)
                } else {
                    cell
                }
            })
            .collect()
    }

    /// Route table: method, path pattern, operation and auth requirement.
    /// `prefix` is prepended to every pattern, e.g. `/api/3.19/`.
    pub fn render_routes(&self, routes: &[Route], prefix: &str) -> String {
        if routes.is_empty() {
            return "No routes registered.".to_string();
        }

        let mut table = self.table();
        table.set_header(self.header(&["Method", "Path", "Operation", "Auth"]));

        for route in routes {
            let method = Cell::new(route.method.as_str());
            let method = if self.use_colors {
                method.fg(method_color(route.method.as_str()))
            } else {
                method
            };
            let auth = if route.requires_auth { "token" } else { "-" };
            table.add_row(vec![
                method,
                Cell::new(format!("{}{}", prefix, route.pattern)),
                Cell::new(route.id.to_string()),
                Cell::new(auth),
            ]);
        }

        table.to_string()
    }

    /// Field / value listing of a configuration.
    pub fn render_config(&self, config: &SimulatorConfig) -> String {
        let mut table = self.table();
        table.set_header(self.header(&["Field", "Value"]));

        for field in SimulatorConfig::FIELDS {
            let value = config.get(field).unwrap_or_default();
            let value = if value.is_empty() {
                let cell = Cell::new("(empty)").add_attribute(Attribute::Italic);
                if self.use_colors {
                    cell.fg(Color::DarkGrey)
                } else {
                    cell
                }
            } else {
                Cell::new(value)
            };
            table.add_row(vec![Cell::new(field), value]);
        }

        table.to_string()
    }

    pub fn render_seed_summary(&self, summary: &SeedSummary) -> String {
        let mut table = self.table();
        table.set_header(self.header(&["Content", "Count"]));
        let rows = [
            ("Users", summary.users),
            ("Groups", summary.groups),
            ("Projects", summary.projects),
            ("Workbooks", summary.workbooks),
            ("Views", summary.views),
            ("Data sources", summary.data_sources),
            ("Schedules", summary.schedules),
        ];
        for (label, count) in rows {
            table.add_row(vec![Cell::new(label), Cell::new(count.to_string())]);
        }
        table.to_string()
    }
}

fn method_color(method: &str) -> Color {
    match method {
        "GET" => Color::Cyan,
        "POST" => Color::Green,
        "PUT" => Color::Yellow,
        "DELETE" => Color::Red,
        _ => Color::White,
    }
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}
