//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, Write};

use tabled::{Table, Tabled, settings::Style};

use hue_core::Resource;

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Resource rows ────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct ResourceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    rtype: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "On")]
    on: String,
    #[tabled(rename = "Brightness")]
    brightness: String,
    #[tabled(rename = "Color (xy)")]
    color: String,
}

impl From<&Resource> for ResourceRow {
    fn from(r: &Resource) -> Self {
        Self {
            id: r.id.clone(),
            rtype: r.resource_type.clone(),
            name: r.name().unwrap_or_default().to_owned(),
            on: r
                .is_on()
                .map(|on| if on { "on" } else { "off" }.to_owned())
                .unwrap_or_default(),
            brightness: r
                .dimming
                .as_ref()
                .map(|d| format!("{:.0}%", d.brightness))
                .unwrap_or_default(),
            color: r
                .color
                .as_ref()
                .and_then(|c| c.xy.as_ref())
                .map(|xy| format!("{:.4}, {:.4}", xy.x, xy.y))
                .unwrap_or_default(),
        }
    }
}

/// Key/value detail view of one resource.
pub fn resource_detail(r: &Resource) -> String {
    let row = ResourceRow::from(r);
    let mut lines = vec![
        format!("ID:          {}", row.id),
        format!("Type:        {}", row.rtype),
    ];
    if let Some(name) = r.name() {
        lines.push(format!("Name:        {name}"));
    }
    if let Some(owner) = &r.owner {
        lines.push(format!("Owner:       {} ({})", owner.rid, owner.rtype));
    }
    if !row.on.is_empty() {
        lines.push(format!("On:          {}", row.on));
    }
    if !row.brightness.is_empty() {
        lines.push(format!("Brightness:  {}", row.brightness));
    }
    if !row.color.is_empty() {
        lines.push(format!("Color (xy):  {}", row.color));
    }
    if let Some(d) = &r.dynamics {
        lines.push(format!("Transition:  {} ms", d.duration));
    }
    lines.join("\n")
}

/// One-line summary used by `watch`.
pub fn resource_line(r: &Resource) -> String {
    let row = ResourceRow::from(r);
    let mut line = format!("{} {}", row.id, row.rtype);
    for (label, value) in [
        ("name", row.name),
        ("on", row.on),
        ("bri", row.brightness),
        ("xy", row.color),
    ] {
        if !value.is_empty() {
            line.push_str(&format!(" {label}={value}"));
        }
    }
    line
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views are
/// key/value rather than tabular.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Render one streamed item: JSON formats emit one compact line per item.
pub fn render_event(format: OutputFormat, r: &Resource) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(resource_line(r)),
        OutputFormat::Json | OutputFormat::JsonCompact => render_json(r, true),
        OutputFormat::Yaml => Ok(format!("---\n{}", render_yaml(r)?.trim_end())),
        OutputFormat::Plain => Ok(r.id.clone()),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
    let _ = stdout.flush();
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(out)
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Validation {
        field: "output".into(),
        reason: format!("YAML serialization failed: {e}"),
    })
}
