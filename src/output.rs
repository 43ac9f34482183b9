//! Output formatting: table, JSON, YAML, plain.
//!
//! Tables take their columns from the resource registry. Structured formats
//! serialize the remote representation as the API returned it.

use crate::cli::OutputFormat;
use crate::resource::fields::{display_value, row};
use crate::resource::{Resource, ResourceKind};
use anyhow::Result;
use std::io::{self, Write};
use tabled::builder::Builder;
use tabled::settings::Style;

/// Render a collection of resources of one kind
pub fn render_list(format: OutputFormat, kind: ResourceKind, resources: &[Resource]) -> Result<String> {
    match format {
        OutputFormat::Table => {
            let columns = kind.columns();
            let mut builder = Builder::default();
            builder.push_record(columns.iter().map(|c| c.header.clone()));
            for resource in resources {
                builder.push_record(row(resource, columns));
            }
            Ok(finish(builder))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(resources)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(resources)?),
        OutputFormat::Plain => Ok(plain(resources)),
    }
}

/// Render resources one vertical field/value table each
pub fn render_detail(format: OutputFormat, kind: ResourceKind, resources: &[Resource]) -> Result<String> {
    if format != OutputFormat::Table {
        return render_list(format, kind, resources);
    }

    let tables: Vec<String> = resources
        .iter()
        .map(|resource| {
            let mut builder = Builder::default();
            for column in kind.columns() {
                builder.push_record([
                    column.header.clone(),
                    display_value(resource, &column.json_path),
                ]);
            }
            finish(builder)
        })
        .collect();

    Ok(tables.join("\n\n"))
}

/// Print the rendered output to stdout
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

fn finish(builder: Builder) -> String {
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn plain(resources: &[Resource]) -> String {
    resources
        .iter()
        .map(|r| r.id())
        .collect::<Vec<_>>()
        .join("\n")
}
