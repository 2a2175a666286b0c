use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use nodemgr_client::{Reply, Service};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ReplyOutput<'a> {
    service: &'a str,
    command: &'a str,
    code: u16,
    dirty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Value>,
}

pub fn print_reply(service: Service, command: &str, reply: &Reply, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ReplyOutput {
                service: service.name(),
                command,
                code: reply.code,
                dirty: reply.dirty,
                data: reply.data.as_ref(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            if let Some(data) = &reply.data {
                println!("{}", data_table(data));
            }
            if reply.dirty {
                println!("{service} must be restarted for the change to take effect");
            }
        }
        OutputFormat::Pretty => {
            let data = reply.data.as_ref().map(Value::to_string);
            println!(
                "service={} command={} code={} dirty={} data={}",
                service.name(),
                command,
                reply.code,
                reply.dirty,
                data.as_deref().unwrap_or("-")
            );
        }
        OutputFormat::Raw => {
            if let Some(data) = &reply.data {
                let mut text = scalar(data);
                text.push('\n');
                print_raw(text.as_bytes());
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Objects become KEY/VALUE rows, arrays of objects one row per element,
/// anything else a single VALUE cell.
fn data_table(data: &Value) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    match data {
        Value::Object(fields) => {
            table.set_header(vec!["KEY", "VALUE"]);
            for (key, value) in fields {
                table.add_row(vec![key.clone(), scalar(value)]);
            }
        }
        Value::Array(rows) if rows.iter().all(Value::is_object) && !rows.is_empty() => {
            let mut columns: Vec<&str> = Vec::new();
            for row in rows.iter().filter_map(Value::as_object) {
                for key in row.keys() {
                    if !columns.contains(&key.as_str()) {
                        columns.push(key);
                    }
                }
            }
            table.set_header(columns.iter().map(|c| c.to_uppercase()).collect::<Vec<_>>());
            for row in rows.iter().filter_map(Value::as_object) {
                table.add_row(
                    columns
                        .iter()
                        .map(|c| row.get(*c).map(scalar).unwrap_or_default())
                        .collect::<Vec<_>>(),
                );
            }
        }
        other => {
            table.set_header(vec!["VALUE"]);
            table.add_row(vec![scalar(other)]);
        }
    }
    table
}

/// Strings print without quotes; everything else as compact JSON.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
