use std::fmt::Write as _;
use std::io::Write;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use pcc_peer::CharTally;
use serde::Serialize;

/// How the shutdown report is rendered on stdout.
#[derive(Clone, Debug, Copy, Default, ValueEnum)]
pub enum ReportFormat {
    /// `char '<glyph>' : <count> times`, one line per printable value.
    #[default]
    Text,
    Json,
    Table,
}

#[derive(Serialize)]
struct ReportOutput {
    total: u64,
    counts: Vec<CountOutput>,
}

#[derive(Serialize)]
struct CountOutput {
    value: u8,
    glyph: String,
    count: u32,
}

pub fn render_report(tally: &CharTally, format: ReportFormat) -> String {
    match format {
        ReportFormat::Text => {
            let mut out = String::new();
            for line in tally.iter() {
                let _ = writeln!(out, "{line}");
            }
            out
        }
        ReportFormat::Json => {
            let report = ReportOutput {
                total: tally.total(),
                counts: tally
                    .iter()
                    .map(|c| CountOutput {
                        value: c.byte,
                        glyph: c.glyph().to_string(),
                        count: c.count,
                    })
                    .collect(),
            };
            let mut out = serde_json::to_string(&report).unwrap_or_else(|_| "{}".to_string());
            out.push('\n');
            out
        }
        ReportFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["VALUE", "CHAR", "COUNT"]);
            for c in tally.iter() {
                table.add_row(vec![
                    c.byte.to_string(),
                    format!("'{}'", c.glyph()),
                    c.count.to_string(),
                ]);
            }
            format!("{table}\n")
        }
    }
}

pub fn print_report(tally: &CharTally, format: ReportFormat) {
    let mut out = std::io::stdout().lock();
    let _ = out.write_all(render_report(tally, format).as_bytes());
    let _ = out.flush();
}
