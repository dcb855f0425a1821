// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::{column_index, rows_to_dataset, LoadedDataset, TabularSink};
use crate::domain::models::dataset::Dataset;
use crate::domain::models::record::MonitorRecord;
use crate::utils::errors::SinkError;
use crate::utils::text_encoding::{decode_with_candidates, encode_text};
use encoding_rs::{Encoding, UTF_8};
use std::fs;
use std::path::Path;
use tracing::debug;

/// 分隔文本 sink（CSV/TSV）
///
/// 装载时自动探测文本编码并记住，写回时沿用同一编码；
/// 新建文件使用带 BOM 的 UTF-8
pub struct DelimitedSink {
    sep: char,
    encoding: &'static Encoding,
    write_bom: bool,
}

impl DelimitedSink {
    pub fn comma() -> Self {
        Self {
            sep: ',',
            encoding: UTF_8,
            write_bom: true,
        }
    }

    pub fn tab() -> Self {
        Self {
            sep: '\t',
            encoding: UTF_8,
            write_bom: true,
        }
    }

    /// 兜底文件固定使用带 BOM 的 UTF-8 CSV
    pub fn utf8_backup() -> Self {
        Self::comma()
    }

    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }
}

impl TabularSink for DelimitedSink {
    fn load(&mut self, path: &Path) -> Result<LoadedDataset, SinkError> {
        let bytes = fs::read(path)?;
        let sep = self.sep;

        let detected = decode_with_candidates(&bytes, |text| {
            parse_rows(text, sep)
                .first()
                .map(|header| column_index(header, "url").is_some())
                .unwrap_or(false)
        })
        .ok_or_else(|| {
            SinkError::Encoding(format!(
                "无法为 {} 确定含 url 列的文本编码",
                path.display()
            ))
        })?;

        self.encoding = detected.encoding;
        self.write_bom = detected.encoding == UTF_8 && detected.had_bom;
        debug!(
            "detected encoding {} for {}",
            detected.encoding.name(),
            path.display()
        );

        let mut rows = parse_rows(&detected.text, sep).into_iter();
        let header = rows.next().unwrap_or_default();
        rows_to_dataset(&header, rows)
    }

    fn write(&mut self, path: &Path, dataset: &Dataset) -> Result<(), SinkError> {
        let mut text = String::new();
        push_row(
            &mut text,
            &MonitorRecord::COLUMNS.map(str::to_string),
            self.sep,
        );
        for record in dataset.rows() {
            push_row(&mut text, &record.to_row(), self.sep);
        }

        let bytes =
            encode_text(&text, self.encoding, self.write_bom).map_err(SinkError::Encoding)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

/// 引号与 CRLF 容错的最小分隔文本解析
fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == sep && !in_quotes => row.push(std::mem::take(&mut field)),
            '\r' | '\n' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                if row.iter().any(|cell| !cell.is_empty()) {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        if row.iter().any(|cell| !cell.is_empty()) {
            rows.push(row);
        }
    }

    rows
}

fn needs_quotes(cell: &str, sep: char) -> bool {
    cell.contains(sep) || cell.contains('"') || cell.contains('\n') || cell.contains('\r')
}

fn push_row(out: &mut String, row: &[String], sep: char) {
    let mut first = true;
    for cell in row {
        if !first {
            out.push(sep);
        }
        first = false;
        if needs_quotes(cell, sep) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}
