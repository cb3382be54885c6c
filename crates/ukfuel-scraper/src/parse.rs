//! Price table parsing.
//!
//! [`PriceTableParser::parse`] is a pure function of the document, the
//! retrieval time and the parser's configuration: it does no I/O and does not
//! log. Dropped rows are returned inside the snapshot for the caller to report.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html};
use ukfuel_core::{normalize_key, Coordinates, MalformedRowPolicy};

use crate::error::ParseError;
use crate::layout::{Column, TableLayout};
use crate::price::parse_price_cell;
use crate::types::{PriceSnapshot, RetailerRow, RowRejection};

pub struct PriceTableParser {
    layout: TableLayout,
    policy: MalformedRowPolicy,
}

impl Default for PriceTableParser {
    fn default() -> Self {
        Self::new(TableLayout::default(), MalformedRowPolicy::default())
    }
}

impl PriceTableParser {
    #[must_use]
    pub fn new(layout: TableLayout, policy: MalformedRowPolicy) -> Self {
        Self { layout, policy }
    }

    #[must_use]
    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    #[must_use]
    pub fn policy(&self) -> MalformedRowPolicy {
        self.policy
    }

    /// Parses the price table out of a full HTML document.
    ///
    /// # Errors
    ///
    /// - [`ParseError::StructureMismatch`] if the layout path does not lead to
    ///   a `<table>`, or its header row differs from the declared columns.
    /// - [`ParseError::MalformedCell`] for the first unreadable price cell,
    ///   only under [`MalformedRowPolicy::AbortSnapshot`].
    /// - [`ParseError::EmptyTable`] if no data row survived.
    pub fn parse(
        &self,
        html: &str,
        retrieved_at: DateTime<Utc>,
    ) -> Result<PriceSnapshot, ParseError> {
        let document = Html::parse_document(html);
        let table = self
            .layout
            .path
            .locate(&document)
            .map_err(|reason| self.mismatch(reason))?;
        if table.value().name() != "table" {
            return Err(self.mismatch(format!(
                "path ends at <{}>, not <table>",
                table.value().name()
            )));
        }

        let mut rows = table_rows(table).into_iter();
        let header = rows
            .next()
            .ok_or_else(|| self.mismatch("table has no rows".to_string()))?;
        self.validate_header(&cell_texts(header))?;

        let mut parsed = Vec::new();
        let mut skipped = Vec::new();
        let mut seen = HashSet::new();

        for (idx, row) in rows.enumerate() {
            let position = idx + 1;
            match self.parse_row(position, &cell_texts(row)) {
                Ok(row) => {
                    if seen.insert(row.retailer_name.clone()) {
                        parsed.push(row);
                    } else {
                        skipped.push(RowRejection {
                            row: position,
                            retailer: row.display_name,
                            reason: "duplicate retailer".to_string(),
                        });
                    }
                }
                Err(RowFailure::Rejected(rejection)) => skipped.push(rejection),
                Err(RowFailure::Malformed(err)) => match self.policy {
                    MalformedRowPolicy::AbortSnapshot => return Err(err),
                    MalformedRowPolicy::SkipRow => skipped.push(rejection_for(position, &err)),
                },
            }
        }

        if parsed.is_empty() {
            return Err(ParseError::EmptyTable {
                layout: self.layout.version.clone(),
            });
        }

        Ok(PriceSnapshot {
            retrieved_at,
            layout_version: self.layout.version.clone(),
            rows: parsed,
            skipped_rows: skipped,
        })
    }

    fn mismatch(&self, reason: String) -> ParseError {
        ParseError::StructureMismatch {
            layout: self.layout.version.clone(),
            reason,
        }
    }

    fn validate_header(&self, header: &[String]) -> Result<(), ParseError> {
        if header.len() != self.layout.columns.len() {
            return Err(self.mismatch(format!(
                "header has {} columns, expected {} ({})",
                header.len(),
                self.layout.columns.len(),
                header.join(" | ")
            )));
        }
        for (position, (column, text)) in self.layout.columns.iter().zip(header).enumerate() {
            if !column.matches_header(text) {
                return Err(self.mismatch(format!(
                    "header column {} is {text:?}, expected {column}",
                    position + 1
                )));
            }
        }
        Ok(())
    }

    fn parse_row(&self, position: usize, cells: &[String]) -> Result<RetailerRow, RowFailure> {
        let retailer_idx = self
            .layout
            .columns
            .iter()
            .position(|c| *c == Column::Retailer);
        let display_name = retailer_idx
            .and_then(|i| cells.get(i))
            .cloned()
            .unwrap_or_default();

        if cells.len() != self.layout.columns.len() {
            return Err(RowFailure::Rejected(RowRejection {
                row: position,
                retailer: display_name,
                reason: format!(
                    "expected {} cells, found {}",
                    self.layout.columns.len(),
                    cells.len()
                ),
            }));
        }

        let retailer_name = normalize_key(&display_name);
        if retailer_name.is_empty() {
            return Err(RowFailure::Rejected(RowRejection {
                row: position,
                retailer: display_name,
                reason: "empty retailer name".to_string(),
            }));
        }

        let mut prices = BTreeMap::new();
        let mut location = None;
        for (column, text) in self.layout.columns.iter().zip(cells) {
            match column {
                Column::Retailer => {}
                Column::Fuel(id) => {
                    let cell = parse_price_cell(text).map_err(|text| {
                        RowFailure::Malformed(ParseError::MalformedCell {
                            row: position,
                            retailer: display_name.clone(),
                            column: id.clone(),
                            text,
                        })
                    })?;
                    prices.insert(id.clone(), cell);
                }
                Column::Location => location = Coordinates::parse_pair(text),
            }
        }

        Ok(RetailerRow {
            retailer_name,
            display_name,
            location,
            prices,
        })
    }
}

enum RowFailure {
    /// Structurally unusable row; always dropped.
    Rejected(RowRejection),
    /// A price cell could not be read; handled per [`MalformedRowPolicy`].
    Malformed(ParseError),
}

fn rejection_for(position: usize, err: &ParseError) -> RowRejection {
    let retailer = match err {
        ParseError::MalformedCell { retailer, .. } => retailer.clone(),
        _ => String::new(),
    };
    RowRejection {
        row: position,
        retailer,
        reason: err.to_string(),
    }
}

/// `<tr>` elements belonging to this table, in document order, without
/// descending into nested tables.
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|el| el.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

/// Whitespace-collapsed text of each `<th>`/`<td>` in a row.
fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "th" | "td"))
        .map(|cell| {
            let mut text = String::new();
            push_own_text(cell, &mut text);
            text.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .collect()
}

/// Appends the text under `el`, leaving out anything inside a nested table.
fn push_own_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(inner) = ElementRef::wrap(child) {
            if inner.value().name() != "table" {
                push_own_text(inner, out);
            }
        }
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
