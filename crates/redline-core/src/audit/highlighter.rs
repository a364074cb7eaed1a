//! Change log → per-cell markers and styles.
//!
//! Untouched cells get the base snapshot's style template for their column
//! (its `style_templates`, else the styles of its first non-blank row).
//! Marked cells keep the template and take the marker fill. Rows left fully
//! blank get nothing.

use crate::config::AuditConfig;
use crate::merge::{ChangeKind, MergeOutcome, RowOrigin};
use crate::model::{CellFormat, CellFormats, CellStyle, Marker, Snapshot};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MarkerCounts {
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl MarkerCounts {
    pub fn total(&self) -> usize {
        self.added + self.updated + self.deleted
    }

    fn bump(&mut self, marker: Marker) {
        match marker {
            Marker::Added => self.added += 1,
            Marker::Updated => self.updated += 1,
            Marker::Deleted => self.deleted += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightResult {
    /// Parallel to the merged rows
    pub cell_formats: Vec<CellFormats>,
    pub counts: MarkerCounts,
}

#[derive(Debug, Clone)]
pub struct AuditHighlighter {
    added_fill: String,
    updated_fill: String,
    deleted_fill: String,
}

impl Default for AuditHighlighter {
    fn default() -> Self {
        Self::new(&AuditConfig::default())
    }
}

impl AuditHighlighter {
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            added_fill: config.added_fill.clone(),
            updated_fill: config.updated_fill.clone(),
            deleted_fill: config.deleted_fill.clone(),
        }
    }

    pub fn fill_for(&self, marker: Marker) -> &str {
        match marker {
            Marker::Added => &self.added_fill,
            Marker::Updated => &self.updated_fill,
            Marker::Deleted => &self.deleted_fill,
        }
    }

    pub fn highlight(&self, base: &Snapshot, outcome: &MergeOutcome) -> HighlightResult {
        let templates = style_templates(base);
        let mut counts = MarkerCounts::default();

        let cell_formats = outcome
            .rows
            .iter()
            .zip(&outcome.origins)
            .map(|(row, origin)| {
                if Snapshot::is_blank_row(row) {
                    return CellFormats::new();
                }
                let mut formats = CellFormats::new();
                for column in &outcome.columns {
                    let marker = marker_for(outcome, *origin, column);
                    let mut style = templates.get(column).cloned();
                    if let Some(marker) = marker {
                        style = Some(style.unwrap_or_default().with_fill(self.fill_for(marker)));
                        counts.bump(marker);
                    }
                    if marker.is_some() || style.is_some() {
                        formats.insert(column.clone(), CellFormat { marker, style });
                    }
                }
                formats
            })
            .collect();

        HighlightResult {
            cell_formats,
            counts,
        }
    }
}

fn marker_for(outcome: &MergeOutcome, origin: RowOrigin, column: &str) -> Option<Marker> {
    if origin.is_new() {
        return Some(Marker::Added);
    }
    outcome.log.kind(origin, column).map(|kind| match kind {
        ChangeKind::Added => Marker::Added,
        ChangeKind::Updated => Marker::Updated,
        ChangeKind::Cleared => Marker::Deleted,
    })
}

/// Per-column style borrowed from a representative base row.
///
/// Fills that came from an audit marker are dropped so markers never leak
/// into the next version's untouched cells.
pub fn style_templates(base: &Snapshot) -> BTreeMap<String, CellStyle> {
    if !base.format.style_templates.is_empty() {
        return base.format.style_templates.clone();
    }
    let Some(index) = base.rows.iter().position(|r| !Snapshot::is_blank_row(r)) else {
        return BTreeMap::new();
    };
    let Some(formats) = base.cell_formats.get(index) else {
        return BTreeMap::new();
    };
    formats
        .iter()
        .filter_map(|(column, format)| {
            let mut style = format.style.clone()?;
            if format.marker.is_some() {
                style.fill = None;
            }
            Some((column.clone(), style))
        })
        .collect()
}
