//! Boundary to the layout extractor that decomposes a match report into pages,
//! tables and positioned words. The parser only ever sees these traits, so the
//! positional heuristics can be driven by synthetic coordinates.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::report::traits::Row;

/// Bounding box in page coordinates; `top` grows downwards.
#[derive(Debug, Default, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct Region {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub top: f64,
}

#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Table {
    pub bbox: Region,
    pub rows: Vec<Row>,
}

/// The geometry a page exposes: where tables were detected and where words sit.
pub trait PageLayout {
    /// Table regions found independently of cell extraction.
    fn table_regions(&self) -> Vec<Region>;

    fn words(&self) -> Box<dyn Iterator<Item = &Word> + '_>;
}

pub trait Page: PageLayout {
    fn tables(&self) -> &[Table];

    fn text(&self) -> &str;
}

pub trait Document {
    type Page: Page;

    fn pages(&self) -> &[Self::Page];
}

/// A page as serialized by the external layout extractor.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct SnapshotPage {
    #[serde(default)]
    pub tables: Vec<Table>,
    /// Falls back to the table bboxes when the extractor didn't report them.
    #[serde(default)]
    pub regions: Option<Vec<Region>>,
    #[serde(default)]
    pub words: Vec<Word>,
    #[serde(default)]
    pub text: String,
}

impl PageLayout for SnapshotPage {
    fn table_regions(&self) -> Vec<Region> {
        match &self.regions {
            Some(regions) => regions.clone(),
            None => self.tables.iter().map(|t| t.bbox).collect(),
        }
    }

    fn words(&self) -> Box<dyn Iterator<Item = &Word> + '_> {
        Box::new(self.words.iter())
    }
}

impl Page for SnapshotPage {
    fn tables(&self) -> &[Table] {
        &self.tables
    }

    fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub pages: Vec<SnapshotPage>,
}

impl Document for SnapshotDocument {
    type Page = SnapshotPage;

    fn pages(&self) -> &[SnapshotPage] {
        &self.pages
    }
}

pub fn open_document(bytes: &[u8]) -> Result<SnapshotDocument> {
    serde_json::from_slice(bytes).context("Unable to open match report document")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_regions_default_to_table_bboxes() {
        let doc = open_document(
            br#"{"pages": [{"tables": [{"bbox": {"x0": 0, "top": 40, "x1": 10, "bottom": 80},
                                        "rows": [["1", null]]}]}]}"#,
        )
        .unwrap();
        let page = &doc.pages()[0];
        assert_eq!(page.table_regions()[0].top, 40.0);
        assert_eq!(page.tables()[0].rows[0], vec![Some("1".to_string()), None]);
        assert_eq!(page.text(), "");
    }

    #[test]
    fn unreadable_bytes_fail_the_document() {
        assert!(open_document(b"%PDF-1.4 binary").is_err());
    }
}
