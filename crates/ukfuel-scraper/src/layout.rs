//! The expected shape of the published price table.
//!
//! A [`TableLayout`] is a versioned contract: where the table sits in the
//! document (a positional [`TablePath`]) and which columns its header must
//! carry, in order. The parser validates a page against it and fails closed
//! when anything differs, so a redesign of the source page only requires a
//! new layout.

use std::fmt;
use std::str::FromStr;

use scraper::{ElementRef, Html};
use ukfuel_core::{canonical_fuel_type, normalize_key};

use crate::error::LayoutError;

/// Header spellings accepted for the retailer column (normalized form).
const RETAILER_HEADERS: &[&str] = &["retailer", "retailer name", "brand", "company"];

/// Header spellings accepted for a location column (normalized form).
const LOCATION_HEADERS: &[&str] = &[
    "location",
    "coordinates",
    "lat/long",
    "lat, long",
    "latitude, longitude",
];

/// Positional descent used by the gov.uk guidance page.
const GOV_UK_TABLE_PATH: &[(&str, usize)] = &[
    ("html", 1),
    ("body", 1),
    ("div", 3),
    ("main", 1),
    ("div", 4),
    ("div", 1),
    ("div", 1),
    ("div", 2),
    ("div", 1),
    ("table", 1),
];

/// One step of a [`TablePath`]: the `index`-th (1-based) child element named `tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub tag: String,
    pub index: usize,
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.index == 1 {
            write!(f, "{}", self.tag)
        } else {
            write!(f, "{}[{}]", self.tag, self.index)
        }
    }
}

/// An absolute, XPath-like positional path such as `/html/body/div[3]/table`.
///
/// Only element children are counted; text and comments are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePath {
    steps: Vec<PathStep>,
}

impl TablePath {
    /// Walks the document from its root element along the path.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason naming the first step that could not
    /// be resolved.
    pub fn locate<'a>(&self, document: &'a Html) -> Result<ElementRef<'a>, String> {
        let root = document.root_element();
        let mut steps = self.steps.iter();
        let Some(first) = steps.next() else {
            return Err("path has no steps".to_string());
        };
        if first.index != 1 || root.value().name() != first.tag {
            return Err(format!(
                "document root is <{}>, expected /{first}",
                root.value().name()
            ));
        }

        let mut current = root;
        let mut walked = format!("/{first}");
        for step in steps {
            let position = step
                .index
                .checked_sub(1)
                .ok_or_else(|| format!("step {} has index 0", step.tag))?;
            current = current
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|el| el.value().name() == step.tag)
                .nth(position)
                .ok_or_else(|| format!("no {step} under {walked}"))?;
            walked.push('/');
            walked.push_str(&step.to_string());
        }
        Ok(current)
    }
}

impl fmt::Display for TablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "/{step}")?;
        }
        Ok(())
    }
}

impl FromStr for TablePath {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| LayoutError::InvalidPath {
            path: s.to_owned(),
            reason,
        };

        let rest = s
            .trim()
            .strip_prefix('/')
            .ok_or_else(|| invalid("path must be absolute".to_string()))?;

        let steps = rest
            .split('/')
            .map(|segment| {
                let (tag, index) = match segment.split_once('[') {
                    Some((tag, tail)) => {
                        let digits = tail
                            .strip_suffix(']')
                            .ok_or_else(|| invalid(format!("unclosed index in '{segment}'")))?;
                        let index = digits
                            .parse::<usize>()
                            .map_err(|e| invalid(format!("bad index in '{segment}': {e}")))?;
                        (tag, index)
                    }
                    None => (segment, 1),
                };
                if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(invalid(format!("bad element name in '{segment}'")));
                }
                if index == 0 {
                    return Err(invalid(format!("indices are 1-based in '{segment}'")));
                }
                Ok(PathStep {
                    tag: tag.to_ascii_lowercase(),
                    index,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { steps })
    }
}

/// What a header column is expected to hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    Retailer,
    /// A price column for the given canonical fuel-type id.
    Fuel(String),
    /// A `"<lat>, <lon>"` column.
    Location,
}

impl Column {
    /// Whether a header cell's text satisfies this column.
    #[must_use]
    pub fn matches_header(&self, text: &str) -> bool {
        match self {
            Column::Retailer => RETAILER_HEADERS.contains(&normalize_key(text).as_str()),
            Column::Fuel(id) => canonical_fuel_type(text) == *id,
            Column::Location => LOCATION_HEADERS.contains(&normalize_key(text).as_str()),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Retailer => write!(f, "retailer"),
            Column::Fuel(id) => write!(f, "{id}"),
            Column::Location => write!(f, "location"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub version: String,
    pub path: TablePath,
    pub columns: Vec<Column>,
}

impl TableLayout {
    /// Layout of the gov.uk "access fuel price data" guidance page.
    #[must_use]
    pub fn gov_uk_v1() -> Self {
        Self {
            version: "gov-uk/v1".to_string(),
            path: TablePath {
                steps: GOV_UK_TABLE_PATH
                    .iter()
                    .map(|&(tag, index)| PathStep {
                        tag: tag.to_string(),
                        index,
                    })
                    .collect(),
            },
            columns: vec![
                Column::Retailer,
                Column::Fuel("unleaded".to_string()),
                Column::Fuel("super_unleaded".to_string()),
                Column::Fuel("diesel".to_string()),
                Column::Fuel("super_diesel".to_string()),
            ],
        }
    }

    /// Same columns, different location in the page. The version is tagged
    /// so snapshots record that an override was in effect.
    #[must_use]
    pub fn with_path(mut self, path: TablePath) -> Self {
        if path != self.path {
            self.version = format!("{}+path", self.version);
            self.path = path;
        }
        self
    }

    /// Appends a location column after the declared columns.
    #[must_use]
    pub fn with_location_column(mut self) -> Self {
        if !self.columns.contains(&Column::Location) {
            self.version = format!("{}+location", self.version);
            self.columns.push(Column::Location);
        }
        self
    }
}

impl Default for TableLayout {
    fn default() -> Self {
        Self::gov_uk_v1()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gov_uk_path_renders_as_xpath() {
        assert_eq!(
            TableLayout::gov_uk_v1().path.to_string(),
            "/html/body/div[3]/main/div[4]/div/div/div[2]/div/table"
        );
    }

    #[test]
    fn parses_published_xpath() {
        let path: TablePath = "/html/body/div[3]/main/div[4]/div[1]/div/div[2]/div/table"
            .parse()
            .unwrap();
        assert_eq!(path, TableLayout::gov_uk_v1().path);
    }

    #[test]
    fn rejects_relative_path() {
        assert!("html/body/table".parse::<TablePath>().is_err());
    }

    #[test]
    fn rejects_zero_index() {
        let err = "/html/body/div[0]".parse::<TablePath>().unwrap_err();
        assert!(matches!(err, LayoutError::InvalidPath { ref reason, .. } if reason.contains("1-based")));
    }

    #[test]
    fn rejects_unclosed_index_and_empty_segment() {
        assert!("/html/body/div[2".parse::<TablePath>().is_err());
        assert!("/html//table".parse::<TablePath>().is_err());
    }

    #[test]
    fn locate_follows_positional_steps() {
        let doc = Html::parse_document(
            "<html><body><p>x</p><div id=a></div><div id=b><table id=t></table></div></body></html>",
        );
        let path: TablePath = "/html/body/div[2]/table".parse().unwrap();
        let table = path.locate(&doc).unwrap();
        assert_eq!(table.value().id(), Some("t"));
    }

    #[test]
    fn locate_reports_missing_step() {
        let doc = Html::parse_document("<html><body><div></div></body></html>");
        let path: TablePath = "/html/body/div[2]/table".parse().unwrap();
        let reason = path.locate(&doc).unwrap_err();
        assert_eq!(reason, "no div[2] under /html/body");
    }

    #[test]
    fn header_matching_uses_fuel_canonicalization() {
        assert!(Column::Fuel("diesel".into()).matches_header(" Diesel (B7) "));
        assert!(!Column::Fuel("diesel".into()).matches_header("Unleaded"));
        assert!(Column::Retailer.matches_header("RETAILER"));
        assert!(Column::Location.matches_header("Lat/Long"));
    }

    #[test]
    fn with_path_tags_version_only_when_changed() {
        let layout = TableLayout::gov_uk_v1();
        let same = layout.clone().with_path(layout.path.clone());
        assert_eq!(same.version, "gov-uk/v1");
        let moved = layout.with_path("/html/body/table".parse().unwrap());
        assert_eq!(moved.version, "gov-uk/v1+path");
    }
}
