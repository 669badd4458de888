use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ToolError};

/// Header names recognised in the first sheet of a course workbook.
pub mod columns {
    pub const SUBMODULE_TITLE: &str = "Submodule Title";
    pub const SECTION_TITLE: &str = "Section Title";
    pub const SECTION_CONTENT: &str = "Section Content";
    pub const VIDEO_LINK: &str = "Video Link";
    pub const SECTION_TIME: &str = "Section Time (minutes)";
    pub const EXAMPLE: &str = "Example";
    pub const IMAGE_LINK: &str = "Image Link";

    /// Canonical column order used when writing a course template.
    pub const ALL: [&str; 7] = [
        SUBMODULE_TITLE,
        SECTION_TITLE,
        SECTION_CONTENT,
        VIDEO_LINK,
        SECTION_TIME,
        EXAMPLE,
        IMAGE_LINK,
    ];
}

pub const DEFAULT_CONTENT: &str = "No content available";
pub const DEFAULT_EXAMPLE: &str = "No example provided";
pub const DEFAULT_IMAGE: &str = "No image provided";

/// A single non-empty spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Renders the cell the way it reads in the sheet. Whole numbers print
    /// without a fractional part.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(value) => value.clone(),
            CellValue::Number(value) => value.to_string(),
            CellValue::Bool(value) => value.to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// One decoded spreadsheet row: header text → cell value. Empty cells are
/// absent from the mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
    cells: BTreeMap<String, CellValue>,
}

impl RowRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from `(header, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<CellValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let cells = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self { cells }
    }

    pub fn insert(&mut self, header: impl Into<String>, value: CellValue) {
        self.cells.insert(header.into(), value);
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells.get(header)
    }

    /// Returns the cell as text unless it is missing or blank.
    pub fn text(&self, header: &str) -> Option<String> {
        self.raw_text(header).filter(|value| !value.trim().is_empty())
    }

    /// Returns the cell as text exactly as written, whitespace included.
    pub fn raw_text(&self, header: &str) -> Option<String> {
        self.get(header).map(CellValue::as_text)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }
}

/// Leaf content unit, one per qualifying row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub title: String,
    pub content: String,
    pub video_link: String,
    pub example: String,
    pub image: String,
    /// Duration in minutes.
    pub time: u32,
}

/// A named group of sections. Totals are maintained by
/// [`Submodule::push_section`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submodule {
    pub title: String,
    pub total_sections: usize,
    pub total_time: u64,
    pub sections: Vec<Section>,
}

impl Submodule {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            total_sections: 0,
            total_time: 0,
            sections: Vec::new(),
        }
    }

    pub fn push_section(&mut self, section: Section) {
        self.total_sections += 1;
        self.total_time += u64::from(section.time);
        self.sections.push(section);
    }
}

/// The course document, the unit of persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub module_id: String,
    pub title: String,
    pub description: String,
    pub banner_image: String,
    pub total_submodules: usize,
    pub total_time: u64,
    pub submodules: Vec<Submodule>,
}

impl Module {
    /// Creates an empty module for the given identifier and course metadata.
    pub fn new(module_id: impl Into<String>, metadata: &CourseMetadata) -> Self {
        Self {
            module_id: module_id.into(),
            title: metadata.title.clone(),
            description: metadata.description.clone(),
            banner_image: metadata.banner_image.clone(),
            total_submodules: 0,
            total_time: 0,
            submodules: Vec::new(),
        }
    }

    /// Number of sections across every submodule.
    pub fn section_count(&self) -> usize {
        self.submodules
            .iter()
            .map(|submodule| submodule.sections.len())
            .sum()
    }
}

/// A module as held by a store, tagged with the store-assigned identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredModule {
    pub id: Uuid,
    #[serde(flatten)]
    pub module: Module,
}

/// Course-level metadata that has passed presence validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseMetadata {
    pub title: String,
    pub description: String,
    pub banner_image: String,
}

/// Raw inputs of a "submit course" request, before validation.
#[derive(Debug, Clone, Default)]
pub struct CourseUpload {
    pub payload: Option<Vec<u8>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub banner_image: Option<String>,
}

impl CourseUpload {
    /// Checks that the payload and every metadata field are present, in the
    /// order the upload endpoint always reported them. Text values are
    /// trimmed; whitespace-only values count as missing.
    pub fn validate(self) -> Result<(CourseMetadata, Vec<u8>)> {
        let payload = match self.payload {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return Err(ToolError::Validation("No file uploaded.".into())),
        };

        let title = present(self.title);
        let description = present(self.description);
        let (Some(title), Some(description)) = (title, description) else {
            return Err(ToolError::Validation(
                "Course title and description are required.".into(),
            ));
        };

        let Some(banner_image) = present(self.banner_image) else {
            return Err(ToolError::Validation("Banner image is required.".into()));
        };

        Ok((
            CourseMetadata {
                title,
                description,
                banner_image,
            },
            payload,
        ))
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Totals reported back after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleTotals {
    pub title: String,
    pub total_submodules: usize,
    pub total_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionSummary {
    pub message: String,
    pub module: ModuleTotals,
}

impl From<&StoredModule> for SubmissionSummary {
    fn from(stored: &StoredModule) -> Self {
        Self {
            message: "File uploaded and data saved successfully.".into(),
            module: ModuleTotals {
                title: stored.module.title.clone(),
                total_submodules: stored.module.total_submodules,
                total_time: stored.module.total_time,
            },
        }
    }
}

/// Listing projection of a stored module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub title: String,
    pub id: Uuid,
    pub description: String,
    pub chapters: usize,
    pub time: u64,
    pub image: String,
}

impl From<&StoredModule> for CourseSummary {
    fn from(stored: &StoredModule) -> Self {
        Self {
            title: stored.module.title.clone(),
            id: stored.id,
            description: stored.module.description.clone(),
            chapters: stored.module.total_submodules,
            time: stored.module.total_time,
            image: stored.module.banner_image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseListing {
    pub message: String,
    pub courses: Vec<CourseSummary>,
}

impl CourseListing {
    pub fn new(courses: Vec<CourseSummary>) -> Self {
        Self {
            message: "Course details fetched successfully.".into(),
            courses,
        }
    }
}
