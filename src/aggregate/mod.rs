//! Turns decoded spreadsheet rows into a nested [`Module`] document.
//!
//! Aggregation is a two-stage pipeline: [`filter_rows`] separates rows that
//! carry both mandatory titles from those that do not, then the grouping fold
//! appends every accepted section to its submodule while keeping the running
//! totals of both levels in step.

use std::collections::HashMap;

use tracing::{debug, instrument, warn};

use crate::model::{
    CellValue, CourseMetadata, DEFAULT_CONTENT, DEFAULT_EXAMPLE, DEFAULT_IMAGE, Module, RowRecord,
    Section, Submodule, columns,
};

/// Outcome of aggregating one upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub module: Module,
    pub skipped_rows: Vec<SkippedRow>,
}

/// A row left out of the module because a mandatory title is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based position in the decoded row sequence.
    pub position: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingSubmoduleTitle,
    MissingSectionTitle,
}

/// A row that passed filtering, ready to be grouped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRow {
    pub submodule_title: String,
    pub section: Section,
}

/// Derives the storage key of a course: the lowercased title with every run
/// of whitespace replaced by a single hyphen.
///
/// Titles differing only in case or whitespace map to the same key.
pub fn derive_module_id(title: &str) -> String {
    let mut id = String::with_capacity(title.len());
    let mut in_whitespace = false;

    for ch in title.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                id.push('-');
                in_whitespace = true;
            }
        } else {
            in_whitespace = false;
            id.extend(ch.to_lowercase());
        }
    }

    id
}

/// Builds the module document for `metadata` out of `rows`.
#[instrument(level = "debug", skip_all, fields(title = %metadata.title, rows = rows.len()))]
pub fn build_module(metadata: &CourseMetadata, rows: &[RowRecord]) -> Aggregation {
    let mut module = Module::new(derive_module_id(&metadata.title), metadata);
    let (accepted, skipped_rows) = filter_rows(rows);
    group_sections(&mut module, accepted);

    debug!(
        module_id = %module.module_id,
        submodules = module.total_submodules,
        sections = module.section_count(),
        skipped = skipped_rows.len(),
        total_time = module.total_time,
        "module aggregated"
    );

    Aggregation {
        module,
        skipped_rows,
    }
}

/// Splits `rows` into sections ready for grouping and the rows that lack a
/// submodule or section title. Input order is preserved on both sides.
pub fn filter_rows(rows: &[RowRecord]) -> (Vec<SectionRow>, Vec<SkippedRow>) {
    let mut accepted = Vec::with_capacity(rows.len());
    let mut skipped = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let position = index + 1;
        match section_row(row, position) {
            Ok(section_row) => accepted.push(section_row),
            Err(reason) => {
                warn!(position, ?reason, ?row, "skipping row with missing mandatory fields");
                skipped.push(SkippedRow { position, reason });
            }
        }
    }

    (accepted, skipped)
}

fn section_row(row: &RowRecord, position: usize) -> Result<SectionRow, SkipReason> {
    let submodule_title = row
        .text(columns::SUBMODULE_TITLE)
        .ok_or(SkipReason::MissingSubmoduleTitle)?;
    let title = row
        .text(columns::SECTION_TITLE)
        .ok_or(SkipReason::MissingSectionTitle)?;

    let raw_minutes = leading_integer(row.get(columns::SECTION_TIME));
    if matches!(raw_minutes, Some(minutes) if minutes < 0) {
        warn!(position, ?raw_minutes, "negative section time clamped to zero");
    }

    Ok(SectionRow {
        submodule_title: submodule_title.trim().to_string(),
        section: Section {
            title: title.trim().to_string(),
            content: row
                .raw_text(columns::SECTION_CONTENT)
                .unwrap_or_else(|| DEFAULT_CONTENT.to_string()),
            video_link: row.raw_text(columns::VIDEO_LINK).unwrap_or_default(),
            example: row
                .raw_text(columns::EXAMPLE)
                .unwrap_or_else(|| DEFAULT_EXAMPLE.to_string()),
            image: row
                .raw_text(columns::IMAGE_LINK)
                .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            time: clamp_minutes(raw_minutes.unwrap_or(0)),
        },
    })
}

fn group_sections(module: &mut Module, rows: Vec<SectionRow>) {
    // Side index into the append-only `module.submodules`.
    let mut positions: HashMap<String, usize> = HashMap::new();

    for SectionRow {
        submodule_title,
        section,
    } in rows
    {
        let submodules = &mut module.submodules;
        let position = *positions
            .entry(submodule_title)
            .or_insert_with_key(|title| {
                submodules.push(Submodule::new(title.clone()));
                submodules.len() - 1
            });

        module.total_time += u64::from(section.time);
        module.submodules[position].push_section(section);
    }

    module.total_submodules = module.submodules.len();
}

/// Reads a section duration in whole minutes. Missing, non-numeric, and
/// negative values yield 0.
pub fn parse_minutes(cell: Option<&CellValue>) -> u32 {
    clamp_minutes(leading_integer(cell).unwrap_or(0))
}

fn clamp_minutes(minutes: i64) -> u32 {
    u32::try_from(minutes.max(0)).unwrap_or(u32::MAX)
}

/// Integer value of a cell: numbers truncate toward zero, text contributes
/// its leading optionally-signed run of digits.
fn leading_integer(cell: Option<&CellValue>) -> Option<i64> {
    match cell? {
        CellValue::Number(value) if value.is_finite() => Some(value.trunc() as i64),
        CellValue::Number(_) | CellValue::Bool(_) => None,
        CellValue::Text(text) => {
            let text = text.trim_start();
            let (negative, digits) = match text.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, text.strip_prefix('+').unwrap_or(text)),
            };

            let mut value: Option<i64> = None;
            for digit in digits.chars().map_while(|ch| ch.to_digit(10)) {
                let current = value.unwrap_or(0);
                value = Some(current.saturating_mul(10).saturating_add(i64::from(digit)));
            }

            value.map(|value| if negative { -value } else { value })
        }
    }
}
