use std::path::Path;

use tracing::{info, instrument, warn};

use crate::aggregate::build_module;
use crate::error::{Result, ToolError};
use crate::io::excel_read;
use crate::model::{CourseListing, CourseSummary, CourseUpload, SubmissionSummary};
use crate::store::ModuleStore;

/// Validates, decodes, aggregates, and stores one course upload.
///
/// The stored document under the derived module identifier is replaced as a
/// whole. A different title that normalises to the same identifier replaces
/// the earlier course; the overwrite is logged.
#[instrument(level = "info", skip_all, fields(title = upload.title.as_deref().unwrap_or_default()))]
pub fn submit_course<S>(store: &mut S, upload: CourseUpload) -> Result<SubmissionSummary>
where
    S: ModuleStore + ?Sized,
{
    let (metadata, payload) = upload.validate()?;

    let rows = excel_read::decode_rows(&payload)?;
    info!(row_count = rows.len(), "decoded upload");

    let aggregation = build_module(&metadata, &rows);
    if !aggregation.skipped_rows.is_empty() {
        warn!(
            skipped = aggregation.skipped_rows.len(),
            "rows without submodule or section title were ignored"
        );
    }

    let module_id = aggregation.module.module_id.clone();
    if let Some(existing) = store.find_by_key(&module_id)? {
        if existing.module.title != metadata.title {
            warn!(
                module_id = %module_id,
                previous_title = %existing.module.title,
                "module identifier collision, replacing course with a different title"
            );
        } else {
            info!(module_id = %module_id, "replacing existing course");
        }
    }

    let stored = store.upsert_by_key(&module_id, aggregation.module)?;
    info!(
        module_id = %stored.module.module_id,
        id = %stored.id,
        submodules = stored.module.total_submodules,
        total_time = stored.module.total_time,
        "course stored"
    );

    Ok(SubmissionSummary::from(&stored))
}

/// Projects every stored course into a listing summary.
#[instrument(level = "info", skip_all)]
pub fn list_courses<S>(store: &S) -> Result<CourseListing>
where
    S: ModuleStore + ?Sized,
{
    let courses: Vec<CourseSummary> = store
        .find_all()?
        .iter()
        .map(CourseSummary::from)
        .collect();
    info!(course_count = courses.len(), "listed courses");
    Ok(CourseListing::new(courses))
}

/// Reads an upload payload from disk.
pub fn read_payload(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    Ok(std::fs::read(path)?)
}
