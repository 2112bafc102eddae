//! Top-level artifact dispatch.
//!
//! Routing is a cascade of cheap probes: a magic-prefix check for already
//! raw Scratch 1 binaries, a zip probe for executable/zip packagers, and
//! finally the HTML extraction ladder for everything text-shaped.

use tracing::debug;

use crate::archive::ArchiveView;
use crate::error::{Result, UnpackageError};
use crate::html;
use crate::project::{ProjectType, UnpackagedProject, classify_blob, extract_project_folder};

/// Magic prefix shared by raw Scratch 1 binaries (`ScratchV01`,
/// `ScratchV02`).
const SCRATCH1_MAGIC: &[u8] = b"ScratchV0";

/// Names an executable packager may nest the whole project under, in
/// lookup priority order.
const NESTED_PROJECT_NAMES: [&str; 2] = ["project.zip", "project"];

/// Recover the original project from a packaging artifact.
///
/// The artifact may be a zip produced by an executable or zip packager
/// (with the project stored as a folder around `project.json` or nested
/// whole as `project.zip`/`project`), an HTML page with the project
/// embedded as text, or an already raw Scratch 1 binary.
///
/// # Errors
///
/// Every failure is terminal and labeled: see [`UnpackageError`]. A zip
/// without a recognizable project fails with
/// [`UnpackageError::ZipMissingProject`]; a text input matching no
/// embedding pattern fails with [`UnpackageError::NoProjectFound`].
pub fn unpackage(artifact: &[u8]) -> Result<UnpackagedProject> {
    if artifact.starts_with(SCRATCH1_MAGIC) {
        debug!("input already is a raw Scratch 1 project");
        return Ok(UnpackagedProject {
            project_type: ProjectType::Sb,
            data: artifact.to_vec(),
        });
    }

    if let Some(view) = ArchiveView::from_zip_bytes(artifact)? {
        debug!("input is a zip archive with {} entries", view.len());
        return unpackage_zip(view);
    }

    debug!("input is not a zip archive, scanning it as text");
    let text = std::str::from_utf8(artifact)?;
    html::extract(text)?.ok_or(UnpackageError::NoProjectFound)
}

fn unpackage_zip(mut view: ArchiveView) -> Result<UnpackagedProject> {
    if let Some(path) = view.find("project.json").map(str::to_string) {
        debug!("found project manifest at {path}");
        return extract_project_folder(view.into_folder_of(&path));
    }

    for name in NESTED_PROJECT_NAMES {
        let Some(path) = view.find(name).map(str::to_string) else {
            continue;
        };
        let Some(data) = view.remove(&path) else {
            continue;
        };
        debug!("found nested project blob at {path}");
        return classify_blob(data);
    }

    Err(UnpackageError::ZipMissingProject)
}
