//! Project formats and type classification.
//!
//! Two classifiers live here, one per situation:
//!
//! - [`extract_project_folder`] works on an archive folder that holds a
//!   `project.json` it must not parse. Asset file names are the only
//!   available signal: sb3 stores assets under their md5 hash, sb2 under
//!   small integer ids.
//! - [`classify_blob`] works on a finished binary payload recovered from
//!   some wrapper. There the manifest is read directly and discriminated
//!   by its top-level keys.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::archive::ArchiveView;
use crate::error::{Result, UnpackageError};

/// sb3 asset names: a 32-character lowercase md5 hash plus a 3-character
/// extension.
static SB3_ASSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{32}\.[a-z0-9]{3}$").expect("Invalid regex"));

/// sb2 asset names: a decimal id plus a 3-character extension.
static SB2_ASSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[a-z0-9]{3}$").expect("Invalid regex"));

/// Generations of the Scratch project archive format.
///
/// `sb` is a flat binary; `sb2` and `sb3` are zip archives carrying a
/// `project.json` manifest plus asset files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    Sb,
    Sb2,
    Sb3,
}

impl ProjectType {
    /// Canonical file extension for the format.
    pub fn extension(self) -> &'static str {
        match self {
            ProjectType::Sb => "sb",
            ProjectType::Sb2 => "sb2",
            ProjectType::Sb3 => "sb3",
        }
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// The recovered project: a format tag plus its binary payload.
///
/// For `sb` the payload is the raw Scratch 1 binary; for `sb2`/`sb3` it is
/// zip bytes containing `project.json` and the format's assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackagedProject {
    pub project_type: ProjectType,
    pub data: Vec<u8>,
}

/// Rebuild a project archive from the folder that holds `project.json`.
///
/// Entries matching neither asset shape are dropped — several generators
/// bundle readmes, icons or settings next to the real project. The format
/// is then decided purely by the asset census: sb2 only when sb2-shaped
/// assets appear alone. Mixed and empty censuses resolve to the far more
/// common sb3; this bias is inherited behavior, kept as-is because no
/// stronger signal is available without parsing the manifest.
pub fn extract_project_folder(mut view: ArchiveView) -> Result<UnpackagedProject> {
    let mut sb2_assets = 0usize;
    let mut sb3_assets = 0usize;

    let paths: Vec<String> = view.paths().map(str::to_string).collect();
    for path in paths {
        if path == "project.json" {
            continue;
        }
        if SB3_ASSET.is_match(&path) {
            sb3_assets += 1;
        } else if SB2_ASSET.is_match(&path) {
            sb2_assets += 1;
        } else {
            view.remove(&path);
        }
    }
    debug!("asset census: {sb2_assets} sb2-shaped, {sb3_assets} sb3-shaped");

    let project_type = if sb2_assets > 0 && sb3_assets == 0 {
        ProjectType::Sb2
    } else {
        ProjectType::Sb3
    };
    Ok(UnpackagedProject {
        project_type,
        data: view.into_zip_bytes()?,
    })
}

/// Tag a finished binary payload whose format is not yet known.
///
/// A payload that opens as a zip is discriminated by its manifest: a
/// `targets` key marks sb3, an `objName` key marks sb2. Anything that does
/// not open as a zip is taken to be a raw Scratch 1 project. The payload
/// is returned unchanged either way — it is already a complete project.
pub fn classify_blob(data: Vec<u8>) -> Result<UnpackagedProject> {
    let Some(view) = ArchiveView::from_zip_bytes(&data)? else {
        debug!("payload is not a zip, assuming a raw Scratch 1 project");
        return Ok(UnpackagedProject {
            project_type: ProjectType::Sb,
            data,
        });
    };

    let manifest = view
        .find("project.json")
        .and_then(|path| view.get(path))
        .ok_or(UnpackageError::ZipMissingProject)?;
    let manifest: serde_json::Value = serde_json::from_slice(manifest)?;

    let project_type = if manifest.get("targets").is_some() {
        ProjectType::Sb3
    } else if manifest.get("objName").is_some() {
        ProjectType::Sb2
    } else {
        return Err(UnpackageError::UnknownProjectType);
    };
    Ok(UnpackagedProject { project_type, data })
}
