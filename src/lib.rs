//! # sbunpack
//!
//! Recover the original Scratch project from a "packaged" artifact.
//!
//! Packaging tools wrap a project into a standalone zip, executable or
//! HTML page, and each tool changed its embedding scheme across releases:
//! nested zips, four incompatible base-85 text codecs, base64 data URIs
//! and inline JSON manifests. This library sniffs which historical scheme
//! produced an artifact and inverts it losslessly, returning the original
//! `sb`, `sb2` or `sb3` project bytes.
//!
//! ## Features
//!
//! - Zip artifacts: `project.json` folders at any nesting depth, plus
//!   whole projects nested as `project.zip`/`project` blobs
//! - Six historical HTML embedding patterns, tried in compatibility order
//! - All four legacy base-85 variants and base64 data URIs
//! - Deterministic archive rebuilds (sorted entries, fixed timestamps)
//! - Async artifact fetch from local files or HTTP URLs for the CLI
//!
//! ## Example
//!
//! ```no_run
//! fn main() -> anyhow::Result<()> {
//!     let artifact = std::fs::read("packaged-game.html")?;
//!     let project = sbunpack::unpackage(&artifact)?;
//!     let name = format!("project.{}", project.project_type.extension());
//!     std::fs::write(name, project.data)?;
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod codec;
pub mod error;
pub mod html;
pub mod io;
pub mod project;
pub mod unpackage;

pub use archive::ArchiveView;
pub use cli::Cli;
pub use error::UnpackageError;
pub use io::{FetchSource, HttpSource, LocalFileSource};
pub use project::{ProjectType, UnpackagedProject};
pub use unpackage::unpackage;
