//! Embedded-payload extraction from packaged HTML documents.
//!
//! Every historical generator left a distinct fingerprint in its page
//! source, down to attribute names and quoting — the literals below are
//! the protocol and are matched exactly. The extractors run strictly in
//! order and the first match wins: some generator output would
//! coincidentally satisfy a later, more permissive pattern, so the order
//! is a compatibility contract, not an optimization.
//!
//! The ladder, oldest-compatible first:
//!
//! 1. progressive chunks — repeated headerless base-85 script tags, each
//!    declaring its decoded byte length in a `data-length` attribute
//! 2. typed script stream — repeated header-bearing base-85 script tags
//! 3. single inline header-bearing base-85 assignment
//! 4. single inline data-URI assignment
//! 5. JSON asset manifest mapping entry names to data URIs
//! 6. split manifest: project JSON and asset map as two constants

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::archive::ArchiveView;
use crate::codec::{base85, datauri};
use crate::error::{Result, UnpackageError};
use crate::project::{ProjectType, UnpackagedProject, classify_blob};

static CHUNKED_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script type="p4-project-chunk" data-length="([0-9]+)">(.*?)</script>"#)
        .expect("Invalid regex")
});

static TYPED_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script type="p4-project">(.*?)</script>"#).expect("Invalid regex")
});

static INLINE_BLOB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"var projectData = "([^"]+)";"#).expect("Invalid regex"));

static INLINE_DATA_URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"var projectSource = "(data:[^"]+)";"#).expect("Invalid regex"));

static ASSET_MANIFEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script type="application/json" id="project-data">(.*?)</script>"#)
        .expect("Invalid regex")
});

static SPLIT_PROJECT_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)var projectJson = (\{.*?\});").expect("Invalid regex"));

static SPLIT_ASSET_MAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)var projectAssets = (\{.*?\});").expect("Invalid regex"));

type Extractor = fn(&str) -> Result<Option<UnpackagedProject>>;

/// The detection ladder: independent extractors evaluated in sequence.
const EXTRACTORS: &[(&str, Extractor)] = &[
    ("progressive chunks", extract_chunked),
    ("typed script stream", extract_typed_scripts),
    ("inline base-85 blob", extract_inline_blob),
    ("inline data URI", extract_inline_data_uri),
    ("asset manifest", extract_asset_manifest),
    ("split manifest", extract_split_manifest),
];

/// Run the extraction ladder over a document.
///
/// `Ok(None)` means no pattern matched at all; a pattern that matches but
/// fails to decode is terminal.
pub fn extract(text: &str) -> Result<Option<UnpackagedProject>> {
    for (name, extractor) in EXTRACTORS {
        if let Some(project) = extractor(text)? {
            debug!("recovered project via {name} pattern");
            return Ok(Some(project));
        }
    }
    Ok(None)
}

/// Repeated `<script type="p4-project-chunk" data-length="N">` tags, each
/// carrying a headerless base-85 fragment. Fragments concatenate in
/// document order and the declared lengths sum to the decoded size.
fn extract_chunked(text: &str) -> Result<Option<UnpackagedProject>> {
    let mut matched = false;
    let mut total_len = 0usize;
    let mut payload = String::new();

    for captures in CHUNKED_SCRIPT.captures_iter(text) {
        let (_, [length, fragment]) = captures.extract();
        matched = true;
        total_len += length
            .parse::<usize>()
            .map_err(|_| UnpackageError::InvalidLengthHeader)?;
        payload.push_str(fragment.trim());
    }
    if !matched {
        return Ok(None);
    }
    classify_blob(base85::decode_raw(&payload, total_len)?).map(Some)
}

/// Repeated `<script type="p4-project">` tags carrying one header-bearing
/// base-85 stream; the header sits at the head of the first fragment.
fn extract_typed_scripts(text: &str) -> Result<Option<UnpackagedProject>> {
    let mut matched = false;
    let mut payload = String::new();

    for captures in TYPED_SCRIPT.captures_iter(text) {
        let (_, [fragment]) = captures.extract();
        matched = true;
        payload.push_str(fragment.trim());
    }
    if !matched {
        return Ok(None);
    }
    classify_blob(base85::decode_prefixed(&payload)?).map(Some)
}

/// One `var projectData = "…";` assignment holding a complete
/// header-bearing base-85 blob.
fn extract_inline_blob(text: &str) -> Result<Option<UnpackagedProject>> {
    let Some(captures) = INLINE_BLOB.captures(text) else {
        return Ok(None);
    };
    classify_blob(base85::decode_prefixed(&captures[1])?).map(Some)
}

/// One `var projectSource = "data:…";` assignment.
fn extract_inline_data_uri(text: &str) -> Result<Option<UnpackagedProject>> {
    let Some(captures) = INLINE_DATA_URI.captures(text) else {
        return Ok(None);
    };
    classify_blob(datauri::decode(&captures[1])?).map(Some)
}

/// A JSON object in a `<script type="application/json" id="project-data">`
/// tag mapping entry names to data URIs.
///
/// A `file` key short-circuits to a raw Scratch 1 payload. Otherwise the
/// entries become a fresh sb3 archive, with the `project` key renamed to
/// `project.json` on write.
fn extract_asset_manifest(text: &str) -> Result<Option<UnpackagedProject>> {
    let Some(captures) = ASSET_MANIFEST.captures(text) else {
        return Ok(None);
    };
    let manifest: BTreeMap<String, String> = serde_json::from_str(&captures[1])?;

    if let Some(uri) = manifest.get("file") {
        return Ok(Some(UnpackagedProject {
            project_type: ProjectType::Sb,
            data: datauri::decode(uri)?,
        }));
    }

    let mut view = ArchiveView::new();
    for (name, uri) in &manifest {
        let path = if name == "project" { "project.json" } else { name.as_str() };
        view.insert(path, datauri::decode(uri)?);
    }
    Ok(Some(UnpackagedProject {
        project_type: ProjectType::Sb3,
        data: view.into_zip_bytes()?,
    }))
}

/// The older split form: `var projectJson = {…};` next to
/// `var projectAssets = {…};`.
///
/// The captured project JSON is written verbatim — re-serializing it could
/// perturb bytes the recovery must preserve. Always sb3.
fn extract_split_manifest(text: &str) -> Result<Option<UnpackagedProject>> {
    let Some(project) = SPLIT_PROJECT_JSON.captures(text) else {
        return Ok(None);
    };
    let Some(assets) = SPLIT_ASSET_MAP.captures(text) else {
        return Ok(None);
    };

    let mut view = ArchiveView::new();
    view.insert("project.json", project[1].as_bytes().to_vec());

    let assets: BTreeMap<String, String> = serde_json::from_str(&assets[1])?;
    for (name, uri) in &assets {
        view.insert(name.as_str(), datauri::decode(uri)?);
    }
    Ok(Some(UnpackagedProject {
        project_type: ProjectType::Sb3,
        data: view.into_zip_bytes()?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::prelude::BASE64_STANDARD;
    use std::io::Write;

    /// Inverse of the decoders, for building fixtures.
    fn encode85(data: &[u8], markup_safe: bool) -> String {
        let mut out = String::new();
        for group in data.chunks(4) {
            let mut padded = [0u8; 4];
            padded[..group.len()].copy_from_slice(group);
            let mut value = u64::from(u32::from_le_bytes(padded));
            for _ in 0..5 {
                let digit = (value % 85) as u8;
                value /= 85;
                let code = if markup_safe {
                    match digit + 0x2A {
                        0x3C => 0x28,
                        0x3E => 0x29,
                        code => code,
                    }
                } else {
                    match digit + 0x29 {
                        0x5C => 0x7E,
                        code => code,
                    }
                };
                out.push(char::from(code));
            }
        }
        out
    }

    fn build_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn data_uri(data: &[u8]) -> String {
        format!(
            "data:application/octet-stream;base64,{}",
            BASE64_STANDARD.encode(data)
        )
    }

    #[test]
    fn chunked_scripts_concatenate_in_document_order() {
        let data = build_zip(&[("project.json", br#"{"targets":[]}"#)]);
        // Chunk boundaries fall on whole words, as the generator emitted.
        let split = data.len() / 2 & !3;
        let (head, tail) = data.split_at(split);

        let page = format!(
            "<html><body>\n\
             <script type=\"p4-project-chunk\" data-length=\"{}\">{}</script>\n\
             <script type=\"p4-project-chunk\" data-length=\"{}\">{}</script>\n\
             </body></html>",
            head.len(),
            encode85(head, true),
            tail.len(),
            encode85(tail, true),
        );

        let project = extract(&page).unwrap().unwrap();
        assert_eq!(project.project_type, ProjectType::Sb3);
        assert_eq!(project.data, data);
    }

    #[test]
    fn typed_scripts_share_one_header_bearing_stream() {
        let data = b"not a zip, just raw scratch bytes".to_vec();
        let stream = format!("{},{}", data.len(), encode85(&data, false));
        let (head, tail) = stream.split_at(stream.len() / 2);

        let page = format!(
            "<script type=\"p4-project\">{head}</script>\n\
             <script type=\"p4-project\">{tail}</script>"
        );

        let project = extract(&page).unwrap().unwrap();
        assert_eq!(project.project_type, ProjectType::Sb);
        assert_eq!(project.data, data);
    }

    #[test]
    fn inline_blob_assignment_decodes() {
        let data = b"sixteen byte pay".to_vec();
        let page = format!(
            "<script>var projectData = \"{},{}\";</script>",
            data.len(),
            encode85(&data, false),
        );

        let project = extract(&page).unwrap().unwrap();
        assert_eq!(project.project_type, ProjectType::Sb);
        assert_eq!(project.data, data);
    }

    #[test]
    fn inline_data_uri_assignment_decodes() {
        let data = build_zip(&[("project.json", br#"{"objName":"Stage"}"#)]);
        let page = format!("var projectSource = \"{}\";", data_uri(&data));

        let project = extract(&page).unwrap().unwrap();
        assert_eq!(project.project_type, ProjectType::Sb2);
        assert_eq!(project.data, data);
    }

    #[test]
    fn asset_manifest_with_file_key_is_a_raw_scratch_1_project() {
        let data = b"scratch 1 binary".to_vec();
        let page = format!(
            "<script type=\"application/json\" id=\"project-data\">{{\"file\":\"{}\"}}</script>",
            data_uri(&data),
        );

        let project = extract(&page).unwrap().unwrap();
        assert_eq!(project.project_type, ProjectType::Sb);
        assert_eq!(project.data, data);
    }

    #[test]
    fn asset_manifest_builds_an_sb3_archive() {
        let manifest = format!(
            "{{\"project\":\"{}\",\"a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4.png\":\"{}\"}}",
            data_uri(br#"{"targets":[]}"#),
            data_uri(b"png bytes"),
        );
        let page = format!(
            "<script type=\"application/json\" id=\"project-data\">{manifest}</script>"
        );

        let project = extract(&page).unwrap().unwrap();
        assert_eq!(project.project_type, ProjectType::Sb3);

        let archive = ArchiveView::from_zip_bytes(&project.data).unwrap().unwrap();
        assert_eq!(
            archive.get("project.json"),
            Some(br#"{"targets":[]}"#.as_slice())
        );
        assert_eq!(
            archive.get("a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4.png"),
            Some(b"png bytes".as_slice())
        );
        assert!(archive.get("project").is_none());
    }

    #[test]
    fn split_manifest_preserves_the_project_json_verbatim() {
        let page = format!(
            "var projectJson = {{\"targets\":[],\"meta\":{{\"semver\":\"3.0.0\"}}}};\n\
             var projectAssets = {{\"0.svg\":\"{}\"}};",
            data_uri(b"svg bytes"),
        );

        let project = extract(&page).unwrap().unwrap();
        assert_eq!(project.project_type, ProjectType::Sb3);

        let archive = ArchiveView::from_zip_bytes(&project.data).unwrap().unwrap();
        assert_eq!(
            archive.get("project.json"),
            Some(br#"{"targets":[],"meta":{"semver":"3.0.0"}}"#.as_slice())
        );
        assert_eq!(archive.get("0.svg"), Some(b"svg bytes".as_slice()));
    }

    #[test]
    fn earlier_patterns_shadow_later_ones() {
        let chunk_data = b"chunked payload!".to_vec();
        let page = format!(
            "<script type=\"p4-project-chunk\" data-length=\"{}\">{}</script>\n\
             var projectSource = \"{}\";",
            chunk_data.len(),
            encode85(&chunk_data, true),
            data_uri(b"uri payload"),
        );

        let project = extract(&page).unwrap().unwrap();
        assert_eq!(project.data, chunk_data);
    }

    #[test]
    fn data_uri_without_base64_marker_is_terminal() {
        let page = "var projectSource = \"data:text/plain,plain\";";
        assert!(matches!(
            extract(page),
            Err(UnpackageError::DataUriNotBase64)
        ));
    }

    #[test]
    fn unrelated_documents_match_nothing() {
        assert!(extract("<html><body>hello</body></html>").unwrap().is_none());
    }
}
