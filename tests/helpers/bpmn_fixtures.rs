//! Fixture documents under `tests/fixtures`.

use std::path::{Path, PathBuf};

use bpmn_xml::{BpmnModel, BpmnXmlConverter};
use walkdir::WalkDir;

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

/// Every `.bpmn` file under the fixtures directory, sorted.
pub fn all_fixtures() -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(fixtures_dir())
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "bpmn"))
        .collect();
    files.sort();
    files
}

pub fn fixture_bytes(name: &str) -> Vec<u8> {
    let path = fixtures_dir().join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

pub fn parse_fixture(name: &str) -> BpmnModel {
    BpmnXmlConverter::default()
        .parse_bytes(&fixture_bytes(name))
        .unwrap_or_else(|e| panic!("cannot parse {name}: {e}"))
}

pub fn write_text(converter: &BpmnXmlConverter, model: &BpmnModel) -> String {
    String::from_utf8(converter.write(model).unwrap()).unwrap()
}
