#![forbid(unsafe_code)]

pub mod map;
pub mod text;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use transflow_api::TransportReport;
use transflow_core::instance::Instance;

pub use map::{write_residual_map, write_route_map};
pub use text::{
    format_general, write_counts, write_distance_section, write_flow_section, write_matrix,
    write_summary,
};

pub fn read_instance<P: AsRef<Path>>(path: P) -> Result<Instance> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader
        .read_to_string(&mut contents)
        .with_context(|| format!("failed to read {:?}", path))?;
    parse_instance(&contents).with_context(|| format!("failed to load instance {:?}", path))
}

pub fn parse_instance(contents: &str) -> Result<Instance> {
    match serde_json::from_str::<Instance>(contents) {
        Ok(instance) => Ok(instance),
        Err(parse_err) => {
            if serde_json::from_str::<TransportReport>(contents).is_ok() {
                Err(anyhow!(
                    "JSON contains a transport report, expected an instance with facilities, customers, supply and demand"
                ))
            } else {
                Err(parse_err).context("failed to parse JSON instance")
            }
        }
    }
}

pub fn write_instance<P: AsRef<Path>>(path: P, instance: &Instance) -> Result<()> {
    write_json(path.as_ref(), instance, "instance")
}

pub fn write_report<P: AsRef<Path>>(path: P, report: &TransportReport) -> Result<()> {
    write_json(path.as_ref(), report, "report")
}

/// SVG route map of a solved instance.
pub fn save_route_map<P: AsRef<Path>>(
    path: P,
    instance: &Instance,
    report: &TransportReport,
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = create(path)?;
    write_route_map(&mut writer, instance, report)
        .and_then(|_| writer.flush())
        .with_context(|| format!("failed to write route map into {:?}", path))
}

/// SVG map of the supply and demand left after shipping.
pub fn save_residual_map<P: AsRef<Path>>(
    path: P,
    instance: &Instance,
    report: &TransportReport,
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = create(path)?;
    write_residual_map(&mut writer, instance, report)
        .and_then(|_| writer.flush())
        .with_context(|| format!("failed to write residual map into {:?}", path))
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create parent directory {:?}", parent))?;
        }
    }
    let file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    Ok(BufWriter::new(file))
}

fn write_json<T: Serialize>(path: &Path, value: &T, what: &str) -> Result<()> {
    let mut writer = create(path)?;
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("failed to serialise {what}"))?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .with_context(|| format!("failed to write {what} into {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_instance_json() {
        let input = r#"{
            "facilities": [{"x": 0.0, "y": 0.0}],
            "customers": [{"x": 3.0, "y": 4.0}],
            "supply": [5.0],
            "demand": [5.0]
        }"#;
        let instance = parse_instance(input).unwrap();
        assert_eq!(instance.num_facilities(), 1);
        assert_eq!(instance.customers[0].y, 4.0);
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let input = r#"{"facilities": [], "customers": [], "supply": []}"#;
        let err = parse_instance(input).unwrap_err();
        assert!(format!("{err:#}").contains("demand"));
    }

    #[test]
    fn instance_file_roundtrip() {
        let dir = std::env::temp_dir().join(format!("transflow-io-{}", std::process::id()));
        let path = dir.join("nested").join("demo.json");
        let demo = Instance::demo();
        write_instance(&path, &demo).unwrap();
        let loaded = read_instance(&path).unwrap();
        assert_eq!(loaded, demo);
        fs::remove_dir_all(&dir).ok();
    }
}
