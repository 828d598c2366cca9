#![forbid(unsafe_code)]

//! File picker metadata handed over by page scripts as JSON.
//!
//! Scripts serialize `File` objects as `{name, lastModified, size, type}`;
//! missing or mistyped members fall back to empty values.

use rui_wire::FileInfo;
use serde_json::Value;

fn file_info(value: &Value) -> FileInfo {
    FileInfo {
        name: value["name"].as_str().unwrap_or_default().to_owned(),
        last_modified: value["lastModified"].as_i64().unwrap_or(0),
        size: value["size"].as_i64().unwrap_or(0),
        mime_type: value["type"].as_str().unwrap_or_default().to_owned(),
    }
}

/// Parse one file object.
pub fn parse_file_info(json: &str) -> Result<FileInfo, serde_json::Error> {
    let value: Value = serde_json::from_str(json)?;
    Ok(file_info(&value))
}

/// Parse an array of file objects. A non-array value yields no files.
pub fn parse_file_list(json: &str) -> Result<Vec<FileInfo>, serde_json::Error> {
    let value: Value = serde_json::from_str(json)?;
    Ok(value
        .as_array()
        .map(|files| files.iter().map(file_info).collect())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_dom_file_members() {
        let files = parse_file_list(
            r#"[{"name":"a.txt","lastModified":1700000000000,"size":12,"type":"text/plain"},{"name":"b"}]"#,
        )
        .unwrap();
        assert_eq!(
            files,
            [
                FileInfo {
                    name: "a.txt".into(),
                    last_modified: 1_700_000_000_000,
                    size: 12,
                    mime_type: "text/plain".into(),
                },
                FileInfo {
                    name: "b".into(),
                    ..FileInfo::default()
                },
            ]
        );
    }

    #[test]
    fn non_array_is_empty_and_garbage_fails() {
        assert!(parse_file_list("{}").unwrap().is_empty());
        assert!(parse_file_info("not json").is_err());
    }
}
