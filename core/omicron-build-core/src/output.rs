//! Streaming output helpers for scan results and build reports.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::scan::ShaderEntry;

/// Write any serializable value as prettified JSON.
pub fn write_json_pretty<T: Serialize + ?Sized>(value: &T, mut w: impl Write) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    w.write_all(json.as_bytes())?;
    w.write_all(b"\n")?;
    Ok(())
}

/// Write scan results as newline-delimited JSON (NDJSON).
pub fn write_ndjson(entries: &[ShaderEntry], mut w: impl Write) -> Result<()> {
    for item in entries {
        let line = serde_json::to_string(item)?;
        w.write_all(line.as_bytes())?;
        w.write_all(b"\n")?;
    }
    Ok(())
}

/// Write scan results as `<path>\t<tag>` lines, `-` for unmarked files.
pub fn write_plain(entries: &[ShaderEntry], mut w: impl Write) -> Result<()> {
    for item in entries {
        let tag = item.stage.map(|s| s.tag()).unwrap_or("-");
        writeln!(w, "{}\t{tag}", item.path.display())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::ShaderStage;
    use std::path::PathBuf;

    fn sample_entry() -> ShaderEntry {
        ShaderEntry::new(PathBuf::from("/shaders/line.vert"), Some(ShaderStage::Vertex))
    }

    #[test]
    fn ndjson_writes_one_line_per_entry() {
        let entries = vec![sample_entry(), sample_entry()];
        let mut buf = Vec::new();

        write_ndjson(&entries, &mut buf).expect("write ndjson");

        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: ShaderEntry = serde_json::from_str(lines[0]).expect("parse");
        assert_eq!(parsed.path, PathBuf::from("/shaders/line.vert"));
        assert_eq!(parsed.spirv.as_deref(), Some("line.vert.spv"));
    }

    #[test]
    fn plain_uses_dash_for_unmarked() {
        let entries = vec![ShaderEntry::new(PathBuf::from("common.glsl"), None)];
        let mut buf = Vec::new();

        write_plain(&entries, &mut buf).expect("write plain");

        assert_eq!(String::from_utf8(buf).unwrap(), "common.glsl\t-\n");
    }
}
