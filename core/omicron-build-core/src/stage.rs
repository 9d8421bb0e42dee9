//! Shader stage markers and first-line classification.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Pipeline stage named by an `OMICRON_*` marker on a shader's first line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShaderStage {
    #[serde(rename = "frag")]
    Fragment,
    #[serde(rename = "vert")]
    Vertex,
    #[serde(rename = "tesc")]
    TessControl,
    #[serde(rename = "tese")]
    TessEvaluation,
    #[serde(rename = "comp")]
    Compute,
}

impl ShaderStage {
    /// All stages in marker priority order.
    pub const ALL: [ShaderStage; 5] = [
        ShaderStage::Fragment,
        ShaderStage::Vertex,
        ShaderStage::TessControl,
        ShaderStage::TessEvaluation,
        ShaderStage::Compute,
    ];

    pub fn marker(self) -> &'static str {
        match self {
            ShaderStage::Fragment => "OMICRON_FRAGMENT",
            ShaderStage::Vertex => "OMICRON_VERTEX",
            ShaderStage::TessControl => "OMICRON_TESC",
            ShaderStage::TessEvaluation => "OMICRON_TESE",
            ShaderStage::Compute => "OMICRON_COMP",
        }
    }

    /// Short tag printed by `shaderstage`, also the glslc stage suffix.
    pub fn tag(self) -> &'static str {
        match self {
            ShaderStage::Fragment => "frag",
            ShaderStage::Vertex => "vert",
            ShaderStage::TessControl => "tesc",
            ShaderStage::TessEvaluation => "tese",
            ShaderStage::Compute => "comp",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ShaderStage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        ShaderStage::ALL
            .into_iter()
            .find(|stage| stage.tag() == wanted)
            .ok_or_else(|| anyhow!("unknown shader stage: {s} (expected frag|vert|tesc|tese|comp)"))
    }
}

/// First stage (in priority order) whose marker occurs in `line`.
pub fn classify_line(line: &str) -> Option<ShaderStage> {
    ShaderStage::ALL
        .into_iter()
        .find(|stage| line.contains(stage.marker()))
}

/// Read the first line of `reader`, decoding lossily.
///
/// `\n`, `\r\n` and a lone `\r` all end the line; the terminator is not included.
pub fn read_first_line(reader: impl Read) -> Result<String> {
    let mut buf = Vec::new();
    BufReader::new(reader).read_until(b'\n', &mut buf)?;
    if let Some(end) = buf.iter().position(|&b| b == b'\r' || b == b'\n') {
        buf.truncate(end);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Classify a shader source file by its first line only.
pub fn classify_file(path: &Path) -> Result<Option<ShaderStage>> {
    let file = File::open(path).with_context(|| format!("opening shader {}", path.display()))?;
    let line =
        read_first_line(file).with_context(|| format!("reading shader {}", path.display()))?;
    Ok(classify_line(&line))
}
