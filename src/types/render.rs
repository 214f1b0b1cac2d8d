use std::path::PathBuf;

use serde::Serialize;

/// Manim quality presets. Each maps to a CLI flag and to the directory name
/// Manim writes its output into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    Medium,
    High,
    Production,
    FourK,
}

impl QualityPreset {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" => Some(Self::Low),
            "medium" | "m" => Some(Self::Medium),
            "high" | "h" => Some(Self::High),
            "production" | "p" => Some(Self::Production),
            "fourk" | "4k" | "k" => Some(Self::FourK),
            _ => None,
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Self::Low => "-ql",
            Self::Medium => "-qm",
            Self::High => "-qh",
            Self::Production => "-qp",
            Self::FourK => "-qk",
        }
    }

    pub fn output_subdir(self) -> &'static str {
        match self {
            Self::Low => "480p15",
            Self::Medium => "720p30",
            Self::High => "1080p60",
            Self::Production => "1440p60",
            Self::FourK => "2160p60",
        }
    }
}

/// The external command used to invoke Manim, before per-render arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RenderArtifact {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
}
