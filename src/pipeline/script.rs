use crate::error::ScriptParseError;
use crate::types::script::GeneratedScript;

const CLASS_KEYWORD: &str = "class";
const SCENE_BASE: &str = "(Scene)";

/// Cleans raw model output and resolves the scene class it defines.
pub fn parse_script(raw: &str) -> Result<GeneratedScript, ScriptParseError> {
    let source = strip_code_fences(raw);
    let scene_name = extract_scene_name(&source)?;
    Ok(GeneratedScript { source, scene_name })
}

pub fn strip_code_fences(raw: &str) -> String {
    raw.trim()
        .replace("```python", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Finds the first line declaring `class <Name>(Scene)` and returns `<Name>`.
///
/// The name must be a Python identifier; anything else is an error rather
/// than a best-effort guess.
pub fn extract_scene_name(source: &str) -> Result<String, ScriptParseError> {
    let line = source
        .lines()
        .find(|line| line.contains(CLASS_KEYWORD) && line.contains(SCENE_BASE))
        .ok_or(ScriptParseError::MissingSceneClass)?;

    let after_keyword = line
        .split_once(CLASS_KEYWORD)
        .map(|(_, rest)| rest)
        .unwrap_or_default();
    let name = after_keyword
        .split('(')
        .next()
        .unwrap_or_default()
        .trim();

    if is_identifier(name) {
        Ok(name.to_string())
    } else {
        Err(ScriptParseError::InvalidSceneName(name.to_string()))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
