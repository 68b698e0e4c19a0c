//! Prompt fragments loaded from disk.
//!
//! Users edit the fragments directly, so they are read fresh at the start
//! of every transform run rather than baked into the binary.

use std::path::Path;

use tubedigest_shared::{Result, TubeDigestError};

/// The two prompt fragments a transform run needs.
///
/// Both end with exactly one trailing newline regardless of how the files
/// were saved.
#[derive(Debug, Clone)]
pub struct PromptSet {
    /// System message establishing the model's role.
    pub system: String,
    /// Task instructions sent ahead of each transcript.
    pub instructions: String,
}

/// Load `system.md` and `instructions.md` from the prompts directory.
pub fn load_prompts(dir: &Path) -> Result<PromptSet> {
    Ok(PromptSet {
        system: read_fragment(dir, "system.md")?,
        instructions: read_fragment(dir, "instructions.md")?,
    })
}

fn read_fragment(dir: &Path, name: &str) -> Result<String> {
    let path = dir.join(name);
    let text = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TubeDigestError::config(format!(
            "prompt fragment missing: {}",
            path.display()
        )),
        _ => TubeDigestError::io(&path, e),
    })?;
    Ok(format!("{}\n", text.trim_end()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn temp_prompts() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tubedigest-prompts-test-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_both_fragments_newline_normalized() {
        let dir = temp_prompts();
        std::fs::write(dir.join("system.md"), "You are an analyst.\n\n").unwrap();
        std::fs::write(dir.join("instructions.md"), "Summarize the session.").unwrap();

        let prompts = load_prompts(&dir).unwrap();
        assert_eq!(prompts.system, "You are an analyst.\n");
        assert_eq!(prompts.instructions, "Summarize the session.\n");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_fragment_names_the_path() {
        let dir = temp_prompts();
        std::fs::write(dir.join("system.md"), "present").unwrap();

        let err = load_prompts(&dir).unwrap_err();
        assert!(err.to_string().contains("instructions.md"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
