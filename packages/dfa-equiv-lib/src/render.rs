use std::{
    fmt::Display,
    fs,
    io,
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
};

use crate::{
    automaton::{AutomatonNode, Letter, dfa::Dfa},
    config::{ImageFormat, RenderConfig},
};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("invalid artifact name {0:?}, only ASCII letters, digits, '-' and '_' are allowed")]
    InvalidName(String),
    #[error("could not write {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("could not run {binary}: {source}")]
    Spawn { binary: String, source: io::Error },
    #[error("{binary} exited with {status}: {stderr}")]
    Graphviz {
        binary: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Draws automata as Graphviz graphs into the configured output directory.
///
/// The DOT source is always written to `<output_dir>/<name>.dot`. For image
/// formats the configured `dot` binary turns it into `<name>.png` or
/// `<name>.svg`.
#[derive(Debug, Clone)]
pub struct DfaRenderer {
    config: RenderConfig,
}

impl DfaRenderer {
    pub fn new(config: RenderConfig) -> Self {
        DfaRenderer { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Renders `dfa` and returns the path of the produced artifact.
    pub fn render<N, E>(&self, dfa: &Dfa<N, E>, name: &str) -> Result<PathBuf, RenderError>
    where
        N: AutomatonNode + Display,
        E: Letter + Display,
    {
        self.render_with_witness(dfa, name, None)
    }

    /// Like [`DfaRenderer::render`], additionally coloring the edges taken by
    /// `witness` if highlighting is enabled.
    pub fn render_with_witness<N, E>(
        &self,
        dfa: &Dfa<N, E>,
        name: &str,
        witness: Option<&[E]>,
    ) -> Result<PathBuf, RenderError>
    where
        N: AutomatonNode + Display,
        E: Letter + Display,
    {
        if !is_valid_name(name) {
            return Err(RenderError::InvalidName(name.to_string()));
        }

        let output_dir = self.config.get_output_dir();
        fs::create_dir_all(output_dir).map_err(|source| RenderError::Io {
            path: output_dir.clone(),
            source,
        })?;

        let highlight = match witness {
            Some(word) if *self.config.get_highlight_witness() => dfa.path_edges(word).ok(),
            _ => None,
        };

        let dot_path = output_dir.join(format!("{name}.dot"));
        fs::write(&dot_path, dfa.to_graphviz(highlight.as_ref())).map_err(|source| {
            RenderError::Io {
                path: dot_path.clone(),
                source,
            }
        })?;

        let format = *self.config.get_format();
        if format == ImageFormat::Dot {
            tracing::debug!(path = %dot_path.display(), "Wrote graphviz source");
            return Ok(dot_path);
        }

        let image_path = output_dir.join(format!("{name}.{}", format.extension()));
        self.run_graphviz(&dot_path, &image_path, format)?;

        tracing::debug!(path = %image_path.display(), "Rendered automaton");

        Ok(image_path)
    }

    fn run_graphviz(
        &self,
        dot_path: &Path,
        image_path: &Path,
        format: ImageFormat,
    ) -> Result<(), RenderError> {
        let binary = self.config.get_dot_binary();

        let output = Command::new(binary)
            .arg(format!("-T{}", format.extension()))
            .arg(dot_path)
            .arg("-o")
            .arg(image_path)
            .output()
            .map_err(|source| RenderError::Spawn {
                binary: binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RenderError::Graphviz {
                binary: binary.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[test]
fn test_valid_names() {
    assert!(is_valid_name("dfa1"));
    assert!(is_valid_name("left_automaton-2"));
    assert!(!is_valid_name(""));
    assert!(!is_valid_name("../dfa"));
    assert!(!is_valid_name("a b"));
}
