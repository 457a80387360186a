use std::fs;

use serde::Deserialize;

/// Project definition loaded from graphite.toml.
#[derive(Debug, Deserialize)]
pub struct ProjectFile {
    pub project: Project,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Project {
    /// Source file to compile
    pub src: String,
    /// Filepath of output file
    pub out: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Options {
    /// Print the checked AST after compiling
    pub debug_mode: bool,
}

pub fn load_config_file() -> Result<(Project, Options), String> {
    let text = fs::read_to_string("graphite.toml")
        .map_err(|_| "no graphite.toml in current directory (run 'graphite init')".to_string())?;

    let file: ProjectFile =
        toml::from_str(&text).map_err(|e| format!("invalid graphite.toml: {}", e))?;

    Ok((file.project, file.options))
}
