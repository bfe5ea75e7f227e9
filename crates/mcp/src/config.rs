//! Server configuration: template search directories and the slide template library.

use ppt_core::TemplateLibrary;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding extra template directories, in OS path-list syntax.
pub const TEMPLATE_PATH_ENV: &str = "PPT_TEMPLATE_PATH";
/// Environment variable naming a slide template library JSON file.
pub const SLIDE_TEMPLATES_ENV: &str = "PPT_SLIDE_TEMPLATES";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Slide template library not found: {}", .0.display())]
    LibraryNotFound(PathBuf),

    #[error("Failed to load slide templates from {}: {source}", .path.display())]
    Library {
        path: PathBuf,
        #[source]
        source: ppt_core::Error,
    },

    #[error("Failed to load built-in slide templates: {0}")]
    Builtin(#[source] ppt_core::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directories searched, in order, for a template file given by name.
    pub template_dirs: Vec<PathBuf>,
    /// Slide template library overriding the built-in one.
    pub slide_templates: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_parts(Vec::new(), None, None, dirs::home_dir())
    }
}

impl Config {
    /// Merge command-line values with the process environment.
    pub fn resolve(cli_dirs: Vec<PathBuf>, slide_templates: Option<PathBuf>) -> Self {
        Self::from_parts(
            cli_dirs,
            slide_templates,
            std::env::var_os(TEMPLATE_PATH_ENV),
            dirs::home_dir(),
        )
    }

    /// Directory order: command line, then `PPT_TEMPLATE_PATH`, then the
    /// current directory, `./templates` and `~/.ppt-mcp/templates`.
    pub fn from_parts(
        cli_dirs: Vec<PathBuf>,
        slide_templates: Option<PathBuf>,
        template_path: Option<OsString>,
        home: Option<PathBuf>,
    ) -> Self {
        let mut dirs = cli_dirs;
        if let Some(list) = template_path {
            dirs.extend(std::env::split_paths(&list).filter(|p| !p.as_os_str().is_empty()));
        }
        dirs.push(PathBuf::from("."));
        dirs.push(PathBuf::from("./templates"));
        if let Some(home) = home {
            dirs.push(home.join(".ppt-mcp").join("templates"));
        }

        let mut template_dirs: Vec<PathBuf> = Vec::with_capacity(dirs.len());
        for dir in dirs {
            if !template_dirs.contains(&dir) {
                template_dirs.push(dir);
            }
        }
        Self {
            template_dirs,
            slide_templates: slide_templates.filter(|p| !p.as_os_str().is_empty()),
        }
    }

    /// The configured library file, or the built-in library.
    pub fn load_library(&self) -> Result<TemplateLibrary, ConfigError> {
        match &self.slide_templates {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::LibraryNotFound(path.clone()));
                }
                TemplateLibrary::load(path).map_err(|source| ConfigError::Library {
                    path: path.clone(),
                    source,
                })
            }
            None => TemplateLibrary::builtin().map_err(ConfigError::Builtin),
        }
    }

    /// Resolve a template path, searching the template directories by file name
    /// when `path` itself does not exist.
    pub fn find_template(&self, path: &Path) -> Option<PathBuf> {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        let name = path.file_name()?;
        self.template_dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.exists())
    }

    pub fn search_list(&self) -> String {
        self.template_dirs
            .iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_order_and_dedup() {
        let env = std::env::join_paths([Path::new("/env/a"), Path::new("/cli")]).unwrap();
        let config = Config::from_parts(
            vec![PathBuf::from("/cli")],
            None,
            Some(env),
            Some(PathBuf::from("/home/u")),
        );
        assert_eq!(
            config.template_dirs,
            vec![
                PathBuf::from("/cli"),
                PathBuf::from("/env/a"),
                PathBuf::from("."),
                PathBuf::from("./templates"),
                PathBuf::from("/home/u/.ppt-mcp/templates"),
            ]
        );
    }

    #[test]
    fn test_find_template_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("brand.pptx"), b"x").unwrap();
        let config = Config::from_parts(vec![dir.path().to_path_buf()], None, None, None);

        let found = config.find_template(Path::new("/nowhere/brand.pptx")).unwrap();
        assert_eq!(found, dir.path().join("brand.pptx"));
        assert!(config.find_template(Path::new("missing.pptx")).is_none());
    }

    #[test]
    fn test_default_searches_user_template_dir() {
        let config = Config::default();
        let expected = dirs::home_dir().map(|home| home.join(".ppt-mcp").join("templates"));
        assert_eq!(config.template_dirs.last().cloned(), expected.or(Some(PathBuf::from("./templates"))));
    }

    #[test]
    fn test_library_falls_back_to_builtin() {
        let config = Config::from_parts(Vec::new(), None, None, None);
        let library = config.load_library().unwrap();
        assert!(library.templates.contains_key("title_slide"));
    }

    #[test]
    fn test_missing_library_file_is_an_error() {
        let config = Config::from_parts(
            Vec::new(),
            Some(PathBuf::from("/no/such/library.json")),
            None,
            None,
        );
        assert!(matches!(
            config.load_library(),
            Err(ConfigError::LibraryNotFound(_))
        ));
    }
}
