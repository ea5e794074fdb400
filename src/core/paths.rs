use std::path::{Path, PathBuf};

pub const DATA_DIR: &str = ".electrolyte";
pub const CONFIG_FILE: &str = "electrolyte.yaml";

/// Filesystem layout of an assistant workspace.
pub struct AssistantPaths {
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub database: PathBuf,
    pub uploads: PathBuf,
    pub config_file: PathBuf,
}

impl AssistantPaths {
    pub fn current() -> std::io::Result<Self> {
        Ok(Self::from_root(std::env::current_dir()?))
    }

    pub fn from_root(root: PathBuf) -> Self {
        let data_dir = root.join(DATA_DIR);
        Self {
            database: data_dir.join("knowledge.db"),
            uploads: data_dir.join("uploads"),
            config_file: root.join(CONFIG_FILE),
            data_dir,
            root,
        }
    }

    /// Resolve a possibly relative path against the workspace root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let paths = AssistantPaths::from_root(PathBuf::from("/work"));
        assert_eq!(paths.database, PathBuf::from("/work/.electrolyte/knowledge.db"));
        assert_eq!(paths.config_file, PathBuf::from("/work/electrolyte.yaml"));
        assert_eq!(paths.resolve(Path::new("papers")), PathBuf::from("/work/papers"));
        assert_eq!(paths.resolve(Path::new("/tmp/x.pdf")), PathBuf::from("/tmp/x.pdf"));
    }
}
