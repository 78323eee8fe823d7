use std::{
    env,
    path::{Path, PathBuf},
};

use crate::prelude::*;

/// Owner of the shell's working directory.
///
/// There is no cached copy: the directory is the process-wide one, so every
/// spawned child inherits whatever `change_dir` last set.
#[derive(Debug, Default)]
pub struct ShellState {
    _private: (),
}

impl ShellState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn working_dir(&self) -> Result<PathBuf, ShellError> {
        Ok(env::current_dir()?)
    }

    pub fn prompt(&self) -> String {
        let cwd = self
            .working_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|_| String::from("?"));

        format!("{cwd}> ")
    }

    pub fn change_dir(&mut self, path: &Path) -> Result<(), ShellError> {
        trace!(?path, "changing working directory");

        env::set_current_dir(path).map_err(|err| ShellError::Builtin {
            name: "cd",
            message: format!("{}: {err}", path.display()),
        })
    }

    pub fn home_dir(&self) -> Option<PathBuf> {
        env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use once_cell::sync::Lazy;
    use tokio::sync::{Mutex, MutexGuard};

    use super::*;

    static SHELL_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    /// Serializes tests that touch process-wide shell state: the working
    /// directory and SIGINT delivery. Restores the working directory when the
    /// guard drops.
    pub struct ShellGuard {
        original: PathBuf,
        _lock: MutexGuard<'static, ()>,
    }

    impl Drop for ShellGuard {
        fn drop(&mut self) {
            let _ = env::set_current_dir(&self.original);
        }
    }

    pub async fn lock_shell() -> ShellGuard {
        let lock = SHELL_LOCK.lock().await;
        ShellGuard {
            original: env::current_dir().unwrap(),
            _lock: lock,
        }
    }

    #[tokio::test]
    async fn prompt_shows_working_dir() {
        let _guard = lock_shell().await;
        let dir = tempfile::tempdir().unwrap();
        let mut state = ShellState::new();

        state.change_dir(dir.path()).unwrap();

        let expected = format!("{}> ", env::current_dir().unwrap().display());
        assert_eq!(state.prompt(), expected);
    }

    #[tokio::test]
    async fn failed_change_leaves_dir_alone() {
        let _guard = lock_shell().await;
        let mut state = ShellState::new();
        let before = state.prompt();

        let err = state
            .change_dir(Path::new("/does/not/exist"))
            .unwrap_err();

        assert!(err.to_string().starts_with("cd: /does/not/exist"));
        assert_eq!(state.prompt(), before);
    }
}
