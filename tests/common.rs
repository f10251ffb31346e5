use std::{io, path::Path, process, process::Command};
use tempfile::TempDir;

#[macro_export]
macro_rules! assert_contains_substr {
    ($haystack:expr, $needle:expr) => {{
        let haystack: &str = &$haystack;
        let needle: &str = &$needle;
        assert!(
            haystack.contains(needle),
            "Expected to find {:?} in output:\n\
             -------- BEGIN OUTPUT --------\n\
             {}\n\
             --------- END OUTPUT ---------",
            needle,
            haystack
        );
    }};
}

pub struct CommandOutput {
    pub status: process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// A scratch directory holding the config file that test runs point
/// `UNIXUSER_CONFIG_FILE` at, so that the host's /etc/unixuser.yml is ignored.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> io::Result<TestEnv> {
        Ok(TestEnv {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn config_file_path(&self) -> std::path::PathBuf {
        self.dir.path().join("unixuser.yml")
    }

    pub fn write_config_file(&self, contents: &str) -> io::Result<()> {
        std::fs::write(self.config_file_path(), contents)
    }

    pub fn run(&self, env_vars: &[(&str, &str)], args: &[&str]) -> io::Result<CommandOutput> {
        run_unixuser_id(self.config_file_path().as_path(), env_vars, args)
    }
}

fn run_unixuser_id(
    config_file_path: &Path,
    env_vars: &[(&str, &str)],
    args: &[&str],
) -> io::Result<CommandOutput> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_unixuser-id"));
    command
        .env_remove("UNIXUSER_LOG_LEVEL")
        .env_remove("UNIXUSER_INITIAL_GROUP_CAPACITY")
        .env_remove("UNIXUSER_MISSING_GROUP_POLICY")
        .env("UNIXUSER_CONFIG_FILE", config_file_path);
    for (key, val) in env_vars {
        command.env(key, val);
    }
    let output = command.args(args).output()?;
    Ok(CommandOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}
