use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

pub fn run_meetsync(args: &[&str]) -> Output {
    TestEnv::new().run(args)
}

pub struct TestEnv {
    home: TempDir,
    config: TempDir,
    data: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temporary HOME dir"),
            config: tempfile::tempdir().expect("create temporary XDG config dir"),
            data: tempfile::tempdir().expect("create temporary XDG data dir"),
        }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_meetsync"))
            .args(args)
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.config.path())
            .env("XDG_DATA_HOME", self.data.path())
            .env_remove("FIREFLIES_API_KEY")
            .env_remove("OPENAI_API_KEY")
            .env_remove("SUPABASE_URL")
            .env_remove("SUPABASE_SERVICE_KEY")
            .env_remove("SUPABASE_SERVICE_ROLE_KEY")
            .output()
            .expect("failed to execute meetsync binary")
    }

    #[allow(dead_code)]
    pub fn config_path(&self) -> PathBuf {
        let output = self.run(&["config", "path"]);
        assert!(
            output.status.success(),
            "config path should succeed\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );

        let path = String::from_utf8_lossy(&output.stdout);
        PathBuf::from(path.trim())
    }

    #[allow(dead_code)]
    pub fn write_config(&self, contents: &str) {
        let config_path = self.config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).expect("create config parent directory");
        }
        std::fs::write(&config_path, contents).expect("write config file");
    }
}
