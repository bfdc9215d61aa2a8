//! Scratch tree with fake tools and a config file pointing at them.
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use tempfile::TempDir;

pub struct Workspace {
    pub temp: TempDir,
    pub core: PathBuf,
    pub binary: PathBuf,
    pub library: PathBuf,
    pub output_dir: PathBuf,
    pub config_path: PathBuf,
}

impl Workspace {
    /// Fake `file`, `ldd`, `tar` and `uname`; gdb and lsb_release are absent.
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().to_path_buf();
        for dir in ["tools", "out", "etc", "cores", "bin", "sys/lib64"] {
            fs::create_dir_all(root.join(dir)).expect("fixture dir");
        }

        let core = root.join("cores").join("core.4242");
        fs::write(&core, b"fake core").expect("core");
        let binary = root.join("bin").join("fakepg");
        script(&binary, "#!/bin/sh\nexit 0\n");
        let library = root.join("sys/lib64/libfake.so.1");
        fs::write(&library, b"fake lib").expect("lib");
        fs::write(root.join("etc/os-release"), "NAME=Fake\n").expect("os-release");

        let tools = root.join("tools");
        script(
            &tools.join("file"),
            "#!/bin/sh\necho \"$1: ELF 64-bit LSB core file, x86-64, from 'fakepg: seg0'\"\n",
        );
        script(
            &tools.join("ldd"),
            &format!("#!/bin/sh\necho \"\tlibfake.so.1 => {} (0x00007f0000000000)\"\n", library.display()),
        );
        script(&tools.join("tar"), "#!/bin/sh\n: > \"$2\"\n");
        script(&tools.join("uname"), "#!/bin/sh\necho 6.1.0-fake\n");

        let config = serde_json::json!({
            "tool_timeout_secs": 20,
            "shim_libraries": [],
            "tools": {
                "gdb": root.join("absent/gdb"),
                "ldd": tools.join("ldd"),
                "file": tools.join("file"),
                "tar": tools.join("tar"),
                "lsb_release": root.join("absent/lsb_release"),
                "uname": tools.join("uname"),
            },
            "platform": {
                "release_dir": root.join("etc"),
                "appliance_version_file": root.join("etc/gpdb-appliance-version"),
            },
        });
        let config_path = root.join("packcore.json");
        fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).expect("config");

        Self { output_dir: root.join("out"), temp, core, binary, library, config_path }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Replace one of the fake tools.
    pub fn tool(&self, name: &str, body: &str) {
        script(&self.root().join("tools").join(name), body);
    }

    /// `packcore` with the config, a valid `GPHOME` and a clean logging setup.
    pub fn packcore(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("packcore");
        cmd.env("GPHOME", self.root())
            .env_remove("PACKCORE_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(&self.config_path);
        cmd
    }

    /// `packcore collect` for the workspace core and binary.
    pub fn collect(&self) -> Command {
        let mut cmd = self.packcore();
        cmd.arg("collect")
            .arg("--core")
            .arg(&self.core)
            .arg("--binary")
            .arg(&self.binary)
            .arg("--output-dir")
            .arg(&self.output_dir);
        cmd
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.output_dir.join("packcore-core.4242")
    }

    pub fn archive(&self) -> PathBuf {
        self.output_dir.join("packcore-core.4242.tar.gz")
    }
}

fn script(path: &Path, body: &str) {
    fs::write(path, body).expect("write script");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod");
}
