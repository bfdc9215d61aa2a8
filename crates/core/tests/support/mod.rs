//! Fake tool scripts and a scratch tree for pipeline tests.
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use packcore_core::config::PackcoreConfig;
use tempfile::TempDir;

pub struct Fixture {
    pub temp: TempDir,
    pub tools_dir: PathBuf,
    pub core: PathBuf,
    pub binary: PathBuf,
    pub output_dir: PathBuf,
    pub etc_dir: PathBuf,
    pub config: PackcoreConfig,
}

impl Fixture {
    /// Scratch tree with a core, a binary and every fake tool except gdb/ldd.
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().to_path_buf();
        let tools_dir = root.join("tools");
        let output_dir = root.join("out");
        let etc_dir = root.join("etc");
        for dir in [&tools_dir, &output_dir, &etc_dir, &root.join("cores"), &root.join("bin")] {
            fs::create_dir_all(dir).expect("create fixture dir");
        }

        let core = root.join("cores").join("core.1234");
        fs::write(&core, b"\x7fELF fake core image").expect("write core");
        let binary = root.join("bin").join("fakepg");
        write_script(&binary, "#!/bin/sh\nexit 0\n");

        fs::write(etc_dir.join("os-release"), "NAME=\"Fake Linux\"\n").expect("os-release");
        fs::write(etc_dir.join("fake-release"), "Fake Linux release 9\n").expect("fake-release");
        fs::write(etc_dir.join("hostname"), "box\n").expect("hostname");

        let mut config = PackcoreConfig::default();
        config.tool_timeout_secs = 20;
        config.shim_libraries = Vec::new();
        config.platform.release_dir = etc_dir.clone();
        config.platform.appliance_version_file = etc_dir.join("gpdb-appliance-version");
        config.tools.gdb = missing_tool(&root, "gdb");
        config.tools.ldd = missing_tool(&root, "ldd");
        config.tools.lsb_release = missing_tool(&root, "lsb_release");

        let mut fixture = Self { temp, tools_dir, core, binary, output_dir, etc_dir, config };
        fixture.config.tools.file = fixture
            .tool(
                "file",
                "#!/bin/sh\necho \"$1: ELF 64-bit LSB core file, x86-64, version 1 (SYSV), SVR4-style, from 'fakepg: gpadmin template1'\"\n",
            )
            .display()
            .to_string();
        fixture.config.tools.tar =
            fixture.tool("tar", "#!/bin/sh\n: > \"$2\"\n").display().to_string();
        fixture.config.tools.uname =
            fixture.tool("uname", "#!/bin/sh\necho 5.14.0-fake\n").display().to_string();
        fixture
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Write an executable script into the tools directory.
    pub fn tool(&self, name: &str, body: &str) -> PathBuf {
        let path = self.tools_dir.join(name);
        write_script(&path, body);
        path
    }

    /// Create a library file under the fixture root and return its absolute path.
    pub fn library(&self, relative: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).expect("lib dir");
        fs::write(&path, format!("ELF {relative}")).expect("write lib");
        path
    }

    /// Install a fake `ldd` that prints `listing`.
    pub fn with_ldd(&mut self, listing: &str) {
        let body = format!("#!/bin/sh\ncat <<'EOF'\n{listing}EOF\n");
        self.config.tools.ldd = self.tool("ldd", &body).display().to_string();
    }

    /// Install a fake `gdb` that prints `listing`.
    pub fn with_gdb(&mut self, listing: &str) {
        let body = format!("#!/bin/sh\ncat <<'EOF'\n{listing}EOF\n");
        self.config.tools.gdb = self.tool("gdb", &body).display().to_string();
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.output_dir.join("packcore-core.1234")
    }

    pub fn archive(&self) -> PathBuf {
        self.output_dir.join("packcore-core.1234.tar.gz")
    }
}

pub fn write_script(path: &Path, body: &str) {
    fs::write(path, body).expect("write script");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod script");
}

/// `ldd` line for a resolved library.
pub fn ldd_line(lib: &Path) -> String {
    let name = lib.file_name().unwrap().to_string_lossy();
    format!("\t{name} => {} (0x00007f0c1c9e0000)\n", lib.display())
}

/// `info sharedlibrary` row for a library.
pub fn gdb_row(lib: &Path) -> String {
    format!("0x00007f3c19e4a720  0x00007f3c19fb0e4f  Yes         {}\n", lib.display())
}

fn missing_tool(root: &Path, name: &str) -> String {
    root.join("absent").join(name).display().to_string()
}
