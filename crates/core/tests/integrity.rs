use std::fs;
use std::path::{Path, PathBuf};

use packcore_core::layout::StagingLayout;
use packcore_core::services::copier::{copy_files, CopyMode};
use packcore_core::services::integrity::verify_bundle;
use packcore_core::PackcoreError;
use tempfile::tempdir;

/// Stage a core, binary, launcher, manifest and ldd output, leaving libraries to the caller.
fn staged(root: &Path) -> (StagingLayout, PathBuf, PathBuf) {
    let core = root.join("core.77");
    let binary = root.join("postgres");
    fs::write(&core, b"core").unwrap();
    fs::write(&binary, b"bin").unwrap();

    let layout = StagingLayout::new(root.join("out"), &core);
    fs::create_dir_all(&layout.staging_dir).unwrap();
    fs::copy(&core, layout.shallow_path(&core)).unwrap();
    fs::copy(&binary, layout.shallow_path(&binary)).unwrap();
    fs::write(layout.ldd_output_path(), "ldd").unwrap();
    fs::write(layout.launcher_path(), "#!/bin/bash\n").unwrap();
    fs::write(layout.manifest_path(), "{}").unwrap();
    (layout, core, binary)
}

fn libraries(root: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let lib = root.join("sys").join("lib64").join(format!("libdep{i}.so.1"));
            fs::create_dir_all(lib.parent().unwrap()).unwrap();
            fs::write(&lib, format!("lib {i}")).unwrap();
            lib
        })
        .collect()
}

#[test]
fn complete_bundle_passes() {
    let temp = tempdir().unwrap();
    let (layout, core, binary) = staged(temp.path());
    let libs = libraries(temp.path(), 3);
    copy_files(&libs, &layout, CopyMode::Deep).unwrap();

    verify_bundle(&layout, Some(&core), &binary, &libs).expect("bundle complete");
}

#[test]
fn two_of_five_missing_libraries_reported_together() {
    let temp = tempdir().unwrap();
    let (layout, core, binary) = staged(temp.path());
    let libs = libraries(temp.path(), 5);
    copy_files(&libs, &layout, CopyMode::Deep).unwrap();
    fs::remove_file(layout.deep_path(&libs[1])).unwrap();
    fs::remove_file(layout.deep_path(&libs[3])).unwrap();

    match verify_bundle(&layout, Some(&core), &binary, &libs).unwrap_err() {
        PackcoreError::Integrity { missing } => {
            assert_eq!(missing.len(), 2, "unexpected report: {missing:?}");
            assert!(missing[0].contains("libdep1.so.1"));
            assert!(missing[1].contains("libdep3.so.1"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn flattened_library_does_not_count_as_present() {
    let temp = tempdir().unwrap();
    let (layout, core, binary) = staged(temp.path());
    let libs = libraries(temp.path(), 1);
    copy_files(&libs, &layout, CopyMode::Shallow).unwrap();

    let err = verify_bundle(&layout, Some(&core), &binary, &libs).unwrap_err();
    assert!(err.to_string().contains("libdep0.so.1"), "unexpected error: {err}");
}

#[test]
fn missing_script_and_diagnostics_are_listed_with_libraries() {
    let temp = tempdir().unwrap();
    let (layout, core, binary) = staged(temp.path());
    let libs = libraries(temp.path(), 1);
    fs::remove_file(layout.launcher_path()).unwrap();
    fs::remove_file(layout.ldd_output_path()).unwrap();

    match verify_bundle(&layout, Some(&core), &binary, &libs).unwrap_err() {
        PackcoreError::Integrity { missing } => {
            assert_eq!(missing.len(), 3, "unexpected report: {missing:?}");
            assert!(missing.iter().any(|m| m.contains("gdb_output") && m.contains("ldd_output")));
            assert!(missing.iter().any(|m| m.contains("runGDB.sh")));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn gdb_output_satisfies_diagnostic_check() {
    let temp = tempdir().unwrap();
    let (layout, core, binary) = staged(temp.path());
    fs::remove_file(layout.ldd_output_path()).unwrap();
    fs::write(layout.gdb_output_path(), "gdb").unwrap();

    verify_bundle(&layout, Some(&core), &binary, &[]).expect("gdb output is enough");
}

#[test]
fn missing_core_and_binary_reported() {
    let temp = tempdir().unwrap();
    let (layout, core, binary) = staged(temp.path());
    fs::remove_file(layout.shallow_path(&core)).unwrap();
    fs::remove_file(layout.shallow_path(&binary)).unwrap();

    let err = verify_bundle(&layout, Some(&core), &binary, &[]).unwrap_err();
    let text = err.to_string();
    assert!(text.contains("core file core.77"));
    assert!(text.contains("binary postgres"));
}

#[test]
fn core_check_skipped_when_not_specified() {
    let temp = tempdir().unwrap();
    let (layout, core, binary) = staged(temp.path());
    fs::remove_file(layout.shallow_path(&core)).unwrap();

    verify_bundle(&layout, None, &binary, &[]).expect("no core requested");
}

#[test]
fn absent_staging_directory_fails_first() {
    let temp = tempdir().unwrap();
    let core = temp.path().join("core.1");
    let layout = StagingLayout::new(temp.path(), &core);
    let err = verify_bundle(&layout, Some(&core), Path::new("/bin/postgres"), &[]).unwrap_err();
    assert!(err.to_string().contains("packcore directory"));
}
