use std::{env, path::{Path, PathBuf}};

fn main() {
    println!("cargo:rerun-if-env-changed=OCI_LIB_DIR");
    println!("cargo:rerun-if-env-changed=ORACLE_HOME");
    println!("cargo:rerun-if-env-changed=LD_LIBRARY_PATH");

    let windows = env::var("CARGO_CFG_TARGET_OS").map(|os| os == "windows").unwrap_or(false);
    let oracle_client_lib = if windows { "oci" } else { "clntsh" };

    match find_client_lib(oracle_client_lib, windows) {
        Some(dir) => {
            println!("cargo:rustc-link-search=native={}", dir.display());
            println!("cargo:rustc-link-lib=dylib={}", oracle_client_lib);
        }
        None => {
            println!("cargo:warning=Oracle client library ({}) was not found; linking is left to the final binary", oracle_client_lib);
        }
    }
}

fn find_client_lib(name: &str, windows: bool) -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(dir) = env::var_os("OCI_LIB_DIR") {
        dirs.push(PathBuf::from(dir));
    }
    if let Some(home) = env::var_os("ORACLE_HOME") {
        let home = PathBuf::from(home);
        dirs.push(home.join("lib"));
        dirs.push(home);
    }
    let path_var = if windows { "PATH" } else { "LD_LIBRARY_PATH" };
    if let Some(paths) = env::var_os(path_var) {
        dirs.extend(env::split_paths(&paths));
    }
    if !windows {
        for root in &["/usr/lib/oracle", "/opt/oracle"] {
            if let Ok(entries) = Path::new(root).read_dir() {
                for entry in entries.flatten() {
                    let path = entry.path();
                    dirs.push(path.join("client64").join("lib"));
                    dirs.push(path);
                }
            }
        }
    }
    dirs.into_iter().find(|dir| has_client_lib(dir, name, windows))
}

fn has_client_lib(dir: &Path, name: &str, windows: bool) -> bool {
    let prefix = if windows { format!("{}.", name) } else { format!("lib{}.", name) };
    if let Ok(iter) = dir.read_dir() {
        for entry in iter.flatten() {
            if let Some(file_name) = entry.file_name().to_str() {
                if file_name.to_lowercase().starts_with(&prefix) {
                    return true;
                }
            }
        }
    }
    false
}
