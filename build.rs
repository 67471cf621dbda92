fn main() {
    // ── libvips linking ──────────────────────────────────────────────────────
    //
    // The libvips-rs bindings crate ships no build script of its own, so the
    // `vips` feature has to tell cargo where the shared library lives.
    // Default builds use the pure-Rust backend and link nothing.
    //
    // The VIPS_DIR environment variable points at a non-system install
    // (expects `<VIPS_DIR>/lib`).
    println!("cargo:rerun-if-env-changed=VIPS_DIR");
    println!("cargo:rerun-if-changed=build.rs");

    if std::env::var_os("CARGO_FEATURE_VIPS").is_some() {
        link_libvips();
    }
}

fn link_libvips() {
    if let Ok(vips_dir) = std::env::var("VIPS_DIR") {
        let lib_dir = std::path::Path::new(&vips_dir).join("lib");
        if lib_dir.exists() {
            println!("cargo:rustc-link-search=native={}", lib_dir.display());
        } else {
            println!("cargo:warning=VIPS_DIR is set but '{}' does not exist", lib_dir.display());
        }
    }

    // Linux: the system libvips-dev package is sufficient.
    // macOS: Homebrew's libvips, or VIPS_DIR for a bundled copy.
    println!("cargo:rustc-link-lib=dylib=vips");

    // GLib symbols (g_free, g_object_unref, …) are called directly by the
    // bindings and must be linked explicitly.
    println!("cargo:rustc-link-lib=dylib=glib-2.0");
    println!("cargo:rustc-link-lib=dylib=gobject-2.0");
}
