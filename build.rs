// build.rs - link search path for the native motion library

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=MOTIONWRAPPER_LIB_DIR");

    // Only the `native` feature links libmotionwrapper; simulated builds need nothing.
    #[cfg(feature = "native")]
    {
        if let Ok(dir) = std::env::var("MOTIONWRAPPER_LIB_DIR") {
            println!("cargo:rustc-link-search=native={}", dir);
            println!("cargo:rustc-link-arg=-Wl,-rpath,{}", dir);
        } else {
            println!("cargo:rustc-link-search=native=/usr/local/lib");
        }
    }
}
