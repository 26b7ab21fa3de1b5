fn main() {
    println!("cargo:rerun-if-changed=resources/link_shim.rc");
    println!("cargo:rerun-if-changed=resources/link_shim.manifest");

    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }
    embed_resource::compile("resources/link_shim.rc", embed_resource::NONE)
        .manifest_optional()
        .expect("failed to compile resources");
}
