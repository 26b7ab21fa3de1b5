fn main() {
    let code = link_shim::run();
    // Exit codes are DWORDs on Windows; the cast keeps the bit pattern.
    std::process::exit(code as i32);
}
