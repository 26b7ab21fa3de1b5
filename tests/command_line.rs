use link_shim::cmdline::{argument_tail, build_command_line};

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

const TAILS: &[&str] = &[
    "",
    "one",
    "one two  three",
    "\"quoted  with   spaces\" next",
    "--opt=\"a b\" \\\"escaped\\\"",
    "  leading",
    "ünïcødé ✓",
];

#[test]
fn child_command_line_is_quoted_target_plus_original_tail() {
    let target = r"C:\Program Files\Real\tool.exe";
    for tail in TAILS {
        for program in ["tool.exe", r#""C:\shim dir\tool.exe""#] {
            let raw = if tail.is_empty() {
                program.to_string()
            } else {
                format!("{program} {tail}")
            };
            let tokenized = program.trim_matches('"');

            let raw_wide = wide(&raw);
            let extracted = argument_tail(&raw_wide, &wide(tokenized));
            let line = build_command_line(&wide(target), extracted);

            assert_eq!(
                String::from_utf16(&line).unwrap(),
                format!("\"{target}\" {tail}"),
                "raw command line {raw:?}"
            );
        }
    }
}

#[test]
fn unpaired_surrogates_survive() {
    let mut raw = wide("tool.exe ");
    raw.push(0xD800);
    raw.extend(wide(" x"));

    let tail = argument_tail(&raw, &wide("tool.exe"));
    assert_eq!(tail, &[0xD800, b' ' as u16, b'x' as u16]);
}
