// Shared inputs for the editing benches: markdown to import and keystrokes
// to replay. Each bench binary compiles this module on its own and uses only
// part of it, hence the dead_code allowances.
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with **some** content.\n\n- Bullet point\n  - Nested item\n- Another item\n\n1. First\n2. Second\n\n```\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn keystrokes(count: usize) -> String {
    let line = "- typed item with *emphasis* and `code`\n";
    line.repeat(count)
}
