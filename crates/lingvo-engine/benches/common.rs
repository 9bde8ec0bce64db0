// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_lesson_body(sections: usize) -> String {
    let base = "## Greeting\nHello / həˈləʊ / хэллоу / Привет\nGood morning / ɡʊd ˈmɔːnɪŋ / гуд монинг / Доброе утро\n\n- *am* goes with **I**\n- *are* goes with **you**\n\n> Practice every day.\n\n## Translation\nHello / Привет\n\n";
    base.repeat(sections)
}

#[allow(dead_code)]
pub fn generate_lesson_file(sections: usize) -> String {
    format!(
        "---\nalias: bench\norder: 1\ntitle: Bench\n---\n# Bench lesson\n\n{}",
        generate_lesson_body(sections)
    )
}
