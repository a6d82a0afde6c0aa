//! Extension-based language classification. Deliberately simple: this
//! feeds a line-count summary injected into a prompt, not a build system.

/// Best-effort language name for a file extension. `"other"` when unknown
/// or when the file has no extension.
#[must_use]
pub fn classify(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("rs") => "Rust",
        Some("py") => "Python",
        Some("js" | "mjs" | "cjs") => "JavaScript",
        Some("ts" | "tsx") => "TypeScript",
        Some("jsx") => "JavaScript",
        Some("go") => "Go",
        Some("java") => "Java",
        Some("kt" | "kts") => "Kotlin",
        Some("c" | "h") => "C",
        Some("cpp" | "cc" | "cxx" | "hpp" | "hh") => "C++",
        Some("rb") => "Ruby",
        Some("php") => "PHP",
        Some("cs") => "C#",
        Some("swift") => "Swift",
        Some("scala") => "Scala",
        Some("sh" | "bash" | "zsh") => "Shell",
        Some("sql") => "SQL",
        Some("html" | "htm") => "HTML",
        Some("css" | "scss" | "sass" | "less") => "CSS",
        Some("json") => "JSON",
        Some("yaml" | "yml") => "YAML",
        Some("toml") => "TOML",
        Some("md" | "markdown") => "Markdown",
        Some("proto") => "Protobuf",
        Some("tf") => "Terraform",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn recognizes_common_extensions() {
        assert_eq!(classify(Path::new("src/main.rs")), "Rust");
        assert_eq!(classify(Path::new("index.tsx")), "TypeScript");
        assert_eq!(classify(Path::new("Cargo.toml")), "TOML");
    }

    #[test]
    fn falls_back_to_other() {
        assert_eq!(classify(Path::new("Makefile")), "other");
        assert_eq!(classify(Path::new("LICENSE")), "other");
    }
}
