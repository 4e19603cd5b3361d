pub const DEFAULT_EXTENSION: &str = "pdf";

const FALLBACK_STEM: &str = "resultado";

/// Make sure a user-chosen output name carries `.<extension>`.
///
/// Blank names become `resultado.<extension>`. An existing extension is
/// matched case-insensitively and left as typed.
pub fn normalize_filename(name: &str, extension: &str) -> String {
    let cleaned = name.trim();
    if cleaned.is_empty() {
        return format!("{}.{}", FALLBACK_STEM, extension);
    }

    let suffix = format!(".{}", extension).to_lowercase();
    if cleaned.to_lowercase().ends_with(&suffix) {
        cleaned.to_string()
    } else {
        format!("{}.{}", cleaned, extension)
    }
}

/// Name without its last extension: "report.final.pdf" -> "report.final"
pub fn base_name(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}
