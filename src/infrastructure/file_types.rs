// File categorisation by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Json,
    Log,
    Text,
    Markdown,
    Image,
}

const JSON_EXTENSIONS: &[&str] = &[".json"];
const LOG_EXTENSIONS: &[&str] = &[".log"];
const TEXT_EXTENSIONS: &[&str] = &[".txt", ".text"];
const MARKDOWN_EXTENSIONS: &[&str] = &[".markdown", ".mdown", ".mkdn", ".mkd", ".md"];
const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".jpe", ".jif", ".jfif", ".jfi", ".png", ".gif", ".tiff", ".tif", ".bmp",
    ".dib", ".heif", ".heic", ".jp2", ".j2k", ".jpf", ".jpx", ".jpm", ".mj2",
];

/// Which data kind a file contributes to, by its extension. Files with
/// unknown extensions are ignored entirely.
pub fn categorise_file(file_name: &str) -> Option<FileCategory> {
    let lower_case = file_name.to_lowercase();
    let groups = [
        (FileCategory::Json, JSON_EXTENSIONS),
        (FileCategory::Log, LOG_EXTENSIONS),
        (FileCategory::Text, TEXT_EXTENSIONS),
        (FileCategory::Markdown, MARKDOWN_EXTENSIONS),
        (FileCategory::Image, IMAGE_EXTENSIONS),
    ];
    for (category, extensions) in groups {
        if extensions.iter().any(|ext| lower_case.ends_with(ext)) {
            return Some(category);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorise_known_extensions() {
        assert_eq!(categorise_file("loss.json"), Some(FileCategory::Json));
        assert_eq!(categorise_file("output.log"), Some(FileCategory::Log));
        assert_eq!(categorise_file("sample.txt"), Some(FileCategory::Text));
        assert_eq!(categorise_file("report.md"), Some(FileCategory::Markdown));
        assert_eq!(categorise_file("attention.png"), Some(FileCategory::Image));
    }

    #[test]
    fn test_categorise_is_case_insensitive() {
        assert_eq!(categorise_file("PHOTO.JPG"), Some(FileCategory::Image));
        assert_eq!(categorise_file("Notes.Md"), Some(FileCategory::Markdown));
    }

    #[test]
    fn test_unknown_extensions_are_ignored() {
        assert_eq!(categorise_file("model.pt"), None);
        assert_eq!(categorise_file("no_extension"), None);
    }
}
