//! Storage key naming for converted document content

/// Resolves the storage keys of a converted document's assets
pub trait DocContentFilenameMapper: Send + Sync {
    /// Storage key of the background image of page `page_num` (1-based)
    fn bgr_filename(&self, page_num: u32) -> String;
}

/// Naming used by the poppler-based pdf2htmlEX converter.
///
/// Page backgrounds are `bg{n}.png` with `n` the page number in lower-case
/// hexadecimal.
#[derive(Debug, Clone, Copy, Default)]
pub struct PopplerFilenameMapper;

impl DocContentFilenameMapper for PopplerFilenameMapper {
    fn bgr_filename(&self, page_num: u32) -> String {
        format!("bg{:x}.png", page_num)
    }
}
