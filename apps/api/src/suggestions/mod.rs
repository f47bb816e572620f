// Portfolio suggestions: form validation, upstream analysis, segmentation.
// All upstream calls go through `SuggestionSource`; all text splitting through
// `segmentation`.

pub mod handlers;
pub mod validation;
