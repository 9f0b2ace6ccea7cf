//! Output representation selection for Quillbook
//!
//! A cell output arrives as a bundle of alternative encodings keyed by
//! mimetype. This module picks the best one to render, following the
//! display-preference order used by IPython, and wraps selected HTML in a
//! trusted rendering handle so the UI layer can display it without further
//! escaping concerns.

use std::collections::HashMap;

use crate::notebook::{Notebook, Output};

/// Mimetype preference order used by IPython
pub const PREFERRED_MIMETYPES: [&str; 9] = [
    "application/javascript",
    "text/html",
    "text/markdown",
    "text/latex",
    "image/svg+xml",
    "image/png",
    "image/jpeg",
    "application/pdf",
    "text/plain",
];

/// HTML that has been cleared for direct rendering
///
/// Only the selector produces these, and only for bundle values the server
/// published under `text/html`. The wrapper marks the trust boundary; code
/// holding a `TrustedHtml` may render it unescaped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrustedHtml(String);

impl TrustedHtml {
    fn trust(html: &str) -> Self {
        Self(html.to_string())
    }

    /// The raw HTML, safe to hand to the rendering layer
    pub fn as_html(&self) -> &str {
        &self.0
    }
}

/// Find the preferred mimetype among those available in a bundle
///
/// Returns the first entry of [`PREFERRED_MIMETYPES`] present as a key, or
/// `None` if the bundle is empty or contains no known mimetype. The result
/// never depends on the bundle's iteration order.
pub fn select_preferred(bundle: &HashMap<String, String>) -> Option<&'static str> {
    PREFERRED_MIMETYPES
        .iter()
        .copied()
        .find(|mimetype| bundle.contains_key(*mimetype))
}

/// Select and cache the display mimetype for a single output
pub fn select_output_mimetype(output: &mut Output) {
    if output.mimetype_bundle.is_empty() {
        log::warn!("received an output with an empty mimetype bundle");
        output.preferred_mimetype = None;
        output.trusted_html = None;
        return;
    }

    output.preferred_mimetype = select_preferred(&output.mimetype_bundle);
    output.trusted_html = None;

    match output.preferred_mimetype {
        Some("text/html") => {
            output.trusted_html = output
                .mimetype_bundle
                .get("text/html")
                .map(|html| TrustedHtml::trust(html));
        }
        Some(_) => {}
        None => {
            log::warn!("unable to select a mimetype for cell output");
        }
    }
}

/// Select display mimetypes for every output in a notebook
pub fn select_notebook_mimetypes(notebook: &mut Notebook) {
    for worksheet in notebook.worksheets.values_mut() {
        for cell in worksheet.cells.values_mut() {
            for output in &mut cell.outputs {
                select_output_mimetype(output);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_html_preferred_over_plain_text() {
        let bundle = bundle(&[("text/plain", "x"), ("text/html", "<b>x</b>")]);
        assert_eq!(select_preferred(&bundle), Some("text/html"));
    }

    #[test]
    fn test_plain_text_selected_when_alone() {
        let bundle = bundle(&[("text/plain", "x")]);
        assert_eq!(select_preferred(&bundle), Some("text/plain"));
    }

    #[test]
    fn test_empty_bundle_selects_nothing() {
        assert_eq!(select_preferred(&HashMap::new()), None);
    }

    #[test]
    fn test_unknown_mimetypes_select_nothing() {
        let bundle = bundle(&[("application/x-custom", "blob")]);
        assert_eq!(select_preferred(&bundle), None);
    }

    #[test]
    fn test_html_selection_produces_trusted_handle() {
        let mut output = Output {
            mimetype_bundle: bundle(&[("text/plain", "x"), ("text/html", "<b>x</b>")]),
            ..Default::default()
        };

        select_output_mimetype(&mut output);

        assert_eq!(output.preferred_mimetype, Some("text/html"));
        assert_eq!(
            output.trusted_html.as_ref().map(|h| h.as_html()),
            Some("<b>x</b>")
        );
    }

    #[test]
    fn test_non_html_selection_clears_trusted_handle() {
        let mut output = Output {
            mimetype_bundle: bundle(&[("image/png", "89504e47")]),
            ..Default::default()
        };
        output.trusted_html = None;

        select_output_mimetype(&mut output);

        assert_eq!(output.preferred_mimetype, Some("image/png"));
        assert!(output.trusted_html.is_none());
    }
}
