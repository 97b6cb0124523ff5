//! Content handler callback trait for content stream interpretation.
//!
//! Defines the [`ContentHandler`] trait that bridges the text-operator
//! interpreter and whatever collects its output. The interpreter calls handler
//! methods as it replays a page's content.

use pdfscan_core::{ExtractWarning, TextItem};

/// Callback handler for content stream interpretation.
///
/// All methods have default no-op implementations, allowing handlers to
/// subscribe only to the event types they care about.
pub trait ContentHandler {
    /// Called for every positioned text item, in content-stream order.
    fn on_text(&mut self, _item: TextItem) {}

    /// Called when a non-fatal warning is encountered during interpretation.
    ///
    /// Warnings record best-effort degradation (skipped operators, missing
    /// objects, undecodable streams). Interpretation always continues.
    fn on_warning(&mut self, _warning: ExtractWarning) {}
}

impl<H: ContentHandler + ?Sized> ContentHandler for &mut H {
    fn on_text(&mut self, item: TextItem) {
        (**self).on_text(item);
    }

    fn on_warning(&mut self, warning: ExtractWarning) {
        (**self).on_warning(warning);
    }
}
