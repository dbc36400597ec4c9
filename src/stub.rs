//! Output text for a list of rendered methods.

use crate::qualified::TypeRef;
use crate::render::RenderedMethod;

/// Fixed pieces of one stub block:
///
/// ```text
/// // Name ...
/// func (v T) Name(args) results {
/// 	panic("not implemented")
/// }
/// ```
pub struct StubTemplate;

impl StubTemplate {
    const DOC_PREFIX: &'static str = "// ";
    const DOC_SUFFIX: &'static str = " ...\n";
    const HEADER_PREFIX: &'static str = "func (";
    const BODY: &'static str = " {\n\tpanic(\"not implemented\")\n}\n";
    const SEPARATOR: &'static str = "\n";

    /// One block per method, separated by a single blank line. The text ends
    /// right after the last closing brace's newline; no methods, no text.
    pub fn render(receiver: &TypeRef, methods: &[RenderedMethod]) -> String {
        let var = receiver.var_name();
        let recv = receiver.var_type();
        let mut out = String::new();
        for (i, m) in methods.iter().enumerate() {
            if i > 0 {
                out.push_str(Self::SEPARATOR);
            }
            out.push_str(Self::DOC_PREFIX);
            out.push_str(&m.name);
            out.push_str(Self::DOC_SUFFIX);
            out.push_str(Self::HEADER_PREFIX);
            out.push_str(&var);
            out.push(' ');
            out.push_str(&recv);
            out.push_str(") ");
            out.push_str(&m.signature);
            out.push_str(Self::BODY);
        }
        out
    }
}
