//! Formatting operation dispatch table
//!
//! Each operation maps to one of three editing modes the host's
//! text-editing surface knows how to perform: wrap the selection, toggle
//! a line prefix, or insert a link construct. One generic executor in the
//! command layer consumes this table; there is no per-operation handler.

/// A user-invokable formatting operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatOp {
    Bold,
    Italic,
    Strikethrough,
    InlineCode,
    CodeBlock,
    BulletList,
    NumberedList,
    Heading1,
    Heading2,
    Heading3,
    Link,
}

/// What the text-editing surface should do for an operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatAction {
    /// Surround the selection, inserting the placeholder when empty
    Wrap {
        prefix: &'static str,
        suffix: &'static str,
        placeholder: &'static str,
    },
    /// Wrap the selection as a fenced block
    WrapBlock {
        fence: &'static str,
        placeholder: &'static str,
    },
    /// Toggle a prefix on every line the selection touches
    TogglePrefix { prefix: &'static str },
    /// Insert a markdown link construct at the cursor
    InsertLink,
}

impl FormatOp {
    /// The syntax fragment and editing mode for this operation
    pub fn action(self) -> FormatAction {
        match self {
            FormatOp::Bold => FormatAction::Wrap {
                prefix: "**",
                suffix: "**",
                placeholder: "bold text",
            },
            FormatOp::Italic => FormatAction::Wrap {
                prefix: "_",
                suffix: "_",
                placeholder: "italic text",
            },
            FormatOp::Strikethrough => FormatAction::Wrap {
                prefix: "~~",
                suffix: "~~",
                placeholder: "strikethrough",
            },
            FormatOp::InlineCode => FormatAction::Wrap {
                prefix: "`",
                suffix: "`",
                placeholder: "code",
            },
            FormatOp::CodeBlock => FormatAction::WrapBlock {
                fence: "```",
                placeholder: "code",
            },
            FormatOp::BulletList => FormatAction::TogglePrefix { prefix: "- " },
            FormatOp::NumberedList => FormatAction::TogglePrefix { prefix: "1. " },
            FormatOp::Heading1 => FormatAction::TogglePrefix { prefix: "# " },
            FormatOp::Heading2 => FormatAction::TogglePrefix { prefix: "## " },
            FormatOp::Heading3 => FormatAction::TogglePrefix { prefix: "### " },
            FormatOp::Link => FormatAction::InsertLink,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_operations() {
        assert_eq!(
            FormatOp::Bold.action(),
            FormatAction::Wrap {
                prefix: "**",
                suffix: "**",
                placeholder: "bold text",
            }
        );
        assert_eq!(
            FormatOp::InlineCode.action(),
            FormatAction::Wrap {
                prefix: "`",
                suffix: "`",
                placeholder: "code",
            }
        );
    }

    #[test]
    fn test_wrap_prefix_matches_suffix() {
        for op in [FormatOp::Bold, FormatOp::Italic, FormatOp::Strikethrough, FormatOp::InlineCode]
        {
            match op.action() {
                FormatAction::Wrap { prefix, suffix, .. } => assert_eq!(prefix, suffix),
                other => panic!("expected wrap action, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_heading_prefixes() {
        for (op, expected) in [
            (FormatOp::Heading1, "# "),
            (FormatOp::Heading2, "## "),
            (FormatOp::Heading3, "### "),
            (FormatOp::BulletList, "- "),
            (FormatOp::NumberedList, "1. "),
        ] {
            assert_eq!(op.action(), FormatAction::TogglePrefix { prefix: expected });
        }
    }

    #[test]
    fn test_code_block_is_fenced() {
        assert_eq!(
            FormatOp::CodeBlock.action(),
            FormatAction::WrapBlock {
                fence: "```",
                placeholder: "code",
            }
        );
    }

    #[test]
    fn test_link_inserts() {
        assert_eq!(FormatOp::Link.action(), FormatAction::InsertLink);
    }
}
