//! Analyzer callbacks.

use crate::error::AnalyzerError;
use crate::parser::Node;

/// Callbacks invoked while the parse tree is built.
///
/// `enter` fires when a node is created, `exit` when it is complete, and
/// `child` when a completed child is attached to its parent. The default
/// `child` implementation performs the attachment; overriding it controls
/// how (or whether) children end up in the tree. Returning `false` from
/// `exit` discards the subtree.
///
/// Callback failures become parse errors at the current source location;
/// they are logged without triggering error recovery.
pub trait Analyzer<V> {
    /// A node was entered.
    fn enter(&mut self, node: &mut Node<V>) -> Result<(), AnalyzerError> {
        let _ = node;
        Ok(())
    }

    /// A node is complete. Return `false` to discard it.
    fn exit(&mut self, node: &mut Node<V>) -> Result<bool, AnalyzerError> {
        let _ = node;
        Ok(true)
    }

    /// Attach `child` to `parent`.
    fn child(&mut self, parent: &mut Node<V>, child: Node<V>) -> Result<(), AnalyzerError> {
        parent.add_child(child);
        Ok(())
    }
}

/// The do-nothing analyzer: builds the plain parse tree.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeBuilder;

impl<V> Analyzer<V> for TreeBuilder {}
