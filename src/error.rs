//! Error taxonomy.
//!
//! Nothing here is recovered from silently: the retained tree and the
//! immediate-mode engine cannot be re-synchronised after a partial frame, so
//! every variant aborts the iteration that produced it.

use std::io;

use thiserror::Error;

use crate::host::NodeId;

/// Errors produced by the host, the projector and the render loop.
#[derive(Debug, Error)]
pub enum Error {
    /// The projector met an element kind it cannot draw.
    #[error("unrecognized element kind `{kind}`")]
    UnknownElement { kind: String },

    /// A lifecycle call referenced a node that was never created or was released.
    #[error("node {0} is not allocated")]
    StaleNode(NodeId),

    /// A lifecycle call targeted the wrong sort of node (e.g. children on a text leaf).
    #[error("node {node} is not {expected}")]
    NodeType {
        node: NodeId,
        expected: &'static str,
    },

    /// An append or insert would place a node under itself or its own descendant.
    #[error("node {child} cannot be placed under {parent}, which it contains")]
    Cycle { parent: NodeId, child: NodeId },

    /// Backend failure, passed through unmodified.
    #[error("engine failure: {0}")]
    Engine(#[from] io::Error),

    /// An application callback (`onClick`, `onChange`, ...) failed.
    #[error("{prop} callback failed: {source}")]
    Callback {
        prop: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A render loop operation was called in the wrong state.
    #[error("render loop is {actual}, expected {expected}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::UnknownElement {
            kind: "marquee".into(),
        };
        assert_eq!(err.to_string(), "unrecognized element kind `marquee`");

        let err = Error::Callback {
            prop: "onClick",
            source: anyhow::anyhow!("boom"),
        };
        assert_eq!(err.to_string(), "onClick callback failed: boom");

        let err = Error::Cycle {
            parent: NodeId(3),
            child: NodeId(1),
        };
        assert_eq!(err.to_string(), "node #1 cannot be placed under #3, which it contains");
    }

    #[test]
    fn test_io_error_converts() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Engine(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    }
}
