//! Transaction isolation levels.

use std::fmt;

const SESAME_NAMESPACE: &str = "http://www.openrdf.org/schema/sesame#";

/// Consistency guarantee requested when a transaction is opened.
///
/// The server receives the level as an IRI in the `isolation-level` parameter.
///
/// ```
/// use graphdb_http::transaction::TransactionIsolationLevel;
///
/// assert_eq!(
///     TransactionIsolationLevel::Snapshot.iri(),
///     "http://www.openrdf.org/schema/sesame#SNAPSHOT"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionIsolationLevel {
    /// No isolation
    None,
    /// Only committed data is read
    ReadCommitted,
    /// Reads see a snapshot taken at the start of the transaction
    SnapshotRead,
    /// Snapshot reads, conflicting writes fail
    Snapshot,
    /// Transactions behave as if run one after another
    Serializable,
}

impl TransactionIsolationLevel {
    /// Every level, weakest first.
    pub const ALL: [TransactionIsolationLevel; 5] = [
        TransactionIsolationLevel::None,
        TransactionIsolationLevel::ReadCommitted,
        TransactionIsolationLevel::SnapshotRead,
        TransactionIsolationLevel::Snapshot,
        TransactionIsolationLevel::Serializable,
    ];

    fn name(&self) -> &'static str {
        match self {
            TransactionIsolationLevel::None => "NONE",
            TransactionIsolationLevel::ReadCommitted => "READ_COMMITTED",
            TransactionIsolationLevel::SnapshotRead => "SNAPSHOT_READ",
            TransactionIsolationLevel::Snapshot => "SNAPSHOT",
            TransactionIsolationLevel::Serializable => "SERIALIZABLE",
        }
    }

    /// IRI sent to the server.
    pub fn iri(&self) -> String {
        format!("{}{}", SESAME_NAMESPACE, self.name())
    }
}

impl fmt::Display for TransactionIsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iris() {
        let iris: Vec<String> = TransactionIsolationLevel::ALL.iter().map(|level| level.iri()).collect();
        assert_eq!(iris[0], "http://www.openrdf.org/schema/sesame#NONE");
        assert_eq!(iris[1], "http://www.openrdf.org/schema/sesame#READ_COMMITTED");
        assert_eq!(iris[2], "http://www.openrdf.org/schema/sesame#SNAPSHOT_READ");
        assert_eq!(iris[4], "http://www.openrdf.org/schema/sesame#SERIALIZABLE");
    }
}
