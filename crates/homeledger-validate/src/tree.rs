//! Account-tree checks for the write path.
//!
//! Account creation and deletion run through the same structural
//! checks the core tree builder enforces; this module is the write
//! path's front door to them.

use std::collections::HashSet;
use tracing::debug;

use homeledger_core::{Account, AccountTree, Split, TreeError};

/// Validate a proposed account forest without keeping the index.
///
/// Exactly one root, unique guids, resolvable acyclic parent chains,
/// `children` lists consistent with parent back-pointers.
pub fn validate_tree(accounts: &[Account]) -> Result<(), TreeError> {
    match AccountTree::build(accounts.to_vec()) {
        Ok(_) => Ok(()),
        Err(err) => {
            debug!(%err, "rejected account tree");
            Err(err)
        }
    }
}

/// Guard account deletion: forbidden while any split references the
/// account.
pub fn check_account_removable(
    tree: &AccountTree,
    guid: &str,
    splits: &[Split],
) -> Result<(), TreeError> {
    let referenced: HashSet<String> = splits.iter().map(|s| s.account.clone()).collect();
    tree.check_removable(guid, &referenced)
}
