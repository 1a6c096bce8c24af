//! Accounts and the account tree.
//!
//! Accounts form a tree rooted at exactly one `Root` account. The tree
//! shape is untrusted input (it comes from storage), so it is checked
//! once by [`AccountTree::build`]; the aggregator and the validators
//! then work against the checked index.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

use crate::intern::Symbol;

/// Account category, driving sign conventions and aggregation
/// roll-ups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    /// The single tree root. Holds no transactions.
    Root,
    /// Generic asset.
    Asset,
    /// Bank account (asset).
    Bank,
    /// Physical cash (asset).
    Cash,
    /// Generic liability.
    Liability,
    /// Credit card (liability).
    Credit,
    /// Income category.
    Income,
    /// Expense category.
    Expense,
    /// Equity (opening balances and the like).
    Equity,
    /// Stock holding.
    Stock,
    /// Mutual fund holding.
    Mutual,
    /// Currency trading account.
    Trading,
}

impl AccountType {
    /// Whether splits may be posted alone against this account type.
    ///
    /// Investment accounts allow single-split transactions: the
    /// offsetting leg lives outside the ledger (brokerage-held cost
    /// basis).
    #[must_use]
    pub const fn is_investment(self) -> bool {
        matches!(self, Self::Stock | Self::Mutual)
    }

    /// Sign convention for split values posted to this account type.
    #[must_use]
    pub const fn sign_constraint(self) -> Option<SignConstraint> {
        match self {
            Self::Income => Some(SignConstraint::NonPositive),
            Self::Expense => Some(SignConstraint::NonNegative),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Root => "ROOT",
            Self::Asset => "ASSET",
            Self::Bank => "BANK",
            Self::Cash => "CASH",
            Self::Liability => "LIABILITY",
            Self::Credit => "CREDIT",
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
            Self::Equity => "EQUITY",
            Self::Stock => "STOCK",
            Self::Mutual => "MUTUAL",
            Self::Trading => "TRADING",
        };
        write!(f, "{s}")
    }
}

/// The sign a split value must carry on a constrained account.
///
/// Income increases wealth through negative-value splits balancing
/// positive-value asset splits, so income is capped at zero from above
/// and expenses from below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignConstraint {
    /// Value must be `<= 0` (income accounts).
    NonPositive,
    /// Value must be `>= 0` (expense accounts).
    NonNegative,
}

/// An account node as supplied by storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable identity.
    pub guid: String,
    /// Parent guid; `None` only for the root.
    pub parent: Option<String>,
    /// Category of the account.
    pub account_type: AccountType,
    /// Commodity the account is denominated in.
    pub commodity: Symbol,
    /// Guids of direct children. Must agree with the children's
    /// `parent` back-pointers.
    pub children: Vec<String>,
    /// Placeholder accounts hold no direct splits, only aggregated
    /// children.
    pub placeholder: bool,
}

impl Account {
    /// Create a leaf account with no children.
    pub fn new(
        guid: impl Into<String>,
        parent: Option<String>,
        account_type: AccountType,
        commodity: impl Into<Symbol>,
    ) -> Self {
        Self {
            guid: guid.into(),
            parent,
            account_type,
            commodity: commodity.into(),
            children: Vec::new(),
            placeholder: false,
        }
    }

    /// Mark as a placeholder.
    #[must_use]
    pub fn placeholder(mut self) -> Self {
        self.placeholder = true;
        self
    }

    /// Set the children guids.
    #[must_use]
    pub fn with_children(mut self, children: Vec<String>) -> Self {
        self.children = children;
        self
    }
}

/// Structural violations in a proposed account forest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// No account of type `Root` present.
    #[error("account tree has no ROOT account")]
    NoRoot,
    /// More than one `Root` account present.
    #[error("account tree has multiple ROOT accounts: {first} and {second}")]
    MultipleRoots {
        /// First root found.
        first: String,
        /// Second root found.
        second: String,
    },
    /// Two accounts share a guid.
    #[error("duplicate account guid {guid}")]
    DuplicateGuid {
        /// The repeated guid.
        guid: String,
    },
    /// An account names a parent that does not exist.
    #[error("account {guid} references unknown parent {parent}")]
    UnknownParent {
        /// Child account.
        guid: String,
        /// Missing parent guid.
        parent: String,
    },
    /// A non-root account has no parent, or parent chains loop.
    #[error("account {guid} is part of a parent cycle or detached from the root")]
    Cycle {
        /// Account on the broken chain.
        guid: String,
    },
    /// `children` does not match the set of accounts pointing at this
    /// parent.
    #[error("account {guid} children list disagrees with parent back-pointers")]
    ChildrenMismatch {
        /// The inconsistent parent.
        guid: String,
    },
    /// Deletion guard: the account still has splits posted to it.
    #[error("account {guid} is referenced by existing splits and cannot be removed")]
    AccountInUse {
        /// The account still in use.
        guid: String,
    },
}

/// A checked, indexed account tree.
#[derive(Debug, Clone)]
pub struct AccountTree {
    accounts: HashMap<String, Account>,
    root: String,
}

impl AccountTree {
    /// Build and verify a tree from a flat account list.
    ///
    /// Checks: unique guids, exactly one root, resolvable parents, no
    /// parent cycles, and `children` lists consistent with the
    /// accounts' `parent` fields.
    pub fn build(accounts: Vec<Account>) -> Result<Self, TreeError> {
        let mut index: HashMap<String, Account> = HashMap::with_capacity(accounts.len());
        let mut root: Option<String> = None;

        for account in accounts {
            if account.account_type == AccountType::Root {
                if let Some(first) = &root {
                    return Err(TreeError::MultipleRoots {
                        first: first.clone(),
                        second: account.guid,
                    });
                }
                root = Some(account.guid.clone());
            }
            let guid = account.guid.clone();
            if index.insert(guid.clone(), account).is_some() {
                return Err(TreeError::DuplicateGuid { guid });
            }
        }

        let root = root.ok_or(TreeError::NoRoot)?;

        // Parents resolve, and every parent chain terminates at the root.
        for account in index.values() {
            match &account.parent {
                None => {
                    if account.guid != root {
                        return Err(TreeError::Cycle {
                            guid: account.guid.clone(),
                        });
                    }
                }
                Some(parent) => {
                    if !index.contains_key(parent) {
                        return Err(TreeError::UnknownParent {
                            guid: account.guid.clone(),
                            parent: parent.clone(),
                        });
                    }
                    let mut seen = HashSet::new();
                    let mut cursor = account;
                    while let Some(parent) = &cursor.parent {
                        if !seen.insert(cursor.guid.clone()) {
                            return Err(TreeError::Cycle {
                                guid: account.guid.clone(),
                            });
                        }
                        match index.get(parent) {
                            Some(next) => cursor = next,
                            None => {
                                return Err(TreeError::UnknownParent {
                                    guid: cursor.guid.clone(),
                                    parent: parent.clone(),
                                })
                            }
                        }
                    }
                    if cursor.guid != root {
                        return Err(TreeError::Cycle {
                            guid: account.guid.clone(),
                        });
                    }
                }
            }
        }

        // children lists agree with parent back-pointers.
        for account in index.values() {
            let declared: HashSet<&str> = account.children.iter().map(String::as_str).collect();
            if declared.len() != account.children.len() {
                return Err(TreeError::ChildrenMismatch {
                    guid: account.guid.clone(),
                });
            }
            let actual: HashSet<&str> = index
                .values()
                .filter(|a| a.parent.as_deref() == Some(account.guid.as_str()))
                .map(|a| a.guid.as_str())
                .collect();
            if declared != actual {
                return Err(TreeError::ChildrenMismatch {
                    guid: account.guid.clone(),
                });
            }
        }

        Ok(Self { accounts: index, root })
    }

    /// Guid of the root account.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Look up an account by guid.
    #[must_use]
    pub fn get(&self, guid: &str) -> Option<&Account> {
        self.accounts.get(guid)
    }

    /// Iterate over all accounts.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Number of accounts in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the tree holds only the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.len() <= 1
    }

    /// Check that an account may be removed: it must exist and no
    /// split may still reference it.
    pub fn check_removable(
        &self,
        guid: &str,
        referenced: &HashSet<String>,
    ) -> Result<(), TreeError> {
        if referenced.contains(guid) {
            return Err(TreeError::AccountInUse {
                guid: guid.to_string(),
            });
        }
        Ok(())
    }
}
