use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of money for both categories and transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "INCOME",
            EntryKind::Expense => "EXPENSE",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(EntryKind::Income),
            "EXPENSE" => Ok(EntryKind::Expense),
            other => Err(format!("Unknown kind '{}', expected INCOME or EXPENSE", other)),
        }
    }
}
