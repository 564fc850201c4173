//! Domain logic of the shared-expense ledger.
//!
//! The [`Engine`] validates input and persists users, groups, debts and
//! equally split transactions through sea-orm.

pub use debts::{Debt, DebtChanges, DebtFilter, DebtStatus, DebtSummary, NewDebt};
pub use error::EngineError;
pub use groups::{Group, GroupSummary};
pub use ops::{Engine, EngineBuilder};
pub use repository::{SqlTransactionRepository, TransactionRepository};
pub use split::equal_split;
pub use transactions::{NewTransaction, Participant, Transaction};
pub use users::User;
pub use validation::is_valid_email;

mod debts;
mod error;
mod group_members;
mod groups;
mod ops;
mod repository;
mod split;
mod transaction_participants;
mod transactions;
mod users;
mod validation;

pub type ResultEngine<T> = Result<T, EngineError>;
