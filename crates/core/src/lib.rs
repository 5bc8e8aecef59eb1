pub mod category;
pub mod money;
pub mod raw;
pub mod summary;
pub mod transaction;

pub use money::Money;
pub use raw::RawRecord;
pub use summary::{CategoryTotal, MonthlyTotal, Summary};
pub use transaction::{ImportBatch, NewTransaction, Transaction};
