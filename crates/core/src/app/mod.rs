pub mod ledger;
pub mod locks;
