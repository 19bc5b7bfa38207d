pub mod request;
pub mod transaction;

pub use request::{
    CardBrand, Order, PaymentSource, PaymentTerms, RawCardData, TokenReference, TransactionKind,
    TransactionRequest,
};
pub use transaction::{Cancellation, DeclineReason, Transaction, TransactionStatus};
