pub mod models;
pub mod services;

pub use models::{
    CardBrand, Cancellation, DeclineReason, Order, PaymentSource, PaymentTerms, RawCardData,
    TokenReference, Transaction, TransactionKind, TransactionRequest, TransactionStatus,
};
pub use services::TransactionService;
