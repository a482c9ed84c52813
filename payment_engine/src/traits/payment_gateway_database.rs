use crate::traits::{TransactionStore, UserPaymentStore};

/// The highest level of behaviour for backends supporting the payment gateway.
///
/// Any type that is both a [`TransactionStore`] and a [`UserPaymentStore`] qualifies.
pub trait PaymentGatewayDatabase: TransactionStore + UserPaymentStore {}

impl<T> PaymentGatewayDatabase for T where T: TransactionStore + UserPaymentStore {}
