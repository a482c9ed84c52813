use pgw_common::PaymentStatus;

use crate::{
    db_types::{NewUserPayment, UserPayment},
    traits::StoreError,
};

#[allow(async_fn_in_trait)]
pub trait UserPaymentStore {
    /// Assigns an invoice to a user. New assignments start out as `pending`.
    ///
    /// This call is idempotent: if the user already holds the invoice, the existing record is returned unchanged.
    async fn insert_user_payment(&self, payment: NewUserPayment) -> Result<UserPayment, StoreError>;

    async fn fetch_user_payment(&self, user_id: &str, invoice_id: &str) -> Result<Option<UserPayment>, StoreError>;

    /// All the payments assigned to the user, most recent first.
    async fn fetch_payments_for_user(&self, user_id: &str) -> Result<Vec<UserPayment>, StoreError>;

    async fn update_user_payment_status(
        &self,
        user_id: &str,
        invoice_id: &str,
        status: &PaymentStatus,
    ) -> Result<(), StoreError>;

    /// Sets the status of every assignment of the invoice, returning the number of records changed.
    async fn update_status_for_invoice(&self, invoice_id: &str, status: &PaymentStatus) -> Result<u64, StoreError>;
}
