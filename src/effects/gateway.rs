//! Contract of the external equipment service.

use crate::core::{ActingUser, EquipmentSnapshot, HistoryCursor, HistoryPage};
use crate::engine::{CheckoutOperation, RemoteError, ReturnOperation, UpdateOperation};

/// Environment capability for talking to the equipment service.
///
/// Implementations own transport, authentication and persistence. Every
/// mutating call returns the item's snapshot as it stands after the change;
/// conflicting writes against a stale view must be rejected here, since the
/// engine only checks the snapshot it was given.
pub trait EquipmentGateway {
    fn current_acting_user(&self) -> Result<ActingUser, RemoteError>;

    fn fetch_snapshot(&self, equipment_id: &str) -> Result<EquipmentSnapshot, RemoteError>;

    /// Fetch history older than `cursor`, or the newest page when `None`.
    fn fetch_history_page(
        &self,
        equipment_id: &str,
        cursor: Option<&HistoryCursor>,
    ) -> Result<HistoryPage, RemoteError>;

    fn submit_checkout(
        &self,
        operation: &CheckoutOperation,
    ) -> Result<EquipmentSnapshot, RemoteError>;

    fn submit_return(&self, operation: &ReturnOperation) -> Result<EquipmentSnapshot, RemoteError>;

    fn submit_return_date_update(
        &self,
        operation: &UpdateOperation,
    ) -> Result<EquipmentSnapshot, RemoteError>;
}
