//! Checkout Walkthrough
//!
//! This demo drives a checkout session against an in-memory equipment
//! service.
//!
//! Key concepts:
//! - Opening a session from the service
//! - Checking out, extending and returning a Singleton item
//! - Rejected requests and their recovery hints
//! - Rendering the projected sections
//!
//! Run with: cargo run --example checkout_walkthrough

use chrono::{Duration, Utc};
use equipment_checkout::core::{
    ActingUser, EquipmentKind, EquipmentSnapshot, HistoryCursor, HistoryPage, HoldRecord,
};
use equipment_checkout::effects::{CheckoutSession, EquipmentGateway};
use equipment_checkout::engine::{
    CheckoutOperation, Engine, RemoteError, ReturnOperation, UpdateOperation,
};
use equipment_checkout::enforcement::RulesConfig;
use equipment_checkout::projection::{RowDescriptor, Section};
use std::sync::{Arc, Mutex};
use stillwater::effect::Effect;

#[derive(Clone)]
struct LabService {
    user: String,
    item: Arc<Mutex<EquipmentSnapshot>>,
    past: Arc<Mutex<Vec<HoldRecord>>>,
}

impl LabService {
    fn new(user: &str, item: EquipmentSnapshot) -> Self {
        Self {
            user: user.to_string(),
            item: Arc::new(Mutex::new(item)),
            past: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn lock_item(&self) -> Result<std::sync::MutexGuard<'_, EquipmentSnapshot>, RemoteError> {
        self.item
            .lock()
            .map_err(|_| RemoteError::new("item store poisoned"))
    }
}

impl EquipmentGateway for LabService {
    fn current_acting_user(&self) -> Result<ActingUser, RemoteError> {
        Ok(ActingUser::new(self.user.clone()))
    }

    fn fetch_snapshot(&self, _equipment_id: &str) -> Result<EquipmentSnapshot, RemoteError> {
        Ok(self.lock_item()?.clone())
    }

    fn fetch_history_page(
        &self,
        _equipment_id: &str,
        _cursor: Option<&HistoryCursor>,
    ) -> Result<HistoryPage, RemoteError> {
        let mut records = self
            .past
            .lock()
            .map_err(|_| RemoteError::new("history store poisoned"))?
            .clone();
        records.extend(self.lock_item()?.current_holders.iter().cloned());
        Ok(HistoryPage::new(records, false))
    }

    fn submit_checkout(
        &self,
        operation: &CheckoutOperation,
    ) -> Result<EquipmentSnapshot, RemoteError> {
        let mut item = self.lock_item()?;
        let hold = HoldRecord::active(
            operation.holder_id(),
            "Ada Lovelace",
            Utc::now(),
            operation.expected_return_date(),
        );
        *item = item.with_holder(hold);
        Ok(item.clone())
    }

    fn submit_return(&self, operation: &ReturnOperation) -> Result<EquipmentSnapshot, RemoteError> {
        let mut item = self.lock_item()?;
        let position = item
            .current_holders
            .iter()
            .position(|h| h.holder_id == operation.holder_id())
            .ok_or_else(|| RemoteError::new("no such hold"))?;
        let closed = item.current_holders.remove(position).closed_at(Utc::now());
        item.last_hold = Some(closed.clone());
        self.past
            .lock()
            .map_err(|_| RemoteError::new("history store poisoned"))?
            .push(closed);
        Ok(item.clone())
    }

    fn submit_return_date_update(
        &self,
        operation: &UpdateOperation,
    ) -> Result<EquipmentSnapshot, RemoteError> {
        let mut item = self.lock_item()?;
        for hold in item
            .current_holders
            .iter_mut()
            .filter(|h| h.holder_id == operation.holder_id())
        {
            hold.expected_return_date = Some(operation.new_return_date());
        }
        Ok(item.clone())
    }
}

fn render(sections: &[Section]) {
    for section in sections {
        println!("  [{}]", section.title.as_deref().unwrap_or("-"));
        for row in &section.rows {
            match row {
                RowDescriptor::Identity { name, detail, .. } => println!("    {name} ({detail})"),
                RowDescriptor::ReturnDate { current } => {
                    println!("    Return by {}", current.format("%Y-%m-%d"))
                }
                RowDescriptor::Password { text, .. } => println!("    Password: {text}"),
                RowDescriptor::Note { field, value } => println!("    {}: {value}", field.label()),
                RowDescriptor::Hold {
                    tag, holder_name, ..
                } => println!("    {tag:?}: {holder_name}"),
                RowDescriptor::LoadMore => println!("    Load more..."),
                RowDescriptor::Holder {
                    holder_name,
                    occurrence_label,
                    ..
                } => println!(
                    "    {holder_name} {}",
                    occurrence_label.as_deref().unwrap_or("")
                ),
                RowDescriptor::Action { action, enabled } => {
                    println!("    {action:?} (enabled: {enabled})")
                }
            }
        }
    }
}

#[tokio::main]
async fn main() {
    println!("=== Checkout Walkthrough ===\n");

    let mut item = EquipmentSnapshot::new("eq-42", "Thermal camera", EquipmentKind::Singleton);
    item.make = Some("FLIR".to_string());
    item.model = Some("E8".to_string());
    item.serial_number = Some("FL-0042".to_string());
    item.password = Some("hunter2".to_string());
    let service = LabService::new("ada", item);

    let rules = match RulesConfig::from_json(r#"{ "max_loan_days": 14 }"#) {
        Ok(config) => config.into_builder().build(),
        Err(e) => {
            println!("Bad rules config: {e}");
            return;
        }
    };

    let mut session = match CheckoutSession::open::<LabService>("eq-42", Engine::new(rules))
        .run(&service)
        .await
    {
        Ok(session) => session,
        Err(e) => {
            println!("Could not open item: {e}");
            return;
        }
    };

    println!("1. Freshly opened:");
    render(&session.sections());

    println!("\n2. Asking for a 30 day loan:");
    let too_long = Utc::now() + Duration::days(30);
    match session.checkout::<LabService>(Some(too_long)).run(&service).await {
        Ok(update) => session.apply(update),
        Err(e) => println!("  Rejected: {e} -> {:?}", e.recovery()),
    }

    println!("\n3. Checking out for a week:");
    let due = Utc::now() + Duration::days(7);
    match session.checkout::<LabService>(Some(due)).run(&service).await {
        Ok(update) => session.apply(update),
        Err(e) => println!("  Rejected: {e}"),
    }
    session.toggle_password();
    render(&session.sections());

    println!("\n4. Extending by three days:");
    match session
        .update_return_date::<LabService>(due + Duration::days(3))
        .run(&service)
        .await
    {
        Ok(update) => session.apply(update),
        Err(e) => println!("  Rejected: {e}"),
    }

    println!("\n5. Returning:");
    match session.return_equipment::<LabService>().run(&service).await {
        Ok(update) => session.apply(update),
        Err(e) => println!("  Rejected: {e}"),
    }
    match session.load_more_history::<LabService>().run(&service).await {
        Ok(update) => session.apply(update),
        Err(e) => println!("  History unavailable: {e}"),
    }
    render(&session.sections());

    println!("\n=== Walkthrough Complete ===");
}
