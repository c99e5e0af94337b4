//! Checkout session that runs engine requests against the equipment service.

use crate::core::{merge_history_page, ActingUser, Decision, EquipmentSnapshot, HistoryPage};
use crate::effects::gateway::EquipmentGateway;
use crate::engine::{CheckoutError, Engine, RemoteError};
use crate::enforcement::{collect_failures, validate_snapshot};
use crate::projection::{project, Section, SessionFlags};
use chrono::{DateTime, Utc};
use stillwater::effect::Effect;
use stillwater::prelude::*;

/// Fresh data produced by running a session effect.
///
/// `None` fields leave the session's current value in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionUpdate {
    pub snapshot: Option<EquipmentSnapshot>,
    pub history: Option<HistoryPage>,
}

/// Caller-owned state for one equipment detail view.
///
/// The session holds the most recent snapshot, any loaded history and the
/// display flags. Remote work is described as effects built from the
/// current state; after running one, call [`CheckoutSession::apply`] with
/// its output. At most one mutating effect should be outstanding per item.
#[derive(Clone, Debug)]
pub struct CheckoutSession {
    user: ActingUser,
    snapshot: EquipmentSnapshot,
    history: Option<HistoryPage>,
    flags: SessionFlags,
    engine: Engine,
}

fn remote<T>(
    result: Result<T, RemoteError>,
    action: &str,
    equipment_id: &str,
) -> Result<T, CheckoutError> {
    result.map_err(|error| {
        tracing::warn!(equipment_id, action, error = %error, "remote operation failed");
        CheckoutError::from(error)
    })
}

fn fetch_checked<Env: EquipmentGateway>(
    env: &Env,
    equipment_id: &str,
) -> Result<EquipmentSnapshot, CheckoutError> {
    let snapshot = remote(
        env.fetch_snapshot(equipment_id),
        "fetch snapshot",
        equipment_id,
    )?;
    for violation in collect_failures(validate_snapshot(&snapshot)) {
        tracing::warn!(equipment_id, %violation, "snapshot breaks data model invariant");
    }
    Ok(snapshot)
}

/// Reload the newest history page when history is already on screen.
fn reload_history<Env: EquipmentGateway>(
    env: &Env,
    equipment_id: &str,
    loaded: bool,
) -> Result<Option<HistoryPage>, CheckoutError> {
    if !loaded {
        return Ok(None);
    }
    let page = remote(
        env.fetch_history_page(equipment_id, None),
        "fetch history",
        equipment_id,
    )?;
    Ok(Some(page))
}

impl CheckoutSession {
    pub fn new(user: ActingUser, snapshot: EquipmentSnapshot, engine: Engine) -> Self {
        Self {
            user,
            snapshot,
            history: None,
            flags: SessionFlags::default(),
            engine,
        }
    }

    /// Open a session for `equipment_id` as the service's current user.
    pub fn open<Env>(
        equipment_id: &str,
        engine: Engine,
    ) -> impl Effect<Output = CheckoutSession, Error = CheckoutError, Env = Env>
    where
        Env: EquipmentGateway + Clone + Send + Sync + 'static,
    {
        let equipment_id = equipment_id.to_string();
        from_fn(move |env: &Env| -> Result<CheckoutSession, CheckoutError> {
            let user = remote(
                env.current_acting_user(),
                "fetch acting user",
                &equipment_id,
            )?;
            let snapshot = fetch_checked(env, &equipment_id)?;
            Ok(CheckoutSession::new(user, snapshot, engine.clone()))
        })
    }

    pub fn user(&self) -> &ActingUser {
        &self.user
    }

    pub fn snapshot(&self) -> &EquipmentSnapshot {
        &self.snapshot
    }

    pub fn history(&self) -> Option<&HistoryPage> {
        self.history.as_ref()
    }

    pub fn flags(&self) -> SessionFlags {
        self.flags
    }

    pub fn toggle_password(&mut self) {
        self.flags.toggle_password();
    }

    /// Current decision for the session's user (pure)
    pub fn decision(&self) -> Decision {
        self.engine.evaluate(&self.snapshot, &self.user)
    }

    /// Current display sections (pure)
    pub fn sections(&self) -> Vec<Section> {
        project(
            &self.snapshot,
            &self.decision(),
            self.history.as_ref(),
            &self.flags,
        )
    }

    /// Apply the output of a session effect.
    pub fn apply(&mut self, update: SessionUpdate) {
        if let Some(snapshot) = update.snapshot {
            self.snapshot = snapshot;
        }
        if let Some(history) = update.history {
            self.history = Some(history);
        }
    }

    /// Re-read the snapshot, and the newest history page if history is loaded.
    pub fn refresh<Env>(
        &self,
    ) -> impl Effect<Output = SessionUpdate, Error = CheckoutError, Env = Env>
    where
        Env: EquipmentGateway + Clone + Send + Sync + 'static,
    {
        let equipment_id = self.snapshot.id.clone();
        let history_loaded = self.history.is_some();
        from_fn(move |env: &Env| -> Result<SessionUpdate, CheckoutError> {
            let snapshot = fetch_checked(env, &equipment_id)?;
            let history = reload_history(env, &equipment_id, history_loaded)?;
            Ok(SessionUpdate {
                snapshot: Some(snapshot),
                history,
            })
        })
    }

    /// Load the next older history page and merge it with what is loaded.
    ///
    /// Does nothing once the loaded history reports no more pages.
    pub fn load_more_history<Env>(
        &self,
    ) -> impl Effect<Output = SessionUpdate, Error = CheckoutError, Env = Env>
    where
        Env: EquipmentGateway + Clone + Send + Sync + 'static,
    {
        let equipment_id = self.snapshot.id.clone();
        let existing = self.history.clone();
        from_fn(move |env: &Env| -> Result<SessionUpdate, CheckoutError> {
            if existing.as_ref().is_some_and(|page| !page.has_more()) {
                return Ok(SessionUpdate::default());
            }
            let cursor = existing.as_ref().and_then(HistoryPage::next_cursor);
            let page = remote(
                env.fetch_history_page(&equipment_id, cursor.as_ref()),
                "fetch history",
                &equipment_id,
            )?;
            Ok(SessionUpdate {
                snapshot: None,
                history: Some(merge_history_page(existing.as_ref(), &page)),
            })
        })
    }

    /// Check the item out to the session's user.
    ///
    /// The conflict check runs against a snapshot fetched by this effect,
    /// not the session's copy.
    pub fn checkout<Env>(
        &self,
        expected_return_date: Option<DateTime<Utc>>,
    ) -> impl Effect<Output = SessionUpdate, Error = CheckoutError, Env = Env>
    where
        Env: EquipmentGateway + Clone + Send + Sync + 'static,
    {
        let engine = self.engine.clone();
        let user = self.user.clone();
        let equipment_id = self.snapshot.id.clone();
        let history_loaded = self.history.is_some();
        from_fn(move |env: &Env| -> Result<SessionUpdate, CheckoutError> {
            let fresh = fetch_checked(env, &equipment_id)?;
            let operation = engine.request_checkout(&fresh, &user, expected_return_date)?;

            tracing::info!(
                equipment_id = %equipment_id,
                holder_id = %user.id,
                expected_return_date = ?operation.expected_return_date(),
                "submitting checkout"
            );
            let snapshot = remote(env.submit_checkout(&operation), "checkout", &equipment_id)?;
            let history = reload_history(env, &equipment_id, history_loaded)?;

            Ok(SessionUpdate {
                snapshot: Some(snapshot),
                history,
            })
        })
    }

    /// Return the session user's hold on the item.
    pub fn return_equipment<Env>(
        &self,
    ) -> impl Effect<Output = SessionUpdate, Error = CheckoutError, Env = Env>
    where
        Env: EquipmentGateway + Clone + Send + Sync + 'static,
    {
        let engine = self.engine.clone();
        let user = self.user.clone();
        let snapshot = self.snapshot.clone();
        let history_loaded = self.history.is_some();
        from_fn(move |env: &Env| -> Result<SessionUpdate, CheckoutError> {
            let operation = engine.request_return(&snapshot, &user)?;

            tracing::info!(equipment_id = %snapshot.id, holder_id = %user.id, "submitting return");
            let updated = remote(env.submit_return(&operation), "return", &snapshot.id)?;
            let history = reload_history(env, &snapshot.id, history_loaded)?;

            Ok(SessionUpdate {
                snapshot: Some(updated),
                history,
            })
        })
    }

    /// Move the return date of the session user's Singleton hold.
    pub fn update_return_date<Env>(
        &self,
        new_date: DateTime<Utc>,
    ) -> impl Effect<Output = SessionUpdate, Error = CheckoutError, Env = Env>
    where
        Env: EquipmentGateway + Clone + Send + Sync + 'static,
    {
        let engine = self.engine.clone();
        let user = self.user.clone();
        let snapshot = self.snapshot.clone();
        let history_loaded = self.history.is_some();
        from_fn(move |env: &Env| -> Result<SessionUpdate, CheckoutError> {
            let operation = engine.request_return_date_update(&snapshot, &user, new_date)?;

            tracing::info!(
                equipment_id = %snapshot.id,
                holder_id = %user.id,
                new_return_date = %new_date,
                "submitting return date update"
            );
            let updated = remote(
                env.submit_return_date_update(&operation),
                "update return date",
                &snapshot.id,
            )?;
            let history = reload_history(env, &snapshot.id, history_loaded)?;

            Ok(SessionUpdate {
                snapshot: Some(updated),
                history,
            })
        })
    }
}
