//! The client-side profile store.
//!
//! `ProfileStore` keeps every profile known on the device and the name of the
//! active user. Each mutation goes through [`ProfileStore::update`], which
//! writes the new state through the injected [`ProfilePersistence`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{OrbitError, OrbitResult},
    models::profile::{DayOfWeek, UserProfile},
};

/// Everything the device keeps between sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub active_user: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, UserProfile>,
}

#[async_trait]
pub trait ProfilePersistence: Send + Sync {
    async fn load(&self) -> eyre::Result<PersistedState>;
    async fn save(&self, state: &PersistedState) -> eyre::Result<()>;
}

pub struct ProfileStore<P> {
    persistence: P,
    state: PersistedState,
}

impl<P: ProfilePersistence> ProfileStore<P> {
    pub async fn open(persistence: P) -> OrbitResult<Self> {
        let mut state = persistence.load().await?;
        state.profiles.values_mut().for_each(UserProfile::normalize);
        Ok(Self { persistence, state })
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    /// Makes `username` the active user, creating an empty profile on first use.
    pub async fn login(&mut self, username: &str, today: NaiveDate) -> OrbitResult<&UserProfile> {
        let username = username.trim();
        if username.is_empty() {
            return Err(OrbitError::Validation("Username must not be empty".into()));
        }

        self.state
            .profiles
            .entry(username.to_string())
            .or_insert_with(|| UserProfile::new(username, today));
        self.state.active_user = Some(username.to_string());
        self.persistence.save(&self.state).await?;

        self.active()
            .ok_or_else(|| OrbitError::NotFound(format!("Profile {} not found", username)))
    }

    pub async fn logout(&mut self) -> OrbitResult<()> {
        self.state.active_user = None;
        self.persistence.save(&self.state).await?;
        Ok(())
    }

    pub fn active(&self) -> Option<&UserProfile> {
        let username = self.state.active_user.as_ref()?;
        self.state.profiles.get(username)
    }

    /// Applies `change` to the active profile and persists the result.
    ///
    /// The profile is left untouched when `change` fails or the new state
    /// cannot be saved.
    pub async fn update<F, R>(&mut self, change: F) -> OrbitResult<R>
    where
        F: FnOnce(&mut UserProfile) -> OrbitResult<R>,
    {
        let username = self
            .state
            .active_user
            .clone()
            .ok_or_else(|| OrbitError::Authentication("No active user".into()))?;
        let profile = self
            .state
            .profiles
            .get_mut(&username)
            .ok_or_else(|| OrbitError::NotFound(format!("Profile {} not found", username)))?;

        let mut draft = profile.clone();
        let result = change(&mut draft)?;
        let previous = std::mem::replace(profile, draft);

        if let Err(e) = self.persistence.save(&self.state).await {
            self.state.profiles.insert(username, previous);
            return Err(e.into());
        }
        Ok(result)
    }

    /// Toggles a task on `date`'s weekday and refreshes that day's counters.
    pub async fn toggle_task(&mut self, date: NaiveDate, task_id: &str) -> OrbitResult<bool> {
        self.update(|profile| {
            let done = profile.toggle_slot(DayOfWeek::of(date), task_id)?;
            profile.refresh_daily_stat(date);
            Ok(done)
        })
        .await
    }

    pub async fn toggle_water(&mut self, date: NaiveDate, slot_id: &str) -> OrbitResult<bool> {
        self.update(|profile| profile.water_config.toggle(slot_id, date))
            .await
    }

    /// Replaces a stored profile, e.g. with the copy pulled from the server.
    pub async fn replace(&mut self, mut profile: UserProfile) -> OrbitResult<()> {
        profile.normalize();
        self.state.profiles.insert(profile.username.clone(), profile);
        self.persistence.save(&self.state).await?;
        Ok(())
    }

    pub async fn remove(&mut self, username: &str) -> OrbitResult<UserProfile> {
        let profile = self
            .state
            .profiles
            .remove(username)
            .ok_or_else(|| OrbitError::NotFound(format!("Profile {} not found", username)))?;
        if self.state.active_user.as_deref() == Some(username) {
            self.state.active_user = None;
        }
        self.persistence.save(&self.state).await?;
        Ok(profile)
    }
}
