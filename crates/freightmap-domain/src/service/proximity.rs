//! Nearby cargo notifications
//!
//! Every marker-list update is diffed against the cargo ids seen on the
//! previous update. Cargo that is new and within the radius of the viewer
//! produces a notification. Each admitted notification carries a ticket;
//! the owner arms one expiry timer per ticket and calls [`ProximityNotifier::expire`]
//! when it fires.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use freightmap_types::{GeoPoint, Marker};

use super::geo::haversine_km;

/// Default notification radius (km)
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Nearest new cargo admitted per update
pub const MAX_NEW_PER_UPDATE: usize = 3;

/// Notifications retained in the rolling history
pub const HISTORY_CAPACITY: usize = 5;

/// A new cargo offer close to the viewer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityNotification {
    /// Same as the cargo marker id
    pub id: String,
    pub cargo: Marker,
    pub distance_km: f64,
    /// Identifies this admission; a later admission of the same id gets a new one
    pub ticket: u64,
}

#[derive(Debug, Clone)]
pub struct ProximityNotifier {
    radius_km: f64,
    previous_cargo_ids: HashSet<String>,
    history: Vec<ProximityNotification>,
    /// id -> ticket of the admission currently shown
    visible: HashMap<String, u64>,
    next_ticket: u64,
}

impl Default for ProximityNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS_KM)
    }
}

impl ProximityNotifier {
    pub fn new(radius_km: f64) -> Self {
        Self {
            radius_km,
            previous_cargo_ids: HashSet::new(),
            history: Vec::new(),
            visible: HashMap::new(),
            next_ticket: 1,
        }
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Process a marker-list update and return the notifications admitted by it.
    ///
    /// Without a known location nothing happens at all, not even the
    /// bookkeeping of seen ids.
    pub fn observe(&mut self, markers: &[Marker], user_location: Option<GeoPoint>) -> Vec<ProximityNotification> {
        let Some(location) = user_location else {
            return Vec::new();
        };

        let cargos: Vec<&Marker> = markers.iter().filter(|m| m.is_cargo()).collect();

        let mut nearby: Vec<(f64, &Marker)> = cargos
            .iter()
            .filter(|cargo| !self.previous_cargo_ids.contains(&cargo.id))
            .map(|cargo| (haversine_km(location, cargo.position()), *cargo))
            .filter(|(distance, _)| *distance <= self.radius_km)
            .collect();
        nearby.sort_by(|a, b| a.0.total_cmp(&b.0));
        nearby.truncate(MAX_NEW_PER_UPDATE);

        let admitted: Vec<ProximityNotification> = nearby
            .into_iter()
            .map(|(distance_km, cargo)| {
                let ticket = self.next_ticket;
                self.next_ticket += 1;
                ProximityNotification {
                    id: cargo.id.clone(),
                    cargo: cargo.clone(),
                    distance_km,
                    ticket,
                }
            })
            .collect();

        if !admitted.is_empty() {
            for notification in &admitted {
                self.visible.insert(notification.id.clone(), notification.ticket);
            }
            let mut history = admitted.clone();
            history.append(&mut self.history);
            history.truncate(HISTORY_CAPACITY);
            self.history = history;
            log::debug!("{} nearby cargo notification(s) admitted", admitted.len());
        }

        self.previous_cargo_ids = cargos.iter().map(|c| c.id.clone()).collect();
        admitted
    }

    /// Hide a notification when its own timer fires.
    ///
    /// A stale ticket (the id was admitted again since) is ignored.
    pub fn expire(&mut self, id: &str, ticket: u64) -> bool {
        if self.visible.get(id) == Some(&ticket) {
            self.visible.remove(id);
            log::debug!("Notification {} expired", id);
            true
        } else {
            false
        }
    }

    /// Hide a notification on user request
    pub fn dismiss(&mut self, id: &str) -> bool {
        self.visible.remove(id).is_some()
    }

    /// Rolling history, newest first
    pub fn history(&self) -> &[ProximityNotification] {
        &self.history
    }

    /// Notifications currently shown, newest first
    pub fn active(&self) -> Vec<&ProximityNotification> {
        self.history
            .iter()
            .filter(|n| self.visible.get(&n.id) == Some(&n.ticket))
            .collect()
    }
}
