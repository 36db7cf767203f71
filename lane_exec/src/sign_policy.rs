//! # Sign policy
//!
//! Reacts to traffic signs reported by an external detector by changing the
//! speed setting. Stop signs and red lights stop the car for a fixed time
//! before driving on at normal speed.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::tc::{SignDetection, SpeedMode};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the sign policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Detections at or below this confidence are ignored
    pub min_confidence: f64,

    /// Time after an accepted detection during which further detections are
    /// ignored.
    ///
    /// Units: seconds
    pub cooldown_s: f64,

    /// How long a stop action holds the car stopped.
    ///
    /// Units: seconds
    pub stop_hold_s: f64,

    /// Action for each sign label, labels are matched lowercase
    pub actions: HashMap<String, SignAction>,
}

/// Sign policy state.
#[derive(Debug, Default)]
pub struct SignPolicy {
    params: Params,

    /// Time of the last accepted detection
    last_accepted_s: Option<f64>,

    /// End of the current stop hold
    hold_until_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// What to do when a sign is seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignAction {
    /// Stop for the hold time, then continue at normal speed
    Stop,
    Fast,
    Normal,
    Slow,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        let actions = [
            ("stop_sign", SignAction::Stop),
            ("red_light", SignAction::Stop),
            ("green_light", SignAction::Fast),
            ("speed_30", SignAction::Slow),
            ("speed_50", SignAction::Normal),
        ]
        .iter()
        .map(|(l, a)| (l.to_string(), *a))
        .collect();

        Self {
            min_confidence: 0.7,
            cooldown_s: 2.0,
            stop_hold_s: 3.0,
            actions,
        }
    }
}

impl SignPolicy {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// Handle a detection at session time `now_s`.
    ///
    /// Returns the speed setting to switch to, or `None` if the detection is
    /// ignored.
    pub fn on_detection(&mut self, det: &SignDetection, now_s: f64) -> Option<SpeedMode> {
        if det.confidence <= self.params.min_confidence {
            debug!("Ignoring {} sign, confidence {:.2}", det.label, det.confidence);
            return None;
        }

        if self.is_holding() {
            debug!("Ignoring {} sign while stopped", det.label);
            return None;
        }

        if let Some(t) = self.last_accepted_s {
            if now_s - t <= self.params.cooldown_s {
                debug!("Ignoring {} sign during cooldown", det.label);
                return None;
            }
        }

        let action = match self.params.actions.get(&det.label.to_ascii_lowercase()) {
            Some(a) => *a,
            None => {
                debug!("No action for sign {}", det.label);
                return None;
            }
        };

        info!("Sign {} ({:.2}): {:?}", det.label, det.confidence, action);
        self.last_accepted_s = Some(now_s);

        Some(match action {
            SignAction::Stop => {
                self.hold_until_s = Some(now_s + self.params.stop_hold_s);
                SpeedMode::Stop
            }
            SignAction::Fast => SpeedMode::Fast,
            SignAction::Normal => SpeedMode::Normal,
            SignAction::Slow => SpeedMode::Slow,
        })
    }

    /// Advance the policy to session time `now_s`.
    ///
    /// Returns `Some(SpeedMode::Normal)` on the cycle a stop hold expires.
    pub fn update(&mut self, now_s: f64) -> Option<SpeedMode> {
        match self.hold_until_s {
            Some(t) if now_s >= t => {
                info!("Stop hold over, resuming");
                self.hold_until_s = None;
                Some(SpeedMode::Normal)
            }
            _ => None,
        }
    }

    /// True while a stop action is holding the car.
    pub fn is_holding(&self) -> bool {
        self.hold_until_s.is_some()
    }

    /// Drop any hold in progress, for example when the operator takes over.
    pub fn cancel_hold(&mut self) {
        self.hold_until_s = None;
    }
}
