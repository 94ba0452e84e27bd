use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

#[cfg(feature = "real-sensors")]
pub(crate) mod hmc8553l;
pub mod reader;
#[cfg(feature = "real-sensors")]
mod registry;

/// Structure de données issue du capteur magnétique 3 axes.
/// Les champs absents de la charge native restent à `None`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MagData {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub accuracy: Option<f64>,
    pub magnitude: Option<f64>,
    /// Epoch en millisecondes
    pub timestamp: u64,
}

impl MagData {
    /// Constructeur. Sans timestamp explicite, l'heure courante est prise.
    /// La magnitude est acceptée telle quelle, jamais recalculée ici.
    pub fn nouveau(
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
        accuracy: Option<f64>,
        magnitude: Option<f64>,
        timestamp: Option<u64>,
    ) -> Self {
        MagData {
            x,
            y,
            z,
            accuracy,
            magnitude,
            timestamp: timestamp.unwrap_or_else(maintenant_ms),
        }
    }
}

impl fmt::Display for MagData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X: {:?} Y: {:?} Z: {:?} Magnitude: {:?} T: {}",
            self.x, self.y, self.z, self.magnitude, self.timestamp
        )
    }
}

/// Heure courante en millisecondes (epoch)
pub(crate) fn maintenant_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
