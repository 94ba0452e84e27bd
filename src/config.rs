use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fréquence de livraison par défaut des surveillances (10 s)
pub const FREQUENCE_DEFAUT_MS: u64 = 10_000;

/// Options reconnues par la surface publique. Seule `frequency` (en
/// millisecondes) est comprise ; toute autre forme retombe silencieusement
/// sur le défaut.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Options {
    pub frequency: Option<f64>,
}

impl Options {
    /// Construit les options depuis un JSON arbitraire, sans jamais échouer
    pub fn depuis_json(valeur: &serde_json::Value) -> Self {
        Options {
            frequency: valeur.get("frequency").and_then(|f| f.as_f64()),
        }
    }

    /// Fréquence validée : numérique, finie et positive, sinon le défaut
    pub fn frequence(&self) -> Duration {
        match self.frequency {
            Some(f) if f.is_finite() && f > 0.0 => Duration::from_millis(f as u64),
            _ => Duration::from_millis(FREQUENCE_DEFAUT_MS),
        }
    }
}
