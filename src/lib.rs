//! Pont entre le magnétomètre de l'appareil et le code applicatif :
//! un registre d'écouteurs (mesure unique / surveillance périodique)
//! au-dessus d'un flux capteur démarré et arrêté à la demande.

pub mod config;
pub mod magnetometre;
pub mod sensors;

#[cfg(feature = "real-sensors")]
pub mod i2c;

pub use config::Options;
pub use magnetometre::{Magnetometre, SurChamp, SurErreur};
pub use sensors::mag::MagData;
