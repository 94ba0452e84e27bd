#![allow(unused)]

use std::thread;
use std::time::Duration;

use futures::stream::BoxStream;
use futures::StreamExt;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "real-sensors")]
use anyhow::anyhow;
#[cfg(feature = "fake-sensors")]
use rand::Rng;

#[cfg(feature = "real-sensors")]
use super::hmc8553l::HMC8553L;

/// Mesure brute émise par la couche capteur. Le nom du champ `distance`
/// vient de la charge native historique et est conservé tel quel.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Mesure {
    pub distance: f64,
    /// Epoch en millisecondes
    pub timestamp: u64,
}

/// Source de mesures magnétiques. Le registre ouvre le flux au premier
/// inscrit et annule le jeton quand le dernier se désinscrit.
pub trait Capteur: Send + Sync {
    fn flux(&self, jeton: CancellationToken) -> BoxStream<'static, anyhow::Result<Mesure>>;
}

/// Capteur simulé pour le développement sans matériel
#[cfg(feature = "fake-sensors")]
pub struct CapteurFactice;

#[cfg(feature = "fake-sensors")]
impl Capteur for CapteurFactice {
    fn flux(&self, jeton: CancellationToken) -> BoxStream<'static, anyhow::Result<Mesure>> {
        let (tx, rx) = mpsc::channel(16);

        println!("[MAG] Démarrage du thread [FAKE] ...");
        thread::spawn(move || {
            let mut rng = rand::thread_rng();

            while !jeton.is_cancelled() {
                let x: f64 = rng.gen_range(-60.0..60.0);
                let y: f64 = rng.gen_range(-60.0..60.0);
                let z: f64 = rng.gen_range(-60.0..60.0);
                let norme = Vector3::new(x, y, z).norm();

                let mesure = Mesure {
                    distance: norme,
                    timestamp: super::maintenant_ms(),
                };

                if tx.blocking_send(Ok(mesure)).is_err() {
                    break;
                }

                thread::sleep(Duration::from_millis(100));
            }

            println!("[MAG] Fin du thread [FAKE].");
        });

        ReceiverStream::new(rx).boxed()
    }
}

/// Capteur réel : magnétomètre HMC8553L sur le bus I2C
#[cfg(feature = "real-sensors")]
pub struct CapteurHMC8553L;

#[cfg(feature = "real-sensors")]
impl Capteur for CapteurHMC8553L {
    fn flux(&self, jeton: CancellationToken) -> BoxStream<'static, anyhow::Result<Mesure>> {
        let (tx, rx) = mpsc::channel(16);

        println!("[MAG] Démarrage du thread ...");
        thread::spawn(move || {
            let mut i2c = match rppal::i2c::I2c::new() {
                Ok(i2c) => i2c,
                Err(e) => {
                    println!("[I2C] Erreur de bus: {}", e);
                    let _ = tx.blocking_send(Err(anyhow!("Device sensor returned an error.")));
                    return;
                }
            };

            let mag = match HMC8553L::new(&mut i2c) {
                Ok(mag) => mag,
                Err(e) => {
                    println!("[MAG] Capteur non disponible: {}", e);
                    let _ = tx.blocking_send(Err(anyhow!("Device sensor returned an error.")));
                    return;
                }
            };

            while !jeton.is_cancelled() {
                match mag.axes_raw(&mut i2c) {
                    Ok(axes) => {
                        let norme =
                            Vector3::new(axes.x as f64, axes.y as f64, axes.z as f64).norm();
                        let mesure = Mesure {
                            distance: norme,
                            timestamp: super::maintenant_ms(),
                        };

                        if tx.blocking_send(Ok(mesure)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        if tx.blocking_send(Err(e)).is_err() {
                            break;
                        }
                    }
                }

                thread::sleep(Duration::from_millis(100));
            }

            println!("[MAG] Fin du thread.");
        });

        ReceiverStream::new(rx).boxed()
    }
}
