mod cli;

use std::sync::Arc;

use clap::Parser;

use magnetometrie::config::Options;
use magnetometrie::Magnetometre;

#[cfg(all(feature = "fake-sensors", not(feature = "real-sensors")))]
use magnetometrie::sensors::mag::reader::CapteurFactice;
#[cfg(feature = "real-sensors")]
use magnetometrie::sensors::mag::reader::CapteurHMC8553L;

#[cfg(unix)]
use tokio::signal::unix::SignalKind;
use tokio::signal::{self};

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    #[cfg(feature = "real-sensors")]
    let capteur = Arc::new(CapteurHMC8553L);
    #[cfg(all(feature = "fake-sensors", not(feature = "real-sensors")))]
    let capteur = Arc::new(CapteurFactice);

    let registre = Magnetometre::new(capteur);

    // Mesure unique au démarrage
    registre.champ_actuel(
        Arc::new(|champ| println!("[MAG] Mesure unique: {}", champ)),
        Some(Arc::new(|e| println!("[MAG] ERREUR: {}", e))),
    );

    // Surveillance périodique
    let options = Options {
        frequency: Some(cli.frequence as f64),
    };
    let id = registre.surveiller(
        Arc::new(|champ| println!("[MAG] Champ: {}", champ)),
        Some(Arc::new(|e| println!("[MAG] ERREUR: {}", e))),
        &options,
    );

    #[cfg(unix)]
    {
        let mut interruption = tokio::signal::unix::signal(SignalKind::interrupt()).unwrap();
        tokio::select! {
            _ = interruption.recv() => {
                println!("Signal d'interruption reçu");
            },
            _ = signal::ctrl_c() => {
                println!("Signal de contrôle C reçu");
            },
        }
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = signal::ctrl_c() => {
                println!("Signal de contrôle C reçu");
            },
        }
    }

    registre.annuler_surveillance(id);
}
