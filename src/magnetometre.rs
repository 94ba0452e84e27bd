use std::collections::HashMap;
use std::mem;
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::Options;
use crate::sensors::mag::reader::{Capteur, Mesure};
use crate::sensors::mag::MagData;

/// Callback de livraison d'une mesure
pub type SurChamp = Arc<dyn Fn(MagData) + Send + Sync>;

/// Callback de livraison d'une erreur du flux natif (valeur opaque)
pub type SurErreur = Arc<dyn Fn(Arc<anyhow::Error>) + Send + Sync>;

/// Paire de callbacks en attente d'une livraison
struct Ecouteur {
    id: Uuid,
    /// Un coup unique est désinscrit par sa propre livraison
    unique: bool,
    succes: Option<SurChamp>,
    echec: Option<SurErreur>,
}

/// Surveillance périodique : jeton de la minuterie + écouteur associé
struct Surveillance {
    jeton: CancellationToken,
    ecouteur: Uuid,
}

struct Etat {
    actif: bool,
    dernier: Option<MagData>,
    ecouteurs: Vec<Ecouteur>,
    surveillances: HashMap<Uuid, Surveillance>,
    jeton_flux: Option<CancellationToken>,
}

/// Registre des écouteurs du magnétomètre.
///
/// Le flux capteur est démarré à la première inscription et arrêté dès que
/// l'ensemble des écouteurs se vide — jamais à un autre moment. Toutes les
/// mutations passent par un verrou unique, ce qui sérialise les tournées de
/// diffusion exactement comme la boucle d'événements d'origine ; les
/// callbacks sont invoqués verrou tenu et ne doivent donc pas rappeler le
/// registre.
pub struct Magnetometre {
    etat: Arc<Mutex<Etat>>,
    capteur: Arc<dyn Capteur>,
    supporte: bool,
}

impl Magnetometre {
    /// Constructeur. Le capteur n'est démarré qu'à la première inscription.
    pub fn new(capteur: Arc<dyn Capteur>) -> Self {
        Self::avec_support(capteur, cfg!(target_os = "linux"))
    }

    pub(crate) fn avec_support(capteur: Arc<dyn Capteur>, supporte: bool) -> Self {
        Magnetometre {
            etat: Arc::new(Mutex::new(Etat {
                actif: false,
                dernier: None,
                ecouteurs: Vec::new(),
                surveillances: HashMap::new(),
                jeton_flux: None,
            })),
            capteur,
            supporte,
        }
    }

    /// Le flux capteur tourne-t-il ?
    pub fn actif(&self) -> bool {
        self.etat.lock().unwrap().actif
    }

    /// Demande une mesure unique. Le callback succès ou échec est invoqué
    /// au plus une fois, à la prochaine livraison native, puis l'écouteur
    /// est désinscrit.
    ///
    /// NOTE : sur une plateforme non supportée l'appel ne fait strictement
    /// rien (aucun callback, aucune erreur) — comportement hérité, conservé
    /// tel quel.
    pub fn champ_actuel(&self, succes: SurChamp, echec: Option<SurErreur>) {
        if !self.supporte {
            return;
        }

        let mut etat = self.etat.lock().unwrap();

        etat.ecouteurs.push(Ecouteur {
            id: Uuid::new_v4(),
            unique: true,
            succes: Some(succes),
            echec,
        });

        if !etat.actif {
            self.demarrer(&mut etat);
        }
    }

    /// Inscrit une surveillance périodique et retourne son identifiant.
    ///
    /// La livraison passe par la minuterie (fréquence des [`Options`]),
    /// jamais par le callback natif : tant qu'aucune mesure n'est en cache,
    /// les tics ne livrent rien. Si le flux tourne déjà et qu'une mesure
    /// est en cache, elle est livrée immédiatement. Le callback d'échec
    /// désinscrit l'écouteur et transmet l'erreur.
    pub fn surveiller(
        &self,
        succes: SurChamp,
        echec: Option<SurErreur>,
        options: &Options,
    ) -> Uuid {
        let frequence = options.frequence();

        let mut etat = self.etat.lock().unwrap();

        let ecouteur_id = Uuid::new_v4();
        etat.ecouteurs.push(Ecouteur {
            id: ecouteur_id,
            unique: false,
            // La livraison est pilotée par la minuterie, pas par le natif
            succes: None,
            echec,
        });

        let id = Uuid::new_v4();
        let jeton = CancellationToken::new();
        etat.surveillances.insert(
            id,
            Surveillance {
                jeton: jeton.clone(),
                ecouteur: ecouteur_id,
            },
        );

        // Minuterie : livre le dernier champ en cache à chaque tic
        let partage = self.etat.clone();
        let livraison = succes.clone();
        tokio::spawn(async move {
            let depart = tokio::time::Instant::now() + frequence;
            let mut tic = tokio::time::interval_at(depart, frequence);
            tic.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = jeton.cancelled() => break,
                    _ = tic.tick() => {
                        let etat = partage.lock().unwrap();
                        if !etat.surveillances.contains_key(&id) {
                            break;
                        }
                        if let Some(champ) = etat.dernier {
                            livraison(champ);
                        }
                    }
                }
            }
        });

        if etat.actif {
            if let Some(champ) = etat.dernier {
                succes(champ);
            }
        } else {
            self.demarrer(&mut etat);
        }

        id
    }

    /// Annule une surveillance. L'annulation est synchrone : au retour,
    /// plus aucun tic ni aucune livraison n'atteindra ses callbacks.
    /// Identifiant inconnu ou déjà annulé : aucun effet.
    pub fn annuler_surveillance(&self, id: Uuid) {
        let mut etat = self.etat.lock().unwrap();

        if let Some(surveillance) = etat.surveillances.remove(&id) {
            surveillance.jeton.cancel();

            if let Some(position) = etat
                .ecouteurs
                .iter()
                .position(|e| e.id == surveillance.ecouteur)
            {
                etat.ecouteurs.remove(position);
                if etat.ecouteurs.is_empty() {
                    Self::arreter(&mut etat);
                }
            }
        }
    }

    /// Démarre le flux capteur (idempotent tant qu'il tourne)
    fn demarrer(&self, etat: &mut Etat) {
        if etat.actif {
            return;
        }

        println!("[MAG] Démarrage du flux capteur.");

        let jeton = CancellationToken::new();
        etat.jeton_flux = Some(jeton.clone());
        etat.actif = true;

        let mut flux = self.capteur.flux(jeton.child_token());
        let partage = self.etat.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = jeton.cancelled() => break,
                    element = flux.next() => match element {
                        Some(Ok(mesure)) => Self::sur_mesure(&partage, mesure),
                        Some(Err(e)) => Self::sur_erreur(&partage, Arc::new(e)),
                        None => break,
                    }
                }
            }
        });
    }

    /// Arrête le flux capteur et purge le cache (idempotent à l'arrêt)
    fn arreter(etat: &mut Etat) {
        if !etat.actif {
            return;
        }

        if let Some(jeton) = etat.jeton_flux.take() {
            jeton.cancel();
        }
        etat.actif = false;
        etat.dernier = None;

        println!("[MAG] Arrêt du flux capteur.");
    }

    /// Callback natif : nouvelle mesure. Mise en cache, puis diffusion sur
    /// un instantané des écouteurs inscrits au début de la tournée — un
    /// écouteur ajouté ou retiré en cours de tournée n'affecte pas celle-ci.
    fn sur_mesure(partage: &Arc<Mutex<Etat>>, mesure: Mesure) {
        let mut etat = partage.lock().unwrap();

        // Mesure tardive reçue après l'arrêt du flux
        if !etat.actif {
            return;
        }

        // NOTE : la charge native expose `distance`/`timestamp`, consommés
        // en x/timestamp du champ — décalage de nommage hérité de la couche
        // native, conservé tel quel en attendant clarification.
        let champ = MagData::nouveau(
            Some(mesure.distance),
            None,
            None,
            None,
            None,
            Some(mesure.timestamp),
        );
        etat.dernier = Some(champ);

        let instantane = mem::take(&mut etat.ecouteurs);
        let mut restants = Vec::with_capacity(instantane.len());
        for ecouteur in instantane {
            if ecouteur.unique {
                if let Some(succes) = ecouteur.succes {
                    succes(champ);
                }
            } else {
                restants.push(ecouteur);
            }
        }
        etat.ecouteurs = restants;

        if etat.ecouteurs.is_empty() {
            Self::arreter(&mut etat);
        }
    }

    /// Callback natif : erreur du flux, transmise telle quelle à l'échec de
    /// chaque écouteur de l'instantané, qui est désinscrit au passage. Les
    /// minuteries de surveillance, elles, survivent jusqu'à l'annulation
    /// explicite — mais n'ont plus rien à livrer, l'arrêt purgeant le cache.
    fn sur_erreur(partage: &Arc<Mutex<Etat>>, erreur: Arc<anyhow::Error>) {
        let mut etat = partage.lock().unwrap();

        if !etat.actif {
            return;
        }

        let instantane = mem::take(&mut etat.ecouteurs);
        for ecouteur in instantane {
            if let Some(echec) = ecouteur.echec {
                echec(erreur.clone());
            }
        }

        if etat.ecouteurs.is_empty() {
            Self::arreter(&mut etat);
        }
    }
}
