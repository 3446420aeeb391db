//! Integration-Tests fuer Identitaet und Abonent-Schluessel (In-Memory SQLite)

use fernchat_db::{
    models::{NeuerAbonentSchluessel, NeuerBenutzer},
    AbonentKeyRepository, IdentityRepository, SqliteDb, UserRepository,
};

async fn db() -> SqliteDb {
    SqliteDb::in_memory()
        .await
        .expect("In-Memory DB konnte nicht erstellt werden")
}

#[tokio::test]
async fn identitaet_nur_einmal_speicherbar() {
    let db = db().await;
    assert!(db.identitaet_laden().await.unwrap().is_none());

    db.identitaet_speichern("privat-a", "oeffentlich-a")
        .await
        .expect("Erste Identitaet muss gespeichert werden");

    let err = db
        .identitaet_speichern("privat-b", "oeffentlich-b")
        .await
        .unwrap_err();
    assert!(err.ist_eindeutigkeit(), "Erwartet Eindeutigkeitsfehler, war: {err}");

    let geladen = db.identitaet_laden().await.unwrap().unwrap();
    assert_eq!(geladen.private_key, "privat-a");
    assert_eq!(geladen.public_key, "oeffentlich-a");
}

#[tokio::test]
async fn schluessel_wird_ueberschrieben() {
    let db = db().await;

    let erster = db
        .schluessel_speichern(NeuerAbonentSchluessel {
            abonent_name: "bob",
            abonent_public_key: "pk-1",
            shared_key: "sk-1",
        })
        .await
        .unwrap();

    let zweiter = db
        .schluessel_speichern(NeuerAbonentSchluessel {
            abonent_name: "bob",
            abonent_public_key: "pk-2",
            shared_key: "sk-2",
        })
        .await
        .unwrap();

    // Eine Zeile pro Name, der letzte Schreiber gewinnt
    assert_eq!(erster.id, zweiter.id);
    assert_eq!(erster.created_at, zweiter.created_at);

    let geladen = db.schluessel_laden("bob").await.unwrap().unwrap();
    assert_eq!(geladen.shared_key, "sk-2");
    assert_eq!(geladen.abonent_public_key, "pk-2");
}

#[tokio::test]
async fn schluessel_verweist_auf_bekannten_benutzer() {
    let db = db().await;
    let domains = vec!["bob.onion".to_string()];
    let bob = db
        .benutzer_synchronisieren(&[NeuerBenutzer {
            username: "bob",
            domains: &domains,
            online: true,
        }])
        .await
        .unwrap()
        .remove(0);

    let schluessel = db
        .schluessel_speichern(NeuerAbonentSchluessel {
            abonent_name: "bob",
            abonent_public_key: "pk",
            shared_key: "sk",
        })
        .await
        .unwrap();
    assert_eq!(schluessel.abonent_id, Some(bob.id));

    let fremd = db
        .schluessel_speichern(NeuerAbonentSchluessel {
            abonent_name: "unbekannt",
            abonent_public_key: "pk",
            shared_key: "sk",
        })
        .await
        .unwrap();
    assert_eq!(fremd.abonent_id, None);
}

#[tokio::test]
async fn fehlender_schluessel_ist_none() {
    let db = db().await;
    assert!(db.schluessel_laden("niemand").await.unwrap().is_none());
}
