//! Integration-Tests fuer MessageRepository (In-Memory SQLite)

use fernchat_db::{
    models::{BenutzerRecord, NachrichtenTyp, NeueNachricht, NeuerBenutzer},
    MessageRepository, SqliteDb, UserRepository,
};

async fn db_mit_benutzern() -> (SqliteDb, BenutzerRecord, BenutzerRecord) {
    let db = SqliteDb::in_memory()
        .await
        .expect("In-Memory DB konnte nicht erstellt werden");
    let leer: Vec<String> = Vec::new();
    let mut benutzer = db
        .benutzer_synchronisieren(&[
            NeuerBenutzer { username: "alice", domains: &leer, online: true },
            NeuerBenutzer { username: "bob", domains: &leer, online: true },
        ])
        .await
        .unwrap();
    let bob = benutzer.remove(1);
    let alice = benutzer.remove(0);
    (db, alice, bob)
}

fn text<'a>(
    von: &'a BenutzerRecord,
    chat: &'a BenutzerRecord,
    besitzer: &'a BenutzerRecord,
    inhalt: &'a str,
    unread: bool,
) -> NeueNachricht<'a> {
    NeueNachricht {
        sender_id: von.id,
        sender_name: &von.username,
        chat_id: chat.id,
        chat_name: &chat.username,
        owner_id: besitzer.id,
        owner_name: &besitzer.username,
        message_type: NachrichtenTyp::Text,
        message: Some(inhalt),
        file_data: None,
        file_name: None,
        iv: "aXYtYmFzZTY0",
        unread,
    }
}

#[tokio::test]
async fn verlauf_in_einfuege_reihenfolge() {
    let (db, alice, bob) = db_mit_benutzern().await;

    for inhalt in ["eins", "zwei", "drei"] {
        db.nachricht_erstellen(text(&bob, &bob, &alice, inhalt, true))
            .await
            .unwrap();
    }
    // Gehoert einem anderen Besitzer, darf nicht auftauchen
    db.nachricht_erstellen(text(&alice, &alice, &bob, "fremd", true))
        .await
        .unwrap();

    let verlauf = db.chat_verlauf("bob", alice.id).await.unwrap();
    let inhalte: Vec<_> = verlauf.iter().filter_map(|n| n.message.as_deref()).collect();
    assert_eq!(inhalte, vec!["eins", "zwei", "drei"]);
    assert!(verlauf.iter().all(|n| n.message_type == NachrichtenTyp::Text));
}

#[tokio::test]
async fn nachricht_loeschen_entfernt_zeile() {
    let (db, alice, bob) = db_mit_benutzern().await;

    let n = db
        .nachricht_erstellen(text(&alice, &bob, &alice, "hallo", false))
        .await
        .unwrap();
    assert!(db.nachricht_laden(n.id).await.unwrap().is_some());

    assert!(db.nachricht_loeschen(n.id).await.unwrap());
    assert!(db.nachricht_laden(n.id).await.unwrap().is_none());
    assert!(!db.nachricht_loeschen(n.id).await.unwrap());
}

#[tokio::test]
async fn chat_gelesen_markiert_nur_ungelesene() {
    let (db, alice, bob) = db_mit_benutzern().await;

    db.nachricht_erstellen(text(&bob, &bob, &alice, "a", true)).await.unwrap();
    db.nachricht_erstellen(text(&bob, &bob, &alice, "b", true)).await.unwrap();
    db.nachricht_erstellen(text(&alice, &bob, &alice, "c", false)).await.unwrap();

    assert_eq!(db.chat_gelesen("bob", alice.id).await.unwrap(), 2);
    assert_eq!(db.chat_gelesen("bob", alice.id).await.unwrap(), 0);

    let verlauf = db.chat_verlauf("bob", alice.id).await.unwrap();
    assert!(verlauf.iter().all(|n| !n.unread));
}

#[tokio::test]
async fn dateien_nur_datei_nachrichten() {
    let (db, alice, bob) = db_mit_benutzern().await;

    db.nachricht_erstellen(text(&bob, &bob, &alice, "text", true)).await.unwrap();
    db.nachricht_erstellen(NeueNachricht {
        sender_id: bob.id,
        sender_name: "bob",
        chat_id: bob.id,
        chat_name: "bob",
        owner_id: alice.id,
        owner_name: "alice",
        message_type: NachrichtenTyp::File,
        message: None,
        file_data: Some("ZGF0ZWk="),
        file_name: Some("bild.png"),
        iv: "aXY=",
        unread: true,
    })
    .await
    .unwrap();

    let dateien = db.dateien(alice.id).await.unwrap();
    assert_eq!(dateien.len(), 1);
    assert_eq!(dateien[0].file_name.as_deref(), Some("bild.png"));
    assert_eq!(dateien[0].message_type, NachrichtenTyp::File);
    assert!(dateien[0].message.is_none());
}
