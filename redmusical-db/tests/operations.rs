use chrono::NaiveDate;
use redmusical_catalog::types::*;
use redmusical_db::*;

fn new_album(external_id: &str, artist_id: i64) -> NewAlbum {
    NewAlbum {
        external_id: external_id.to_string(),
        title: "Homogenic".to_string(),
        artist_id,
        release_date: NaiveDate::from_ymd_opt(1997, 9, 22),
        image_url: Some("https://img.example/homogenic.jpg".to_string()),
    }
}

fn new_track(external_id: &str, album_id: i64) -> NewTrack {
    NewTrack {
        external_id: external_id.to_string(),
        title: "Joga".to_string(),
        album_id,
        duration_ms: 305_000,
    }
}

#[test]
fn get_or_create_artist_is_idempotent() {
    let conn = open_memory().unwrap();
    let (first, created) = get_or_create_artist(&conn, "art1", "Bjork").unwrap();
    assert!(created);
    let (second, created) = get_or_create_artist(&conn, "art1", "Someone Else").unwrap();
    assert!(!created);
    assert_eq!(first.id, second.id);
    assert_eq!(second.name, "Bjork");
    assert_eq!(catalog_stats(&conn).unwrap().artists, 1);
}

#[test]
fn artist_name_lookup_is_case_insensitive() {
    let conn = open_memory().unwrap();
    let (created, was_new) = get_or_create_artist_by_name(&conn, "Portishead").unwrap();
    assert!(was_new);
    assert!(created.external_id.is_none());

    let (found, was_new) = get_or_create_artist_by_name(&conn, "PORTISHEAD").unwrap();
    assert!(!was_new);
    assert_eq!(found.id, created.id);
}

#[test]
fn unlinked_lookup_ignores_linked_artists() {
    let conn = open_memory().unwrap();
    get_or_create_artist(&conn, "art1", "Massive Attack").unwrap();
    assert!(find_unlinked_artist_by_name(&conn, "massive attack").unwrap().is_none());

    let (unlinked, _) = get_or_create_artist_by_name(&conn, "Tricky").unwrap();
    let found = find_unlinked_artist_by_name(&conn, "tricky").unwrap().unwrap();
    assert_eq!(found.id, unlinked.id);
}

#[test]
fn update_artist_links_and_enriches() {
    let conn = open_memory().unwrap();
    let (mut artist, _) = get_or_create_artist_by_name(&conn, "Air").unwrap();
    assert!(artist.needs_enrichment());

    artist.external_id = Some("art9".to_string());
    artist.image_url = Some("https://img.example/air.jpg".to_string());
    update_artist(&conn, &artist).unwrap();

    let stored = find_artist_by_external_id(&conn, "art9").unwrap().unwrap();
    assert_eq!(stored.id, artist.id);
    assert!(!stored.needs_enrichment());
}

#[test]
fn update_missing_artist_is_not_found() {
    let conn = open_memory().unwrap();
    let (mut artist, _) = get_or_create_artist_by_name(&conn, "Air").unwrap();
    artist.id += 100;
    assert!(matches!(
        update_artist(&conn, &artist),
        Err(OperationError::NotFound { .. })
    ));
}

#[test]
fn genres_are_linked_once() {
    let conn = open_memory().unwrap();
    let (artist, _) = get_or_create_artist(&conn, "art1", "Bjork").unwrap();
    let genres = vec!["art pop".to_string(), "electronica".to_string(), " ".to_string()];

    assert_eq!(add_artist_genres(&conn, artist.id, &genres).unwrap(), 2);
    assert_eq!(add_artist_genres(&conn, artist.id, &genres).unwrap(), 0);

    let names: Vec<String> = genres_for_artist(&conn, artist.id)
        .unwrap()
        .into_iter()
        .map(|g| g.name)
        .collect();
    assert_eq!(names, vec!["art pop", "electronica"]);
    assert_eq!(get_or_create_genre(&conn, "art pop").unwrap(), get_or_create_genre(&conn, "art pop").unwrap());
}

#[test]
fn album_stores_normalized_release_date() {
    let conn = open_memory().unwrap();
    let (artist, _) = get_or_create_artist(&conn, "art1", "Bjork").unwrap();
    let (album, created) = get_or_create_album(&conn, &new_album("alb1", artist.id)).unwrap();
    assert!(created);
    assert_eq!(album.release_date.as_deref(), Some("1997-09-22"));
    assert_eq!(album.external_id.as_deref(), Some("alb1"));

    let mut undated = new_album("alb2", artist.id);
    undated.release_date = None;
    let (album, _) = get_or_create_album(&conn, &undated).unwrap();
    assert!(album.release_date.is_none());
}

#[test]
fn existing_album_is_returned_untouched() {
    let conn = open_memory().unwrap();
    let (artist, _) = get_or_create_artist(&conn, "art1", "Bjork").unwrap();
    let (first, _) = get_or_create_album(&conn, &new_album("alb1", artist.id)).unwrap();

    let mut changed = new_album("alb1", artist.id);
    changed.title = "Different".to_string();
    let (second, created) = get_or_create_album(&conn, &changed).unwrap();
    assert!(!created);
    assert_eq!(second, first);
}

#[test]
fn track_get_or_create_is_idempotent() {
    let conn = open_memory().unwrap();
    let (artist, _) = get_or_create_artist(&conn, "art1", "Bjork").unwrap();
    let (album, _) = get_or_create_album(&conn, &new_album("alb1", artist.id)).unwrap();

    let (track, created) = get_or_create_track(&conn, &new_track("trk1", album.id)).unwrap();
    assert!(created);
    assert_eq!(track.duration_ms, 305_000);
    let (again, created) = get_or_create_track(&conn, &new_track("trk1", album.id)).unwrap();
    assert!(!created);
    assert_eq!(again.id, track.id);

    assert_eq!(tracks_for_album(&conn, album.id).unwrap().len(), 1);
    assert_eq!(albums_for_artist(&conn, artist.id).unwrap().len(), 1);
}

#[test]
fn track_requires_existing_album() {
    let conn = open_memory().unwrap();
    assert!(get_or_create_track(&conn, &new_track("trk1", 42)).is_err());
}

#[test]
fn stats_count_every_table() {
    let conn = open_memory().unwrap();
    assert_eq!(catalog_stats(&conn).unwrap(), CatalogStats::default());

    let (artist, _) = get_or_create_artist(&conn, "art1", "Bjork").unwrap();
    add_artist_genres(&conn, artist.id, &["icelandic pop".to_string()]).unwrap();
    let (album, _) = get_or_create_album(&conn, &new_album("alb1", artist.id)).unwrap();
    get_or_create_track(&conn, &new_track("trk1", album.id)).unwrap();
    get_or_create_track(&conn, &new_track("trk2", album.id)).unwrap();

    let stats = catalog_stats(&conn).unwrap();
    assert_eq!(stats.artists, 1);
    assert_eq!(stats.albums, 1);
    assert_eq!(stats.tracks, 2);
    assert_eq!(stats.genres, 1);
}

#[test]
fn album_with_artist_joins_owner() {
    let conn = open_memory().unwrap();
    let (artist, _) = get_or_create_artist(&conn, "art1", "Bjork").unwrap();
    let (album, _) = get_or_create_album(&conn, &new_album("alb1", artist.id)).unwrap();

    let (found, owner) = album_with_artist(&conn, album.id).unwrap().unwrap();
    assert_eq!(found.id, album.id);
    assert_eq!(owner.name, "Bjork");
    assert!(album_with_artist(&conn, album.id + 100).unwrap().is_none());
}
