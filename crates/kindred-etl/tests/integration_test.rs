//! Integration tests for catalog files → embeddings → similarity queries.

use std::fs;
use std::path::Path;

use kindred_core::ContentDomain;
use kindred_etl::{build_store, fingerprint, load_catalogs, CatalogSources, Config, EtlError};
use kindred_search::{find_similar_in, neighbours, SearchEngine, SnapshotCache, VectorBackend};
use tempfile::TempDir;

const TRACKS: &str = "\
track_id,artists,album_name,track_name,popularity,duration_ms,explicit,danceability,energy,key,loudness,mode,speechiness,acousticness,instrumentalness,liveness,valence,tempo,time_signature,track_genre
a1,DJ One,Club,Floor Filler,80,200000,False,0.90,0.95,1,-4.0,1,0.06,0.02,0.00,0.30,0.85,128.0,4,dance
a2,DJ Two,Club 2,Night Drive,75,210000,False,0.88,0.90,5,-5.0,1,0.05,0.03,0.01,0.25,0.80,126.0,4,dance
a3,Quartet,Strings,Slow Bloom,30,300000,False,0.20,0.10,2,-22.0,0,0.04,0.95,0.90,0.10,0.15,70.0,3,classical
a4,Missing,,No Album,10,1000,False,0.5,0.5,1,-9.0,1,0.05,0.5,0.5,0.1,0.5,100.0,4,pop
";

const TITLES: &str = "\
show_id,type,title,director,cast,country,date_added,release_year,rating,duration,listed_in,description
s1,Movie,Vault,Kim Ro,\"Ada Pell, Ben Ore\",United States,2020,2019,R,101 min,\"Thrillers, Crime Movies\",A master thief assembles a crew for one last bank heist.
s2,Movie,The Job,,,France,2021,2020,R,95 min,Crime Movies,A retired thief is pulled back into a bank heist.
s3,TV Show,Deep Blue,,Cal Dunn,,2019,2018,TV-G,2 Seasons,Docuseries,Ocean creatures and coral reefs of the deep sea.
";

fn write_catalogs(dir: &Path) -> Config {
    let tracks = dir.join("tracks.csv");
    let titles = dir.join("titles.csv");
    fs::write(&tracks, TRACKS).unwrap();
    fs::write(&titles, TITLES).unwrap();
    Config::default().with_paths(Some(tracks), Some(titles))
}

#[test]
fn test_load_and_query_tracks() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_catalogs(temp_dir.path());

    let catalogs = load_catalogs(&config).unwrap();
    assert_eq!(catalogs.tracks.len(), 3, "row with missing album is dropped");
    assert_eq!(catalogs.get(ContentDomain::Titles).len(), 3);

    let engine = SearchEngine::new(build_store(&catalogs).unwrap());
    let results = find_similar_in(&engine, ContentDomain::Tracks, "spotify_0", 6).unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].record.id, "spotify_0");
    assert_eq!(results[0].score, 1.0);
    assert_eq!(neighbours(&results)[0].record.title(), "Night Drive");
}

#[test]
fn test_load_and_query_titles() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_catalogs(temp_dir.path());

    let catalogs = load_catalogs(&config).unwrap();
    let store = build_store(&catalogs).unwrap();
    assert_eq!(store.len("netflix"), 3);

    let engine = SearchEngine::new(store);
    let results = find_similar_in(&engine, ContentDomain::Titles, "netflix_0", 2).unwrap();
    assert_eq!(results[1].record.title(), "The Job");
    assert!(results[1].score > 0.0);
}

#[test]
fn test_unknown_item_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_catalogs(temp_dir.path());

    let engine = SearchEngine::new(build_store(&load_catalogs(&config).unwrap()).unwrap());
    let results = find_similar_in(&engine, ContentDomain::Titles, "netflix_42", 6).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_missing_file_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::default().with_paths(
        Some(temp_dir.path().join("nope.csv")),
        Some(temp_dir.path().join("nope2.csv")),
    );

    match load_catalogs(&config) {
        Err(EtlError::Io { path, .. }) => assert!(path.ends_with("nope.csv")),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn test_sources_read_once_share_fingerprint() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_catalogs(temp_dir.path());

    let sources = CatalogSources::read(&config).unwrap();
    assert_eq!(sources.fingerprint(), fingerprint(&config).unwrap());

    let catalogs = sources.embed(config.max_features).unwrap();
    assert_eq!(catalogs.fingerprint, sources.fingerprint());
    assert_eq!(catalogs.tracks.len(), 3);
}

#[test]
fn test_snapshot_rebuilt_when_files_change() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_catalogs(temp_dir.path());
    let mut cache = SnapshotCache::new();
    let snapshot = |cache: &mut SnapshotCache| {
        let sources = CatalogSources::read(&config).unwrap();
        cache
            .get_or_build(sources.fingerprint(), || {
                build_store(&sources.embed(config.max_features)?)
            })
            .unwrap()
    };

    let first = snapshot(&mut cache);
    let again = snapshot(&mut cache);
    assert!(std::sync::Arc::ptr_eq(&first, &again));

    let extra = format!(
        "{TITLES}s4,Movie,Reef,,,,2022,2022,G,80 min,Documentaries,Coral reefs in the deep sea.\n"
    );
    fs::write(&config.titles_path, extra).unwrap();

    let rebuilt = snapshot(&mut cache);
    assert_ne!(rebuilt.fingerprint(), first.fingerprint());
    assert_eq!(rebuilt.engine().backend().len("netflix"), 4);
}
