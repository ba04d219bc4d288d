use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use gifdex::media::{FetchedMedia, MediaError, MediaFetcher};
use gifdex::storage::InMemoryRepo;
use gifdex::{
    BlobError, BlobStore, Catalog, Config, ContentHash, Environment, FileId, InMemoryDirectory,
    InventoryRecord, PersonalityRef, UserId, PAGE_SIZE,
};

/// Scriptable media service: requested id -> (canonical id, bytes).
#[derive(Default)]
struct ScriptedMedia {
    files: Mutex<HashMap<FileId, (FileId, Vec<u8>)>>,
}

impl ScriptedMedia {
    fn serve(&self, id: &str, canonical: &str, bytes: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(FileId::from(id), (FileId::from(canonical), bytes.to_vec()));
    }
}

impl MediaFetcher for ScriptedMedia {
    fn fetch(&self, id: &FileId) -> Result<FetchedMedia, MediaError> {
        let files = self.files.lock().unwrap();
        let (canonical, bytes) = files
            .get(id)
            .ok_or_else(|| MediaError::NotRetrievable(id.clone()))?;
        Ok(FetchedMedia {
            file_id: canonical.clone(),
            file_size: bytes.len() as u64,
            bytes: bytes.clone(),
        })
    }
}

#[derive(Default)]
struct RecordingBlobs {
    written: Mutex<Vec<(String, usize)>>,
}

impl BlobStore for RecordingBlobs {
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), BlobError> {
        self.written
            .lock()
            .unwrap()
            .push((key.to_string(), bytes.len()));
        Ok(())
    }
}

fn catalog(environment: Environment) -> (Catalog, Arc<ScriptedMedia>, Arc<RecordingBlobs>) {
    let media = Arc::new(ScriptedMedia::default());
    let blobs = Arc::new(RecordingBlobs::default());
    let catalog = Catalog::new(
        Arc::new(InMemoryRepo::new()),
        media.clone(),
        blobs.clone(),
        environment,
    );
    (catalog, media, blobs)
}

fn tags(names: &[&str]) -> Vec<PersonalityRef> {
    names.iter().map(|n| PersonalityRef::from(*n)).collect()
}

#[test]
fn register_use_migrate_lifecycle() {
    let (catalog, media, blobs) = catalog(Environment::Production);
    let policy = Config::new(Environment::Production);

    // Register and use the item a few times.
    catalog
        .create(FileId::from("v1"), tags(&["idol-a"]), UserId(10), &policy)
        .unwrap();
    for _ in 0..3 {
        catalog.increment_usage(&FileId::from("v1")).unwrap();
    }

    // The media service reports a migrated identifier on refresh.
    media.serve("v1", "v2", b"animation-bytes");
    catalog.refresh_metadata(&FileId::from("v1")).unwrap();

    // The record moved keys, kept its stats, and gained dedup metadata.
    assert!(catalog.get(&FileId::from("v1")).unwrap_err().is_not_found());
    let migrated = catalog.get(&FileId::from("v2")).unwrap();
    assert_eq!(migrated.usage_count, 3);
    assert_eq!(migrated.content_hash, Some(ContentHash::of(b"animation-bytes")));
    assert_eq!(migrated.file_size, 15);

    // Production refresh archived the bytes under the canonical id.
    assert_eq!(
        *blobs.written.lock().unwrap(),
        vec![("v2".to_string(), 15)]
    );

    // A later submission of the same bytes under a new id dedups to the
    // migrated record.
    media.serve("resubmission", "resubmission", b"animation-bytes");
    let duplicate = catalog
        .get_by_content(&FileId::from("resubmission"), 15)
        .unwrap()
        .unwrap();
    assert_eq!(duplicate.file_id, FileId::from("v2"));
}

#[test]
fn permission_and_ownership_flow() {
    let (catalog, _, _) = catalog(Environment::Sandbox);
    let policy = Config::new(Environment::Sandbox).with_admin(UserId(1));

    catalog
        .create(FileId::from("f"), tags(&["idol-a"]), UserId(10), &policy)
        .unwrap();

    // A stranger cannot re-register someone else's record.
    assert!(catalog
        .create(FileId::from("f"), tags(&["idol-b"]), UserId(11), &policy)
        .unwrap_err()
        .is_permission_denied());

    // The admin can, and ownership stays with the first writer.
    let updated = catalog
        .create(FileId::from("f"), tags(&["idol-b"]), UserId(1), &policy)
        .unwrap();
    assert_eq!(updated.creator, Some(UserId(10)));
    assert_eq!(updated.personalities, tags(&["idol-b"]));
}

#[test]
fn pagination_walks_the_whole_ranking() {
    let (catalog, _, _) = catalog(Environment::Sandbox);
    let policy = Config::new(Environment::Sandbox);

    let total = PAGE_SIZE * 2 + 7;
    for i in 0..total {
        let id = FileId::from(format!("f{i:04}").as_str());
        catalog
            .create(id.clone(), tags(&["idol-a"]), UserId(1), &policy)
            .unwrap();
        for _ in 0..i {
            catalog.increment_usage(&id).unwrap();
        }
    }

    let mut seen = Vec::new();
    let mut cursor = String::new();
    loop {
        let (page, next) = catalog.find(&tags(&["idol-a"]), &cursor).unwrap();
        let full_page = page.len() == PAGE_SIZE;
        seen.extend(page);
        if next.is_empty() {
            break;
        }
        assert!(full_page, "continuation cursor implies a full page");
        cursor = next;
    }

    assert_eq!(seen.len(), total);
    // Strictly descending usage across the whole walk.
    for pair in seen.windows(2) {
        assert!(pair[0].usage_count > pair[1].usage_count);
    }
}

#[test]
fn exact_page_boundary_yields_one_trailing_empty_page() {
    let (catalog, _, _) = catalog(Environment::Sandbox);
    let policy = Config::new(Environment::Sandbox);

    for i in 0..PAGE_SIZE {
        catalog
            .create(
                FileId::from(format!("f{i:03}").as_str()),
                tags(&["idol-a"]),
                UserId(1),
                &policy,
            )
            .unwrap();
    }

    // A full page cannot tell whether more results exist, so it returns a
    // cursor; the follow-up page is empty with no cursor.
    let (page, cursor) = catalog.find(&tags(&["idol-a"]), "").unwrap();
    assert_eq!(page.len(), PAGE_SIZE);
    assert!(!cursor.is_empty());

    let (tail, end) = catalog.find(&tags(&["idol-a"]), &cursor).unwrap();
    assert!(tail.is_empty());
    assert!(end.is_empty());
}

#[test]
fn dedup_conflict_refuses_both_candidates() {
    let (catalog, media, _) = catalog(Environment::Sandbox);
    let policy = Config::new(Environment::Sandbox);

    // Two records end up sharing a digest (e.g. a historical import bug).
    for id in ["twin-a", "twin-b"] {
        catalog
            .create(FileId::from(id), tags(&["idol-a"]), UserId(1), &policy)
            .unwrap();
        media.serve(id, id, b"same-bytes");
        catalog.refresh_metadata(&FileId::from(id)).unwrap();
    }

    media.serve("probe", "probe", b"same-bytes");
    let found = catalog.get_by_content(&FileId::from("probe"), 10).unwrap();
    assert!(found.is_none(), "ambiguous dedup must not guess");
}

#[test]
fn describe_renders_directory_names() {
    let (catalog, _, _) = catalog(Environment::Sandbox);
    let policy = Config::new(Environment::Sandbox);

    let mut directory = InMemoryDirectory::new();
    directory.insert(PersonalityRef::from("idol-a"), "Idol A");
    directory.insert(PersonalityRef::from("idol-b"), "Idol B");

    let record: InventoryRecord = catalog
        .create(
            FileId::from("f"),
            tags(&["idol-a", "idol-b"]),
            UserId(1),
            &policy,
        )
        .unwrap();
    assert_eq!(record.describe(&directory).unwrap(), "f [Idol A, Idol B]");
}

#[test]
fn recently_used_reflects_increment_order() {
    let (catalog, _, _) = catalog(Environment::Sandbox);
    let policy = Config::new(Environment::Sandbox);

    for id in ["a", "b", "c"] {
        catalog
            .create(FileId::from(id), tags(&["idol-a"]), UserId(1), &policy)
            .unwrap();
    }
    // Touch "a" last so it ranks first.
    catalog.increment_usage(&FileId::from("b")).unwrap();
    catalog.increment_usage(&FileId::from("a")).unwrap();

    let recent = catalog.recently_used().unwrap();
    assert_eq!(recent.first().unwrap().file_id, FileId::from("a"));
}
