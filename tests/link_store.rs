mod common;

use std::collections::HashSet;
use std::sync::Arc;

use l1nkzip::AppError;
use l1nkzip::application::services::LinkService;
use l1nkzip::domain::codec::Codec;
use l1nkzip::domain::repositories::LinkRepository;
use l1nkzip::infrastructure::persistence::SqliteLinkRepository;

async fn store() -> (sqlx::SqlitePool, Arc<LinkService<SqliteLinkRepository>>) {
    let (pool, repo) = common::test_repository().await;
    (pool, Arc::new(LinkService::new(repo, Arc::new(Codec::default()))))
}

#[tokio::test]
async fn test_first_link_gets_first_code() {
    let (_pool, store) = store().await;

    let insertion = store.insert("https://example.com").await.unwrap();

    assert!(insertion.is_created());
    let link = insertion.into_link();
    assert_eq!(link.id, 1);
    assert_eq!(link.code, "867nv");
    assert_eq!(link.visits, 0);
}

#[tokio::test]
async fn test_equivalent_urls_share_a_link() {
    let (pool, store) = store().await;

    let first = store.insert("https://example.com/page").await.unwrap();
    let second = store
        .insert("HTTPS://EXAMPLE.COM:443/page#section")
        .await
        .unwrap();

    assert!(first.is_created());
    assert!(!second.is_created());
    assert_eq!(first.link().code, second.link().code);
    assert_eq!(common::count_links(&pool).await, 1);
}

#[tokio::test]
async fn test_concurrent_inserts_of_same_url() {
    let (pool, store) = store().await;

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.insert("https://race.example/").await })
        })
        .collect();

    let mut codes = HashSet::new();
    let mut created = 0;
    for handle in handles {
        let insertion = handle.await.unwrap().unwrap();
        if insertion.is_created() {
            created += 1;
        }
        codes.insert(insertion.into_link().code);
    }

    assert_eq!(created, 1);
    assert_eq!(codes.len(), 1);
    assert_eq!(common::count_links(&pool).await, 1);
}

#[tokio::test]
async fn test_distinct_urls_get_distinct_codes() {
    let (_pool, store) = store().await;

    let mut codes = HashSet::new();
    for i in 0..100 {
        let link = store
            .insert(&format!("https://example.com/{i}"))
            .await
            .unwrap()
            .into_link();
        assert!(codes.insert(link.code));
    }
}

#[tokio::test]
async fn test_lookup_round_trip() {
    let (_pool, store) = store().await;
    let created = store
        .insert("https://example.com/docs?q=1")
        .await
        .unwrap()
        .into_link();

    let found = store.lookup(&created.code).await.unwrap();

    assert_eq!(found.id, created.id);
    assert_eq!(found.url, "https://example.com/docs?q=1");
}

#[tokio::test]
async fn test_unknown_and_malformed_codes_are_not_found() {
    let (_pool, store) = store().await;
    store.insert("https://example.com").await.unwrap();

    for code in ["5wppq", "???", "", "m867nv", "867NV"] {
        assert!(
            matches!(store.lookup(code).await, Err(AppError::NotFound { .. })),
            "{code:?}"
        );
    }
}

#[tokio::test]
async fn test_disabled_link_is_opaque_and_url_reusable() {
    let (pool, store) = store().await;
    let old = store
        .insert("https://example.com")
        .await
        .unwrap()
        .into_link();

    store.disable(old.id).await.unwrap();

    assert!(matches!(
        store.lookup(&old.code).await,
        Err(AppError::NotFound { .. })
    ));

    let fresh = store.insert("https://example.com").await.unwrap();
    assert!(fresh.is_created());
    assert_ne!(fresh.link().code, old.code);
    assert_eq!(common::count_links(&pool).await, 2);
}

#[tokio::test]
async fn test_increment_visit() {
    let (pool, store) = store().await;
    let link = store
        .insert("https://example.com")
        .await
        .unwrap()
        .into_link();

    store.increment_visit(link.id).await.unwrap();
    store.increment_visit(link.id).await.unwrap();

    assert_eq!(common::visits_of(&pool, link.id).await, 2);
    assert!(matches!(
        store.increment_visit(999).await,
        Err(AppError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_codes_follow_alphabet() {
    let (_pool, repo) = common::test_repository().await;
    repo.create("https://example.com/").await.unwrap();
    let hex = LinkService::new(
        repo,
        Arc::new(Codec::new("0123456789abcdef").unwrap()),
    );

    let link = hex.lookup(&hex.codec().encode(1).unwrap()).await.unwrap();

    assert_eq!(link.id, 1);
    assert!(link.code.chars().all(|c| c.is_ascii_hexdigit()));
}
