use atlas_client::{PokeApiClient, PokeApiConfig, RemoteSource};
use atlas_model::{Pokemon, PokemonId, PokemonKey};
use atlas_repo::{AtlasError, Repository};
use atlas_store::SqliteStore;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pokemon_body(id: i64, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "height": 7,
        "weight": 69,
        "sprites": { "front_default": format!("https://img.example/{id}.png") },
        "types": [ { "slot": 1, "type": { "name": "grass", "url": "" } } ],
        "abilities": [ { "is_hidden": false, "ability": { "name": "overgrow", "url": "" } } ],
        "moves": [],
        "stats": [ { "base_stat": 45, "effort": 0, "stat": { "name": "hp", "url": "" } } ]
    })
}

fn seed_record(id: i64, name: &str) -> Pokemon {
    serde_json::from_value(pokemon_body(id, name)).unwrap()
}

fn repo_for(server: &MockServer) -> (Repository, SqliteStore) {
    let store = SqliteStore::open_in_memory().unwrap();
    store.init().unwrap();
    let client: Arc<dyn RemoteSource> = Arc::new(PokeApiClient::new(PokeApiConfig {
        api_base_url: server.uri(),
        ..Default::default()
    }));
    (Repository::new(client, store.clone()), store)
}

async fn mount_pokemon(server: &MockServer, id: i64, name: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v2/pokemon/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(pokemon_body(id, name)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_chain(server: &MockServer, species_id: i64, chain: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v2/pokemon-species/{species_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "evolution_chain": { "url": format!("{}/api/v2/evolution-chain/1/", server.uri()) }
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/evolution-chain/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chain))
        .mount(server)
        .await;
}

fn two_stage_chain(server: &MockServer) -> serde_json::Value {
    serde_json::json!({
        "id": 1,
        "chain": {
            "species": { "name": "bulbasaur", "url": format!("{}/api/v2/pokemon-species/1/", server.uri()) },
            "evolution_details": [],
            "evolves_to": [
                {
                    "species": { "name": "ivysaur", "url": format!("{}/api/v2/pokemon-species/2/", server.uri()) },
                    "evolution_details": [{ "min_level": 16, "trigger": { "name": "level-up", "url": "" } }],
                    "evolves_to": []
                }
            ]
        }
    })
}

// ── get_pokemon ─────────────────────────────────────────────────

#[tokio::test]
async fn local_hit_never_calls_remote() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let (repo, store) = repo_for(&server);
    store.upsert_pokemon(&seed_record(25, "pikachu")).unwrap();

    let summary = repo
        .get_pokemon(&PokemonKey::Name("pikachu".into()))
        .await
        .unwrap();
    assert_eq!(summary.id, PokemonId::new(25));
}

#[tokio::test]
async fn miss_fetches_once_then_serves_from_store() {
    let server = MockServer::start().await;
    mount_pokemon(&server, 25, "pikachu", 1).await;

    let (repo, store) = repo_for(&server);

    let first = repo
        .get_pokemon(&PokemonKey::Name("pikachu".into()))
        .await
        .unwrap();
    assert_eq!(first.id, PokemonId::new(25));
    assert!(store.contains(PokemonId::new(25)).unwrap());

    // second call must be answered locally; the mock's expect(1) verifies
    // no further remote call happens
    let second = repo
        .get_pokemon(&PokemonKey::Name("pikachu".into()))
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn unknown_key_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/missingno"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let (repo, _store) = repo_for(&server);
    let err = repo
        .get_pokemon(&PokemonKey::Name("missingno".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, AtlasError::NotFound(_)));
}

#[tokio::test]
async fn remote_failure_is_remote_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/pikachu"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let (repo, _store) = repo_for(&server);
    let err = repo
        .get_pokemon(&PokemonKey::Name("pikachu".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, AtlasError::RemoteUnavailable(_)));
}

// ── get_pokemons ────────────────────────────────────────────────

async fn mount_page(server: &MockServer, offset: u32, limit: u32, ids: std::ops::RangeInclusive<i64>) {
    let results: Vec<_> = ids
        .clone()
        .map(|id| {
            serde_json::json!({
                "name": format!("pokemon-{id}"),
                "url": format!("{}/api/v2/pokemon/{id}/", server.uri())
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon"))
        .and(query_param("offset", offset.to_string()))
        .and(query_param("limit", limit.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "count": 1302, "results": results })),
        )
        .expect(1)
        .mount(server)
        .await;
    for id in ids {
        Mock::given(method("GET"))
            .and(path(format!("/api/v2/pokemon/{id}/")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(pokemon_body(id, &format!("pokemon-{id}"))),
            )
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn complete_local_range_never_calls_remote() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let (repo, store) = repo_for(&server);
    for id in 1..=20 {
        store
            .upsert_pokemon(&seed_record(id, &format!("pokemon-{id}")))
            .unwrap();
    }

    let rows = repo.get_pokemons(0, 20).await.unwrap();
    assert_eq!(rows.len(), 20);
}

#[tokio::test]
async fn gapped_range_triggers_one_full_page_fetch() {
    let server = MockServer::start().await;
    mount_page(&server, 0, 20, 1..=20).await;

    let (repo, store) = repo_for(&server);
    // ids 1-15 and 17-20 stored; 16 missing
    for id in (1..=15).chain(17..=20) {
        store
            .upsert_pokemon(&seed_record(id, &format!("pokemon-{id}")))
            .unwrap();
    }

    let rows = repo.get_pokemons(0, 20).await.unwrap();

    let ids: Vec<_> = rows.iter().map(|s| s.id.as_i64()).collect();
    assert_eq!(ids, (1..=20).collect::<Vec<_>>());
    assert!(store.contains(PokemonId::new(16)).unwrap());
}

#[tokio::test]
async fn empty_store_range_populates_and_returns_page() {
    let server = MockServer::start().await;
    mount_page(&server, 0, 5, 1..=5).await;

    let (repo, _store) = repo_for(&server);
    let rows = repo.get_pokemons(0, 5).await.unwrap();
    let ids: Vec<_> = rows.iter().map(|s| s.id.as_i64()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn batch_failure_aborts_range_without_partial_writes() {
    let server = MockServer::start().await;
    let results: Vec<_> = (1..=5)
        .map(|id| {
            serde_json::json!({
                "name": format!("pokemon-{id}"),
                "url": format!("{}/api/v2/pokemon/{id}/", server.uri())
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "count": 1302, "results": results })),
        )
        .mount(&server)
        .await;
    for id in [1i64, 2, 4, 5] {
        Mock::given(method("GET"))
            .and(path(format!("/api/v2/pokemon/{id}/")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(pokemon_body(id, &format!("pokemon-{id}"))),
            )
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/3/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (repo, store) = repo_for(&server);
    let err = repo.get_pokemons(0, 5).await.unwrap_err();
    assert!(matches!(err, AtlasError::RemoteUnavailable(_)));

    // the batch failed before persistence, so nothing landed
    for id in 1..=5 {
        assert!(!store.contains(PokemonId::new(id)).unwrap());
    }
}

// ── get_pokemon_detailed ────────────────────────────────────────

#[tokio::test]
async fn detailed_fetches_entity_and_chain_on_miss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pokemon_body(1, "bulbasaur")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pokemon_body(2, "ivysaur")))
        .expect(1)
        .mount(&server)
        .await;
    let chain = two_stage_chain(&server);
    mount_chain(&server, 1, chain).await;

    let (repo, _store) = repo_for(&server);
    let detailed = repo.get_pokemon_detailed(PokemonId::new(1)).await.unwrap();

    assert_eq!(detailed.name, "bulbasaur");
    assert_eq!(detailed.evolution_chain.len(), 1);
    let step = &detailed.evolution_chain[0];
    assert_eq!(step.from_id, PokemonId::new(1));
    assert_eq!(step.to_id, PokemonId::new(2));
    assert_eq!(step.min_level, Some(16));
}

#[tokio::test]
async fn detailed_repairs_missing_endpoint_and_retries_once() {
    let server = MockServer::start().await;
    // entity 1 exists locally; its evolution target 2 does not
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pokemon_body(2, "ivysaur")))
        .expect(1)
        .mount(&server)
        .await;
    let chain = two_stage_chain(&server);
    mount_chain(&server, 1, chain).await;

    let (repo, store) = repo_for(&server);
    store.upsert_pokemon(&seed_record(1, "bulbasaur")).unwrap();

    let detailed = repo.get_pokemon_detailed(PokemonId::new(1)).await.unwrap();

    assert!(store.contains(PokemonId::new(2)).unwrap());
    assert_eq!(detailed.evolution_chain.len(), 1);
    assert_eq!(detailed.evolution_chain[0].to_name, "ivysaur");
}

#[tokio::test]
async fn detailed_chain_fetch_failure_degrades_to_entity_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon-species/1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let (repo, store) = repo_for(&server);
    store.upsert_pokemon(&seed_record(1, "bulbasaur")).unwrap();

    let detailed = repo.get_pokemon_detailed(PokemonId::new(1)).await.unwrap();
    assert_eq!(detailed.name, "bulbasaur");
    assert!(detailed.evolution_chain.is_empty());
}

#[tokio::test]
async fn detailed_with_cached_chain_never_calls_remote() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let (repo, store) = repo_for(&server);
    store.upsert_pokemon(&seed_record(1, "bulbasaur")).unwrap();
    store.upsert_pokemon(&seed_record(2, "ivysaur")).unwrap();
    store
        .upsert_evolution_edges(&atlas_model::EvolutionGraph {
            nodes: vec![],
            edges: vec![atlas_model::EvolutionEdge {
                from: PokemonId::new(1),
                to: PokemonId::new(2),
                min_level: Some(16),
                trigger: Some("level-up".into()),
            }],
        })
        .unwrap();

    let detailed = repo.get_pokemon_detailed(PokemonId::new(1)).await.unwrap();
    assert_eq!(detailed.evolution_chain.len(), 1);
}

#[tokio::test]
async fn detailed_single_stage_line_serves_without_edges() {
    let server = MockServer::start().await;
    mount_chain(
        &server,
        128,
        serde_json::json!({
            "id": 66,
            "chain": {
                "species": { "name": "tauros", "url": format!("{}/api/v2/pokemon-species/128/", server.uri()) },
                "evolution_details": [],
                "evolves_to": []
            }
        }),
    )
    .await;

    let (repo, store) = repo_for(&server);
    store.upsert_pokemon(&seed_record(128, "tauros")).unwrap();

    let detailed = repo.get_pokemon_detailed(PokemonId::new(128)).await.unwrap();
    assert_eq!(detailed.name, "tauros");
    assert!(detailed.evolution_chain.is_empty());
}

#[tokio::test]
async fn detailed_unknown_id_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/9999"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let (repo, _store) = repo_for(&server);
    let err = repo
        .get_pokemon_detailed(PokemonId::new(9999))
        .await
        .unwrap_err();
    assert!(matches!(err, AtlasError::NotFound(_)));
}
