use orchestrator_adapters::store::JsonFileMenuStore;
use orchestrator_core::ports::MenuStore;
use router::MenuItem;

fn items() -> Vec<MenuItem> {
    vec![
        MenuItem::new("Pork Roll", "Taylor ham, egg and cheese", 4.5),
        MenuItem::new("Breakfast Sandwich", "", 5.25),
    ]
}

#[tokio::test]
async fn test_missing_file_is_no_menu() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileMenuStore::new(dir.path().join("menu.json"));
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu.json");
    let store = JsonFileMenuStore::new(&path);

    store.save(&items()).await.unwrap();
    assert_eq!(store.load().await.unwrap(), Some(items()));

    // pretty printed, and the staging file is gone
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\n  {"));
    assert!(!dir.path().join("menu.json.tmp").exists());
}

#[tokio::test]
async fn test_save_overwrites_previous_menu() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileMenuStore::new(dir.path().join("menu.json"));

    store.save(&items()).await.unwrap();
    store.save(&[MenuItem::new("Taco", "Carne asada", 3.0)]).await.unwrap();
    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "Taco");
}

#[tokio::test]
async fn test_invalid_file_is_an_error_and_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu.json");
    std::fs::write(&path, "not json at all").unwrap();

    let store = JsonFileMenuStore::new(&path);
    assert!(store.load().await.is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json at all");
}

#[tokio::test]
async fn test_loads_string_prices() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu.json");
    std::fs::write(&path, r#"[{"name": "Soda", "description": "Can", "price": "$1.50"}]"#).unwrap();

    let loaded = JsonFileMenuStore::new(&path).load().await.unwrap().unwrap();
    assert_eq!(loaded, vec![MenuItem::new("Soda", "Can", 1.5)]);
}
