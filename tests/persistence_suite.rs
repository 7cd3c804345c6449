mod common;

use std::sync::{Arc, Mutex};

use common::{temp_dir, ts};
use oikos_core::{
    config::{Config, ConfigManager},
    core::services::{CatchUpPolicy, LedgerService},
    domain::{Expense, Income, SavingsBox},
    errors::OikosError,
    repository::UserRepository,
    store::JsonFileStore,
};

fn open_repo(file: &std::path::Path, retention: Option<usize>) -> (JsonFileStore, UserRepository) {
    let store = JsonFileStore::open(file, retention).expect("open store");
    let repo = UserRepository::new(Arc::new(store.clone()), "persist").expect("repository");
    (store, repo)
}

#[test]
fn typed_records_survive_reopen() {
    let file = temp_dir().join("oikos.json");
    {
        let (_, repo) = open_repo(&file, None);
        LedgerService::record_income(&repo, Income::new(1500.0, ts(2024, 2, 1, 9), "Salary"), &[])
            .unwrap();
        repo.save(&SavingsBox::new("Emergency", 5000.0)).unwrap();
        repo.set_category_limit("Food", 400.0).unwrap();
    }
    let (_, repo) = open_repo(&file, None);
    assert_eq!(repo.incomes().unwrap().len(), 1);
    assert_eq!(repo.list::<SavingsBox>().unwrap()[0].name, "Emergency");
    assert_eq!(repo.category_limits().unwrap().get("Food"), Some(&400.0));
}

#[test]
fn backups_are_pruned_to_retention() {
    let file = temp_dir().join("oikos.json");
    let (store, repo) = open_repo(&file, Some(2));
    for note in ["one", "two", "three"] {
        repo.save(&Expense::new(10.0, ts(2024, 2, 1, 9), note, "Food"))
            .unwrap();
        store.backup(Some(note)).unwrap();
    }
    let backups = store.list_backups().unwrap();
    assert_eq!(backups.len(), 2);
    assert!(backups.iter().all(|name| !name.contains("one")));
}

#[test]
fn restore_notifies_watchers() {
    let file = temp_dir().join("oikos.json");
    let (store, repo) = open_repo(&file, None);
    repo.save(&Expense::new(25.0, ts(2024, 2, 3, 9), "Lunch", "Food"))
        .unwrap();
    let backup = store.backup(None).unwrap();
    repo.delete_all_user_data().unwrap();

    let counts = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&counts);
    let _watch = repo
        .watch::<Expense, _>(move |expenses| sink.lock().unwrap().push(expenses.len()))
        .unwrap();

    let name = backup.file_name().unwrap().to_str().unwrap().to_string();
    store.restore(&name).unwrap();
    assert_eq!(*counts.lock().unwrap(), vec![0, 1]);

    // The restored tree is also what a fresh process sees.
    let (_, reopened) = open_repo(&file, None);
    assert_eq!(reopened.expenses().unwrap().len(), 1);
}

#[test]
fn config_round_trip_and_backups() {
    let base = temp_dir();
    let manager = ConfigManager::with_base_dir(&base).unwrap();
    let mut config = manager.load().unwrap();
    assert_eq!(config, Config::default());

    config.default_user = Some("ana".into());
    config.recurring.catch_up = CatchUpPolicy::CatchUp;
    manager.save(&config).unwrap();
    assert_eq!(manager.load().unwrap(), config);

    let name = manager.backup(&config, Some("Before upgrade")).unwrap();
    assert!(name.starts_with("config_"));
    assert!(name.contains("before-upgrade"));
    assert_eq!(manager.list_backups().unwrap(), vec![name.clone()]);

    manager.save(&Config::default()).unwrap();
    let restored = manager.restore(&name).unwrap();
    assert_eq!(restored.default_user.as_deref(), Some("ana"));
    assert!(matches!(
        manager.restore("config_missing.json"),
        Err(OikosError::NotFound(_))
    ));
}
