//! Storage backend tests against a temp SQLite database

use tempfile::TempDir;

use docvault::config::{DatabaseConfig, SeedConfig};
use docvault::errors::VaultError;
use docvault::services::seed_demo_data;
use docvault::storage::{NewFile, NewUser, Role, SeaOrmStorage, Visibility};

async fn open_storage() -> (SeaOrmStorage, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", dir.path().join("storage.db").display()),
        ..DatabaseConfig::default()
    };
    let storage = SeaOrmStorage::new(&config)
        .await
        .expect("Failed to create storage");
    (storage, dir)
}

fn new_file(owner_id: i32, department_id: i32, visibility: Visibility, name: &str) -> NewFile {
    NewFile {
        owner_id,
        department_id,
        visibility,
        file_path: format!("/tmp/{}", name),
        filename: name.to_string(),
        size: 10,
    }
}

#[tokio::test]
async fn test_memory_database_is_usable() {
    let storage = SeaOrmStorage::new(&DatabaseConfig::default()).await.unwrap();
    assert_eq!(storage.backend_name(), "sqlite");
    assert_eq!(storage.count_users().await.unwrap(), 0);
    assert_eq!(storage.count_files().await.unwrap(), 0);
}

#[tokio::test]
async fn test_departments_are_unique_by_name() {
    let (storage, _dir) = open_storage().await;

    let first = storage.get_or_create_department("legal").await.unwrap();
    let again = storage.get_or_create_department("legal").await.unwrap();
    assert_eq!(first, again);

    let err = storage.create_department("legal").await.unwrap_err();
    assert!(matches!(err, VaultError::Conflict(_)));

    assert!(storage.get_department_by_name("hr").await.unwrap().is_none());
    assert_eq!(
        storage.get_department_by_id(first.id).await.unwrap().unwrap().name,
        "legal"
    );
}

#[tokio::test]
async fn test_user_crud() {
    let (storage, _dir) = open_storage().await;
    let dept = storage.get_or_create_department("ops").await.unwrap();

    let user = storage
        .create_user(NewUser {
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
            department_id: dept.id,
        })
        .await
        .unwrap();
    assert_eq!(user.role, Role::User);

    let dup = storage
        .create_user(NewUser {
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            role: Role::Admin,
            department_id: dept.id,
        })
        .await
        .unwrap_err();
    assert_eq!(dup.message(), "Username already exists");

    let promoted = storage.update_user_role(user.id, Role::Manager).await.unwrap();
    assert_eq!(promoted.role, Role::Manager);
    assert_eq!(
        storage
            .get_user_by_username("alice")
            .await
            .unwrap()
            .unwrap()
            .role,
        Role::Manager
    );

    let missing = storage.update_user_role(999, Role::User).await.unwrap_err();
    assert!(matches!(missing, VaultError::NotFound(_)));
}

#[tokio::test]
async fn test_visible_files_filter_matches_access_rules() {
    let (storage, _dir) = open_storage().await;
    let outcome = seed_demo_data(&storage, &SeedConfig::default()).await.unwrap();
    assert_eq!(outcome.users_created, 4);

    let user1 = storage.get_user_by_username("user1").await.unwrap().unwrap();
    let user2 = storage.get_user_by_username("user2").await.unwrap().unwrap();
    let admin = storage.get_user_by_username("admin1").await.unwrap().unwrap();

    storage
        .create_file(new_file(user1.id, user1.department_id, Visibility::Private, "p.pdf"))
        .await
        .unwrap();
    storage
        .create_file(new_file(admin.id, admin.department_id, Visibility::Department, "d.pdf"))
        .await
        .unwrap();
    storage
        .create_file(new_file(user2.id, user2.department_id, Visibility::Public, "pub.pdf"))
        .await
        .unwrap();

    let names = |files: Vec<docvault::storage::StoredFile>| -> Vec<String> {
        files.into_iter().map(|f| f.filename).collect()
    };

    assert_eq!(
        names(storage.list_files_visible_to(&user1).await.unwrap()),
        vec!["p.pdf", "d.pdf", "pub.pdf"]
    );
    assert_eq!(
        names(storage.list_files_visible_to(&user2).await.unwrap()),
        vec!["pub.pdf"]
    );
    assert_eq!(storage.list_files_visible_to(&admin).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_download_counter_and_delete() {
    let (storage, _dir) = open_storage().await;
    seed_demo_data(&storage, &SeedConfig::default()).await.unwrap();
    let owner = storage.get_user_by_username("user1").await.unwrap().unwrap();
    let file = storage
        .create_file(new_file(owner.id, owner.department_id, Visibility::Public, "x.pdf"))
        .await
        .unwrap();
    assert_eq!(file.downloads_count, 0);

    assert!(storage.increment_download_count(file.id).await.unwrap());
    assert!(storage.increment_download_count(file.id).await.unwrap());
    assert_eq!(
        storage.get_file(file.id).await.unwrap().unwrap().downloads_count,
        2
    );
    assert!(!storage.increment_download_count(999).await.unwrap());

    assert!(storage.delete_file(file.id).await.unwrap());
    assert!(!storage.delete_file(file.id).await.unwrap());
    assert!(storage.get_file(file.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_seed_is_idempotent() {
    let (storage, _dir) = open_storage().await;
    let seed = SeedConfig::default();

    seed_demo_data(&storage, &seed).await.unwrap();
    let second = seed_demo_data(&storage, &seed).await.unwrap();
    assert_eq!(second.users_created, 0);
    assert_eq!(second.departments, vec!["dept1", "dept2"]);
    assert_eq!(storage.count_users().await.unwrap(), 4);

    let disabled = SeedConfig {
        demo_data: false,
        ..SeedConfig::default()
    };
    let outcome = seed_demo_data(&storage, &disabled).await.unwrap();
    assert!(outcome.departments.is_empty());
}

#[tokio::test]
async fn test_demo_accounts_get_distinct_salts() {
    let (storage, _dir) = open_storage().await;
    seed_demo_data(&storage, &SeedConfig::default()).await.unwrap();

    let mut hashes: Vec<String> = storage
        .list_users()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.password_hash)
        .collect();
    assert_eq!(hashes.len(), 4);
    hashes.sort();
    hashes.dedup();
    assert_eq!(hashes.len(), 4);

    for hash in &hashes {
        assert!(docvault::utils::password::verify_password("password", hash).unwrap());
    }
}
