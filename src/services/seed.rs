//! Demo data seeding

use tracing::{info, warn};

use crate::config::SeedConfig;
use crate::errors::Result;
use crate::storage::{NewUser, Role, SeaOrmStorage};
use crate::utils::password::hash_password;

/// 种子执行结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    pub departments: Vec<String>,
    pub users_created: usize,
}

const DEMO_USERS: &[(&str, Role, &str)] = &[
    ("user1", Role::User, "dept1"),
    ("manager1", Role::Manager, "dept1"),
    ("admin1", Role::Admin, "dept1"),
    ("user2", Role::User, "dept2"),
];

/// 创建演示部门；用户表为空时创建演示账户
pub async fn seed_demo_data(storage: &SeaOrmStorage, seed: &SeedConfig) -> Result<SeedOutcome> {
    let mut outcome = SeedOutcome::default();
    if !seed.demo_data {
        info!("Demo data disabled");
        return Ok(outcome);
    }

    let dept1 = storage.get_or_create_department("dept1").await?;
    let dept2 = storage.get_or_create_department("dept2").await?;
    outcome.departments = vec![dept1.name.clone(), dept2.name.clone()];

    if storage.count_users().await? > 0 {
        info!("Demo data already exists");
        return Ok(outcome);
    }

    for (username, role, dept) in DEMO_USERS {
        let department_id = if *dept == dept1.name { dept1.id } else { dept2.id };
        // 每个账户独立加盐
        let password = seed.demo_password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;
        storage
            .create_user(NewUser {
                username: username.to_string(),
                password_hash,
                role: *role,
                department_id,
            })
            .await?;
        outcome.users_created += 1;
    }

    if seed.demo_password == "password" {
        warn!("Demo accounts use the default password; change seed.demo_password or disable seed.demo_data in production");
    }
    info!("Demo data created: {} users", outcome.users_created);
    Ok(outcome)
}
