//! 访问规则与上传策略基准测试

use chrono::Utc;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use docvault::config::UploadsConfig;
use docvault::services::UploadPolicy;
use docvault::services::access::{can_view, file_extension};
use docvault::storage::{Role, StoredFile, User, Visibility};

fn sample_users() -> Vec<User> {
    [Role::User, Role::Manager, Role::Admin]
        .into_iter()
        .enumerate()
        .map(|(i, role)| User {
            id: i as i32 + 1,
            username: format!("u{}", i),
            password_hash: String::new(),
            role,
            department_id: (i % 2) as i32 + 1,
        })
        .collect()
}

fn sample_files(n: usize) -> Vec<StoredFile> {
    let visibilities = [Visibility::Private, Visibility::Department, Visibility::Public];
    (0..n)
        .map(|i| StoredFile {
            id: i as i32,
            owner_id: (i % 5) as i32 + 1,
            department_id: (i % 3) as i32 + 1,
            visibility: visibilities[i % 3],
            file_path: format!("/app/uploads/{}.pdf", i),
            filename: format!("doc-{}.pdf", i),
            size: 1024,
            created_at: Utc::now(),
            downloads_count: 0,
        })
        .collect()
}

fn bench_can_view(c: &mut Criterion) {
    let users = sample_users();
    let files = sample_files(1000);

    let mut group = c.benchmark_group("access/can_view");
    group.throughput(Throughput::Elements(files.len() as u64));
    for user in &users {
        group.bench_function(user.role.as_ref(), |b| {
            b.iter(|| files.iter().filter(|f| can_view(user, f)).count());
        });
    }
    group.finish();
}

fn bench_upload_policy(c: &mut Criterion) {
    let policy = UploadPolicy::from(&UploadsConfig::default());
    let names = ["report.pdf", "SCAN.PDF", "archive.tar.gz", ".bashrc", "notes"];

    c.bench_function("access/check_extension", |b| {
        b.iter(|| {
            names
                .iter()
                .filter(|n| policy.check_extension(Role::User, n).is_ok())
                .count()
        });
    });

    c.bench_function("access/file_extension", |b| {
        b.iter(|| names.iter().map(|n| file_extension(n).len()).sum::<usize>());
    });
}

criterion_group!(benches, bench_can_view, bench_upload_policy);
criterion_main!(benches);
