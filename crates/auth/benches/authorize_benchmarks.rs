use std::collections::HashMap;

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use quillpost_auth::{
    evaluate, permissions_of, Authorizer, OwnedResource, Role, RoleRequirement, RoleResolver,
    RoleResolverError,
};
use quillpost_core::UserId;

struct Post {
    owner: UserId,
}

impl OwnedResource for Post {
    fn owner_id(&self) -> UserId {
        self.owner
    }
}

struct MapResolver(HashMap<UserId, Role>);

#[async_trait]
impl RoleResolver for MapResolver {
    async fn role_of(&self, user_id: UserId) -> Result<Option<Role>, RoleResolverError> {
        Ok(self.0.get(&user_id).copied())
    }
}

fn bench_permissions_of(c: &mut Criterion) {
    let mut group = c.benchmark_group("permissions_of");
    for role in Role::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(role), &role, |b, role| {
            b.iter(|| permissions_of(black_box(*role)))
        });
    }
    group.finish();
}

fn bench_decision_table(c: &mut Criterion) {
    let me = UserId::new();
    let post = Post { owner: UserId::new() };

    c.bench_function("evaluate/equal_level_not_owner", |b| {
        b.iter(|| {
            evaluate(
                black_box(me),
                black_box(Role::User),
                RoleRequirement::USER,
                Some(&post),
            )
        })
    });
}

fn bench_authorize_with_lookup(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime");

    let users: Vec<UserId> = (0..1_000).map(|_| UserId::new()).collect();
    let roles = users
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, Role::ALL[i % Role::ALL.len()]))
        .collect();
    let authz = Authorizer::new(MapResolver(roles));
    let post = Post { owner: users[0] };

    c.bench_function("authorizer/resource_scoped", |b| {
        let mut i = 0usize;
        b.iter(|| {
            let user = users[i % users.len()];
            i += 1;
            runtime.block_on(authz.authorize(user.into(), RoleRequirement::USER, Some(&post)))
        })
    });
}

criterion_group!(
    benches,
    bench_permissions_of,
    bench_decision_table,
    bench_authorize_with_lookup
);
criterion_main!(benches);
