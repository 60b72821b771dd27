use criterion::{criterion_group, criterion_main, Criterion};
use redis_cache_store::serialization::{decode, encode};
use redis_cache_store::{CacheStore, InMemoryClient, StoreConfig};
use serde_json::json;
use std::hint::black_box;
use std::time::Duration;

fn bench_codec(c: &mut Criterion) {
    let value = json!({
        "id": "emp_001",
        "employer_name": "Acme Corp",
        "salary": 75000.0,
        "tags": ["full-time", "remote"],
    });
    let raw = encode(Some(&value)).expect("encode");

    c.bench_function("codec_encode", |b| {
        b.iter(|| encode(Some(black_box(&value))).expect("encode"))
    });

    c.bench_function("codec_decode", |b| {
        b.iter(|| decode(Some(black_box(raw.as_str()))).expect("decode"))
    });
}

fn bench_store(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let store = CacheStore::new(
        InMemoryClient::new(),
        StoreConfig::default().with_ttl(Duration::from_secs(300)),
    );
    let entries: Vec<(String, u64)> = (0..100).map(|i| (format!("k{}", i), i)).collect();
    let keys: Vec<String> = entries.iter().map(|(k, _)| k.clone()).collect();

    let (store, entries, keys) = (&store, &entries, &keys);

    c.bench_function("store_mset_100_with_ttl", |b| {
        b.to_async(&rt)
            .iter(move || async move { store.mset(entries, None).await.expect("mset") })
    });

    c.bench_function("store_mget_100", |b| {
        b.to_async(&rt).iter(move || async move {
            let values: Vec<Option<u64>> = store.mget(keys).await.expect("mget");
            values
        })
    });
}

criterion_group!(benches, bench_codec, bench_store);
criterion_main!(benches);
