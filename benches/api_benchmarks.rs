use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;

use marketplace_api::services::{
    numbering::{format_order_number, MATERIAL_ORDER_PREFIX},
    pricing::{line_total, OrderPricing, DEFAULT_VAT_RATE},
};

fn order_lines(count: usize) -> Vec<(Decimal, Decimal)> {
    (0..count)
        .map(|i| {
            let price = dec!(12.90) + Decimal::from(i as u64);
            let quantity = dec!(2.5) * Decimal::from((i % 7 + 1) as u64);
            (price, quantity)
        })
        .collect()
}

// Order pricing with a growing number of lines
fn order_pricing_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_pricing");

    for size in [1usize, 5, 20, 100] {
        let lines = order_lines(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &lines, |b, lines| {
            b.iter(|| {
                let totals = lines
                    .iter()
                    .map(|(price, qty)| line_total(*price, *qty))
                    .collect::<Result<Vec<_>, _>>()
                    .unwrap();
                OrderPricing::compute(black_box(totals), dec!(35), DEFAULT_VAT_RATE).unwrap()
            });
        });
    }

    group.finish();
}

fn delivery_fee_change_benchmark(c: &mut Criterion) {
    let pricing = OrderPricing::compute([dec!(283.97)], dec!(35), DEFAULT_VAT_RATE).unwrap();

    c.bench_function("delivery_fee_change", |b| {
        b.iter(|| black_box(pricing).with_delivery_fee(black_box(dec!(50))).unwrap())
    });
}

fn order_number_benchmark(c: &mut Criterion) {
    let now = chrono::Utc::now();

    c.bench_function("order_number_format", |b| {
        b.iter(|| format_order_number(MATERIAL_ORDER_PREFIX, now, black_box(42)))
    });
}

// Response serialization of a typical order payload
fn json_serialization_benchmark(c: &mut Criterion) {
    use serde_json::json;

    let data = json!({
        "id": "550e8400-e29b-41d4-a716-446655440000",
        "orderNumber": "ORD241000042",
        "orderType": "MATERIAL_PURCHASE",
        "status": "PENDING",
        "subtotal": 283.97,
        "tax": 53.95,
        "deliveryFee": 35.0,
        "total": 372.92,
        "items": [
            {"materialId": "123e4567-e89b-12d3-a456-426614174000", "quantity": 10.0, "unitPrice": 24.5, "total": 245.0},
            {"materialId": "123e4567-e89b-12d3-a456-426614174001", "quantity": 3.0, "unitPrice": 12.99, "total": 38.97}
        ]
    });

    c.bench_function("json_serialize", |b| {
        b.iter(|| serde_json::to_string(black_box(&data)).unwrap())
    });

    let json_str = serde_json::to_string(&data).unwrap();
    c.bench_function("json_deserialize", |b| {
        b.iter(|| {
            let _: serde_json::Value = serde_json::from_str(black_box(&json_str)).unwrap();
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(5));
    targets = order_pricing_benchmark, delivery_fee_change_benchmark, order_number_benchmark, json_serialization_benchmark
}
criterion_main!(benches);
