use criterion::{criterion_group, criterion_main, Criterion};
use ledger_core::{Ledger, LedgerConfig, SelectionPolicy, Transaction};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;

const T0: u64 = 1_600_000_000;

/// A 500-block chain where every block moves funds between a handful of users.
fn busy_ledger(rng: &mut StdRng) -> Ledger {
    let names = ["alice", "bob", "carol", "dave", "erin"];
    let mut ledger = Ledger::starting_at(LedgerConfig::default(), T0).expect("default config");
    for i in 0..500u64 {
        for _ in 0..5 {
            let tx = Transaction::new(
                names[rng.gen_range(0..names.len())],
                names[rng.gen_range(0..names.len())],
                rng.gen_range(1..10),
                rng.gen_range(0..3),
                T0 + i,
            );
            ledger.add_transaction_to_pool(tx);
        }
        let txs = ledger.get_pending_transactions();
        let miner = names[i as usize % names.len()];
        ledger
            .add_block_at(txs, miner, T0 + i * 60)
            .expect("pooled transactions fit a block");
    }
    ledger
}

fn bench_balance(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let ledger = busy_ledger(&mut rng);
    c.bench_function("get_balance_500_blocks", |b| {
        b.iter(|| ledger.get_balance(black_box("carol")))
    });
}

fn bench_selection(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut ledger = Ledger::starting_at(LedgerConfig::default(), T0).expect("default config");
    ledger.add_block_at(vec![], "alice", T0 + 60).expect("empty block");
    for i in 0..1_000u64 {
        let tx = Transaction::new("alice", "bob", 0, rng.gen_range(0..100), T0 + i);
        ledger.add_transaction_to_pool(tx);
    }
    for policy in SelectionPolicy::ALL {
        c.bench_function(&format!("select_{policy}_1000"), |b| {
            b.iter(|| ledger.get_preferred_transactions(policy, black_box("bob"), &mut rng))
        });
    }
}

criterion_group!(benches, bench_balance, bench_selection);
criterion_main!(benches);
