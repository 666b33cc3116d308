#[macro_use]
extern crate criterion;

use criterion::{BenchmarkId, Criterion};
use merkle_accumulator::{update_leaf_proof, update_proof, verify_root, Node, SparseMerkleTree};
use rand::{rngs::StdRng, Rng, SeedableRng};

const HEIGHT: u8 = 32;

fn random_leaves(rng: &mut StdRng, count: usize) -> Vec<Node> {
    // 64-bit leaves are always below the field modulus
    (0..count).map(|_| Node::from(rng.random::<u64>())).collect()
}

fn prepare_tree(rng: &mut StdRng, count: usize) -> SparseMerkleTree {
    let mut tree = SparseMerkleTree::with_blake3(HEIGHT).expect("height");
    tree.push_many(random_leaves(rng, count)).expect("push_many");
    tree
}

fn bench(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);

    {
        let mut group = c.benchmark_group("accumulator insertion");
        for size in [16usize, 256, 4096] {
            let leaves = random_leaves(&mut rng, size);
            group.bench_with_input(BenchmarkId::new("push_many", size), &leaves, |b, leaves| {
                b.iter(|| {
                    let mut tree = SparseMerkleTree::with_blake3(HEIGHT).expect("height");
                    tree.push_many(leaves.iter().cloned()).expect("push_many")
                });
            });
            group.bench_with_input(BenchmarkId::new("push", size), &leaves, |b, leaves| {
                b.iter(|| {
                    let mut tree = SparseMerkleTree::with_blake3(HEIGHT).expect("height");
                    for leaf in leaves {
                        tree.push(leaf.clone()).expect("push");
                    }
                });
            });
        }
    }

    {
        let mut group = c.benchmark_group("accumulator proof update");
        let tree = prepare_tree(&mut rng, 1000);
        let frontier = tree.frontier_proof().expect("frontier");
        let leaf_proof = tree.proof(123).expect("proof");
        for count in [2usize, 64, 1024] {
            let batch = random_leaves(&mut rng, count);
            group.bench_with_input(BenchmarkId::new("frontier", count), &batch, |b, batch| {
                b.iter(|| {
                    update_proof(tree.hasher(), &frontier, tree.size(), batch).expect("update")
                });
            });
            group.bench_with_input(BenchmarkId::new("leaf", count), &batch, |b, batch| {
                b.iter(|| {
                    update_leaf_proof(tree.hasher(), &leaf_proof, 123, &frontier, tree.size(), batch)
                        .expect("update")
                });
            });
        }
    }

    c.bench_function("accumulator verify", |b| {
        let tree = prepare_tree(&mut rng, 1000);
        let proofs: Vec<_> = (0..100)
            .map(|_| {
                let index = rng.random_range(0..tree.size());
                let leaf = tree.leaf(index).expect("leaf").clone();
                (index, leaf, tree.proof(index).expect("proof"))
            })
            .collect();
        let mut i = 0;
        b.iter(|| {
            let (index, leaf, proof) = &proofs[i % proofs.len()];
            i += 1;
            verify_root(tree.hasher(), proof, *index, leaf, 0, tree.root()).expect("verify");
        });
    });
}

criterion_group!(benches, bench);
criterion_main!(benches);
