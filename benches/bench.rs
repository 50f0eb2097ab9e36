#[macro_use]
extern crate criterion;

use criterion::Criterion;
use criterion::black_box;

use tree_walks::{BinaryNodeBuilder, BinaryTree, GeneralTree, NodeBuilder, Value};

use rand::{Rng, SeedableRng};
use rand::distributions::{Distribution, Uniform};

trait NodeCreator : Sized {
    fn val(&self) -> Value;
    fn next_child(&mut self, rng: &mut impl Rng) -> Option<Self>;
}

// Creates a tree where at each level, every node has the same number of children
struct SimpleNodeCreator<'a> {
    val: Value,
    depth: usize,
    num_children_created: usize,
    children_per_node_per_level: &'a [usize],
}

impl<'a> NodeCreator for SimpleNodeCreator<'a> {
    fn val(&self) -> Value {
        self.val
    }

    fn next_child(&mut self, rng: &mut impl Rng) -> Option<Self> {
        self.children_per_node_per_level.get(self.depth).and_then(|max_children| {
            if self.num_children_created < *max_children {
                self.num_children_created += 1;
                Some(SimpleNodeCreator {
                    val: rng.gen_range(-1000, 1000),
                    depth: self.depth+1,
                    num_children_created: 0,
                    children_per_node_per_level: self.children_per_node_per_level,
                })
            } else {
                None
            }
        })
    }
}

fn make_wide_flat_tree() -> impl NodeCreator {
    SimpleNodeCreator {
        val: 1,
        depth: 0,
        num_children_created: 0,
        children_per_node_per_level: &[1000]
    }
}

fn make_binary_tree() -> impl NodeCreator {
    SimpleNodeCreator {
        val: 1,
        depth: 0,
        num_children_created: 0,
        children_per_node_per_level: &[2, 2, 2, 2, 2, 2, 2, 2, 2, 2]
    }
}

// Creates a tree where every potential child exists with a chance that depends on its level
struct RandomNodeCreator<'a> {
    val: Value,
    depth: usize,
    child_chance_per_level: &'a [f64],
}

impl<'a> NodeCreator for RandomNodeCreator<'a> {
    fn val(&self) -> Value {
        self.val
    }

    fn next_child(&mut self, rng: &mut impl Rng) -> Option<Self> {
        self.child_chance_per_level.get(self.depth).and_then(|child_chance| {
            let range = Uniform::new(0.0f64, 1.0);
            if range.sample(rng) < *child_chance {
                Some(RandomNodeCreator {
                    val: rng.gen_range(-1000, 1000),
                    depth: self.depth+1,
                    child_chance_per_level: self.child_chance_per_level,
                })
            } else {
                None
            }
        })
    }
}

fn make_deep_random_tree() -> impl NodeCreator {
    RandomNodeCreator {
        val: 1,
        depth: 0,
        child_chance_per_level: &[2./3., 2./3., 2./3., 2./3., 2./3., 2./3., 2./3., 2./3., 2./3., 2./3., 2./3., 2./3.]
    }
}

fn create_general_tree_rec<C: NodeCreator>(creator: &mut C, rng: &mut impl Rng, node_builder: &mut NodeBuilder<Value>) {
    while let Some(mut child_creator) = creator.next_child(rng) {
        node_builder.build_child(child_creator.val(), |child_node_builder| {
            create_general_tree_rec(&mut child_creator, rng, child_node_builder);
        });
    }
}

fn create_general_tree<C: NodeCreator>(mut creator: C, rng: &mut impl Rng) -> GeneralTree {
    GeneralTree::new(creator.val(), |node_builder| {
        create_general_tree_rec(&mut creator, rng, node_builder);
    })
}

// Only the first two children of every node are kept, as its left and right child.
fn create_binary_tree_rec<C: NodeCreator>(creator: &mut C, rng: &mut impl Rng, node_builder: &mut BinaryNodeBuilder) {
    if let Some(mut left_creator) = creator.next_child(rng) {
        node_builder.build_left(left_creator.val(), |child_node_builder| {
            create_binary_tree_rec(&mut left_creator, rng, child_node_builder);
        });
    }
    if let Some(mut right_creator) = creator.next_child(rng) {
        node_builder.build_right(right_creator.val(), |child_node_builder| {
            create_binary_tree_rec(&mut right_creator, rng, child_node_builder);
        });
    }
}

fn create_binary_tree<C: NodeCreator>(mut creator: C, rng: &mut impl Rng) -> BinaryTree {
    BinaryTree::new(creator.val(), |node_builder| {
        create_binary_tree_rec(&mut creator, rng, node_builder);
    })
}

fn make_rng() -> impl Rng {
    rand_xorshift::XorShiftRng::seed_from_u64(1234)
}

fn benchmark_general_tree<C: NodeCreator + 'static>(c: &mut Criterion, creator: fn() -> C, type_name: &'static str) {
    let tree = create_general_tree(creator(), &mut make_rng());
    let sum_tree = tree.clone();
    c.bench_function(&format!("{}_sum_values", type_name), move |b| {
        b.iter(|| black_box(&sum_tree).sum_values());
    });
    let evens_tree = tree.clone();
    c.bench_function(&format!("{}_count_evens", type_name), move |b| {
        b.iter(|| black_box(&evens_tree).count_evens());
    });
    c.bench_function(&format!("{}_num_greater", type_name), move |b| {
        b.iter(|| tree.num_greater(black_box(500)));
    });
}

fn benchmark_binary_tree<C: NodeCreator + 'static>(c: &mut Criterion, creator: fn() -> C, type_name: &'static str) {
    let tree = create_binary_tree(creator(), &mut make_rng());
    let depth_tree = tree.clone();
    c.bench_function(&format!("{}_depths", type_name), move |b| {
        b.iter(|| (depth_tree.min_depth(), depth_tree.max_depth()));
    });
    let sum_tree = tree.clone();
    c.bench_function(&format!("{}_max_sum", type_name), move |b| {
        b.iter(|| black_box(&sum_tree).max_sum());
    });
    let larger_tree = tree.clone();
    c.bench_function(&format!("{}_next_larger", type_name), move |b| {
        b.iter(|| larger_tree.next_larger(black_box(900)));
    });
    let encoded = tree.serialize();
    c.bench_function(&format!("{}_serialize", type_name), move |b| {
        b.iter(|| black_box(&tree).serialize());
    });
    c.bench_function(&format!("{}_deserialize", type_name), move |b| {
        b.iter(|| BinaryTree::deserialize(black_box(&encoded)).unwrap());
    });
}

fn criterion_benchmark(c: &mut Criterion) {
    benchmark_general_tree(c, make_wide_flat_tree, "flat_wide");
    benchmark_general_tree(c, make_deep_random_tree, "general_deep_random");
    benchmark_binary_tree(c, make_binary_tree, "binary");
    benchmark_binary_tree(c, make_deep_random_tree, "binary_deep_random");
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
