use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use render_tree::{
    ElementType, Fiber, FiberArena, FiberId, FiberKind, FiberTagTable, NativeHandle, Normalizer,
    Props, StateNode,
};

fn host(tags: &FiberTagTable, tag: &str) -> Fiber {
    Fiber::new(tags.tag_of(FiberKind::HostComponent))
        .with_type(ElementType::host(tag))
        .with_props(Props::new())
        .with_state_node(StateNode::Host(NativeHandle::new(tag)))
}

/// `depth` nested divs, each wrapped in a fragment
fn deep_chain(tags: &FiberTagTable, depth: usize) -> (FiberArena, FiberId) {
    let mut arena = FiberArena::with_capacity(depth * 2 + 1);
    let root = arena.add(host(tags, "div"));
    let mut parent = root;
    for _ in 0..depth {
        let fragment = arena
            .add_child(parent, Fiber::new(tags.tag_of(FiberKind::Fragment)))
            .unwrap();
        parent = arena.add_child(fragment, host(tags, "div")).unwrap();
    }
    (arena, root)
}

/// One list with `width` items, each holding a text leaf
fn wide_list(tags: &FiberTagTable, width: usize) -> (FiberArena, FiberId) {
    let mut arena = FiberArena::with_capacity(width * 2 + 1);
    let root = arena.add(host(tags, "ul"));
    for i in 0..width {
        let li = arena.add_child(root, host(tags, "li")).unwrap();
        let text = i.to_string();
        arena
            .add_child(li, Fiber::text(tags.tag_of(FiberKind::HostText), &text))
            .unwrap();
    }
    (arena, root)
}

fn bench_normalize_live(c: &mut Criterion) {
    let tags = FiberTagTable::default();
    let normalizer = Normalizer::new(tags.clone());
    let mut group = c.benchmark_group("normalize_live");
    group.sample_size(20);

    for size in [100, 1_000, 10_000] {
        let (arena, root) = deep_chain(&tags, size);
        group.bench_with_input(BenchmarkId::new("deep", size), &size, |b, _| {
            b.iter(|| black_box(normalizer.normalize_live(&arena, root).unwrap()));
        });
    }

    for size in [100, 1_000, 10_000] {
        let (arena, root) = wide_list(&tags, size);
        group.bench_with_input(BenchmarkId::new("wide", size), &size, |b, _| {
            b.iter(|| black_box(normalizer.normalize_live(&arena, root).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize_live);
criterion_main!(benches);
