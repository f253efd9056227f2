// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use gadget_elements::canvas::recording::{RecordingCanvas, RecordingGraphics};
use gadget_elements::{ElementFactory, ElementId, Length, Owner, View, ViewConfig};

fn grid_view(n: usize) -> (View, Vec<ElementId>) {
    let cell = 10.0;
    let side = n as f64 * cell;
    let mut view = View::new(
        ElementFactory::with_builtin_elements(),
        RecordingGraphics::new(),
        ViewConfig {
            width: side,
            height: side,
            debug_mode: 0,
        },
    );
    let mut ids = Vec::with_capacity(n * n);
    for i in 0..n * n {
        let id = view
            .children_mut(Owner::Root)
            .and_then(|mut root| root.append_element("div", ""))
            .expect("div is a built-in tag");
        view.set_property(id, "background", "#3366cc")
            .expect("valid color");
        view.element_mut(id)
            .expect("just created")
            .set_position(
                Length::Pixels((i % n) as f64 * cell),
                Length::Pixels((i / n) as f64 * cell),
            )
            .set_size(Some(Length::Pixels(cell)), Some(Length::Pixels(cell)));
        ids.push(id);
    }
    (view, ids)
}

fn bench_draw(c: &mut Criterion) {
    let mut group = c.benchmark_group("draw");
    for &n in &[8usize, 32] {
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("first_frame_n{n}"), |b| {
            b.iter_batched(
                || grid_view(n).0,
                |mut view| {
                    view.layout();
                    let mut target = RecordingCanvas::new(320, 240);
                    black_box(view.draw(&mut target));
                    view
                },
                BatchSize::SmallInput,
            );
        });

        let (mut view, ids) = grid_view(n);
        view.layout();
        let mut target = RecordingCanvas::new(320, 240);
        view.draw(&mut target);
        group.bench_function(format!("unchanged_frame_n{n}"), |b| {
            b.iter(|| {
                view.layout();
                black_box(view.draw(&mut target))
            });
        });
        group.bench_function(format!("one_dirty_frame_n{n}"), |b| {
            let dirty = ids[ids.len() / 2];
            b.iter(|| {
                if let Some(mut e) = view.element_mut(dirty) {
                    e.queue_draw();
                }
                view.layout();
                black_box(view.draw(&mut target))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_draw);
criterion_main!(benches);
