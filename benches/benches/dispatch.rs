// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use gadget_elements::canvas::recording::RecordingGraphics;
use gadget_elements::{ElementFactory, ElementId, Length, Owner, View, ViewConfig};
use gadget_events::{EventResult, EventType, Modifiers, MouseButtons, MouseEvent};
use kurbo::Point;

const CELL: f64 = 10.0;

// An n by n grid of divs, each handling presses.
fn grid_view(n: usize) -> (View, Vec<ElementId>) {
    let side = n as f64 * CELL;
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
    for y in 0..n {
        for x in 0..n {
            let id = view
                .children_mut(Owner::Root)
                .and_then(|mut root| root.append_element("div", ""))
                .expect("div is a built-in tag");
            view.element_mut(id)
                .expect("just created")
                .set_position(
                    Length::Pixels(x as f64 * CELL),
                    Length::Pixels(y as f64 * CELL),
                )
                .set_size(Some(Length::Pixels(CELL)), Some(Length::Pixels(CELL)));
            view.connect(id, EventType::MouseDown, |_, _| EventResult::Handled);
            ids.push(id);
        }
    }
    view.layout();
    (view, ids)
}

// Nested divs, each one cell in from its parent, rotated a little.
fn nested_view(depth: usize) -> (View, ElementId) {
    let mut view = View::new(
        ElementFactory::with_builtin_elements(),
        RecordingGraphics::new(),
        ViewConfig::default(),
    );
    let mut owner = Owner::Root;
    let mut last = None;
    for _ in 0..depth {
        let id = view
            .children_mut(owner)
            .and_then(|mut c| c.append_element("div", ""))
            .expect("div is a built-in tag");
        view.element_mut(id)
            .expect("just created")
            .set_position(Length::Pixels(1.0), Length::Pixels(1.0))
            .set_size(Some(Length::Percent(100.0)), Some(Length::Percent(100.0)))
            .set_rotation(1.0);
        owner = Owner::Element(id);
        last = Some(id);
    }
    view.layout();
    (view, last.expect("depth is non-zero"))
}

fn press(x: f64, y: f64) -> MouseEvent {
    MouseEvent::new(
        EventType::MouseDown,
        Point::new(x, y),
        MouseButtons::LEFT,
        Modifiers::empty(),
    )
}

fn bench_hit_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    for &n in &[8usize, 32, 64] {
        let (mut view, _) = grid_view(n);
        group.throughput(Throughput::Elements(1));
        // The bottom-left cell is the last one tried in reverse z-order.
        group.bench_function(format!("press_back_of_grid_n{n}"), |b| {
            let ev = press(CELL / 2.0, CELL / 2.0);
            b.iter(|| black_box(view.on_mouse_event(black_box(&ev))));
        });
        group.bench_function(format!("move_over_empty_n{n}"), |b| {
            let ev = MouseEvent::new(
                EventType::MouseMove,
                Point::new(-5.0, -5.0),
                MouseButtons::empty(),
                Modifiers::empty(),
            );
            b.iter(|| black_box(view.on_mouse_event(black_box(&ev))));
        });
    }
    for &depth in &[4usize, 16, 64] {
        let (mut view, _) = nested_view(depth);
        group.bench_function(format!("press_nested_depth{depth}"), |b| {
            let ev = press(100.0, 100.0);
            b.iter(|| black_box(view.on_mouse_event(black_box(&ev))));
        });
    }
    group.finish();
}

fn bench_coordinates(c: &mut Criterion) {
    let mut group = c.benchmark_group("coordinates");
    for &depth in &[4usize, 16, 64] {
        let (view, leaf) = nested_view(depth);
        group.bench_function(format!("view_to_element_depth{depth}"), |b| {
            b.iter(|| {
                black_box(view.view_coord_to_element_coord(leaf, black_box(Point::new(50.0, 60.0))))
            });
        });
    }
    group.finish();
}

fn bench_build_and_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle");
    for &n in &[16usize, 64] {
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("build_grid_n{n}"), |b| {
            b.iter(|| black_box(grid_view(n)));
        });
        group.bench_function(format!("remove_all_n{n}"), |b| {
            b.iter_batched(
                || grid_view(n).0,
                |mut view| {
                    if let Some(mut root) = view.children_mut(Owner::Root) {
                        root.remove_all_elements();
                    }
                    view
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_hit_dispatch,
    bench_coordinates,
    bench_build_and_remove
);
criterion_main!(benches);
