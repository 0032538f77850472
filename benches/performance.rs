//! Performance benchmarks for the progress ledger.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use progress_ledger::{
    delete_student, merge, DataPoint, Goal, LedgerState, Loader, MemorySlots, Objective, Student,
    StudentId,
};
use serde_json::json;

/// A state with `students` students, each owning 3 goals with 2 objectives
/// and 10 data points per objective.
fn build_state(students: usize, id_offset: usize) -> LedgerState {
    let mut state = LedgerState::empty();

    for s in 0..students {
        let student_id = format!("s{}", s + id_offset);
        state.students.push(Student {
            id: student_id.clone().into(),
            name: format!("Student {}", s),
            ..Default::default()
        });

        for g in 0..3 {
            let goal_id = format!("{}-g{}", student_id, g);
            state.goals.push(Goal {
                id: goal_id.clone().into(),
                student_id: student_id.clone().into(),
                category: "Reading".into(),
                ..Default::default()
            });

            for o in 0..2 {
                let objective_id = format!("{}-o{}", goal_id, o);
                state.objectives.push(Objective {
                    id: objective_id.clone().into(),
                    goal_id: goal_id.clone().into(),
                    target_value: 80.0,
                    ..Default::default()
                });

                for d in 0..10 {
                    state.data_points.push(DataPoint {
                        id: format!("{}-d{}", objective_id, d).into(),
                        objective_id: objective_id.clone().into(),
                        date: format!("2024-01-{:02}", d + 1),
                        value: d as f64 * 5.0,
                        ..Default::default()
                    });
                }
            }
        }
    }

    state
}

/// Merge two states that overlap by half.
fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for students in [10, 100, 500] {
        let current = build_state(students, 0);
        let incoming = build_state(students, students / 2);

        group.bench_with_input(
            BenchmarkId::new("students", students),
            &(current, incoming),
            |b, (current, incoming)| {
                b.iter(|| black_box(merge(current, incoming)));
            },
        );
    }

    group.finish();
}

fn bench_cascade_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade_delete");

    for students in [10, 100, 500] {
        let state = build_state(students, 0);
        let target: StudentId = format!("s{}", students / 2).into();

        group.bench_with_input(
            BenchmarkId::new("students", students),
            &(state, target),
            |b, (state, target)| {
                b.iter(|| black_box(delete_student(state, target)));
            },
        );
    }

    group.finish();
}

/// Load a v1 document through the whole upgrade chain.
fn bench_legacy_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("legacy_load");

    for goals in [100, 1000] {
        let doc = json!({
            "students": [{"id": "s1", "name": "Ada"}],
            "goals": (0..goals)
                .map(|i| json!({"id": format!("g{}", i), "studentId": "s1"}))
                .collect::<Vec<_>>(),
            "objectives": (0..goals)
                .map(|i| json!({"id": format!("o{}", i), "goalId": format!("g{}", i), "targetValue": 10}))
                .collect::<Vec<_>>()
        });
        let bytes = serde_json::to_vec(&doc).unwrap();

        group.bench_with_input(BenchmarkId::new("goals", goals), &bytes, |b, bytes| {
            b.iter(|| {
                let slots = MemorySlots::with_slots([("sprout_iep_data_v1", bytes.clone())]);
                black_box(Loader::new(&slots).write_through(false).load())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_merge, bench_cascade_delete, bench_legacy_load);
criterion_main!(benches);
